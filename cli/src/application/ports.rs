//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`: never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::VmSpec;

// ── Cloud Port ────────────────────────────────────────────────────────────────

/// VM lifecycle on the cloud provider: create and delete, nothing else.
#[allow(async_fn_in_trait)]
pub trait CloudProvisioner {
    /// Human-readable command line used to create `spec`, for display.
    fn create_command_line(&self, spec: &VmSpec) -> String;
    /// Create the VM. On success stdout holds the provider's JSON description.
    async fn create_vm(&self, spec: &VmSpec) -> Result<Output>;
    /// Delete the VM without prompting.
    async fn delete_vm(&self, spec: &VmSpec) -> Result<Output>;
}

// ── Remote Shell Port ─────────────────────────────────────────────────────────

/// One-shot command execution on a remote host.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `command` through the login shell of `user` on `host` and wait
    /// for it to finish.
    async fn run(&self, host: &str, user: &str, command: &str) -> Result<Output>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` when they carry
    /// a default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
