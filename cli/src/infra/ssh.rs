//! `RemoteShell` backed by the OpenSSH client.

use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, RemoteShell};
use crate::domain::DriverConfig;
use crate::infra::command_runner::TokioCommandRunner;

/// Runs one command per call with `ssh -T`, non-interactively.
///
/// Key-based auth only (`BatchMode=yes`): the VM is created with
/// `--generate-ssh-keys`, which installs the caller's default public key.
pub struct SshClient<R: CommandRunner> {
    runner: R,
    program: String,
    host_key_checking: String,
}

impl<R: CommandRunner> SshClient<R> {
    pub fn new(runner: R, program: impl Into<String>, host_key_checking: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
            host_key_checking: host_key_checking.into(),
        }
    }

    /// Full ssh argument list for running `command` as `user` on `host`.
    #[must_use]
    pub fn args(&self, host: &str, user: &str, command: &str) -> Vec<String> {
        vec![
            "-T".to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("StrictHostKeyChecking={}", self.host_key_checking),
            "-l".to_string(),
            user.to_string(),
            host.to_string(),
            "--".to_string(),
            command.to_string(),
        ]
    }
}

impl SshClient<TokioCommandRunner> {
    /// Production adapter built from the driver configuration.
    #[must_use]
    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(
            TokioCommandRunner::with_optional_timeout(config.run_timeout()),
            config.ssh_program.clone(),
            config.host_key_checking.clone(),
        )
    }
}

impl<R: CommandRunner> RemoteShell for SshClient<R> {
    async fn run(&self, host: &str, user: &str, command: &str) -> Result<Output> {
        let args = self.args(host, user, command);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        tracing::info!(host, user, "running remote command");
        self.runner
            .run(&self.program, &args)
            .await
            .with_context(|| format!("ssh {user}@{host}"))
    }
}
