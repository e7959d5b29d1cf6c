//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::time::Duration;

use thiserror::Error;

// ── Job errors ────────────────────────────────────────────────────────────────

/// Errors raised while reading the job description handed over on stdin.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Malformed job description: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid image reference '{0}': expected '<resource-group>/<image>'")]
    InvalidImage(String),
}

// ── VM errors ─────────────────────────────────────────────────────────────────

/// Errors raised while interpreting the cloud CLI's view of a VM.
#[derive(Debug, Error)]
pub enum VmError {
    #[error("VM creation output is not valid JSON: {0}")]
    MalformedCreateOutput(#[source] serde_json::Error),

    #[error("VM creation output has no publicIpAddress")]
    MissingPublicIp,
}

// ── Command errors ────────────────────────────────────────────────────────────

/// Errors raised by a bounded external command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command was killed after running for `timeout`. Whatever it was
    /// doing may have partly happened.
    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to driver configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },

    #[error("{key} must not be empty")]
    Empty { key: String },

    #[error("{key} must be greater than zero")]
    ZeroTimeout { key: String },
}
