//! JSON output helpers for `--json`.

use anyhow::{Context, Result};

use crate::application::services::driver::{AbortedRun, OperationReport};
use crate::domain::{ConfigError, JobError, VmError};

/// Format a fatal driver error as a JSON object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "...",
///   "teardown_succeeded": true
/// }
/// ```
///
/// `teardown_succeeded` is present only when the error surfaced after the VM
/// had been created and a deletion was attempted.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_failure(err: &anyhow::Error) -> Result<String> {
    let mut obj = serde_json::json!({
        "error": true,
        "message": format!("{err:#}"),
        "code": error_code(err),
    });
    if let Some(aborted) = err.downcast_ref::<AbortedRun>() {
        obj["teardown_succeeded"] = aborted.teardown_succeeded.into();
    }
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Machine-readable code for a driver error.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if err.downcast_ref::<JobError>().is_some() {
        "invalid_job"
    } else if err.downcast_ref::<ConfigError>().is_some() {
        "invalid_config"
    } else if err.downcast_ref::<VmError>().is_some() {
        "vm_error"
    } else {
        "driver_error"
    }
}

/// Format the final report of a driver run.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(report: &OperationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("JSON serialization failed")
}
