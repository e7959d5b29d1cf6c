//! Bundle run on a throwaway VM: create, run the entrypoint over ssh, delete.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! The sequence is forward-only. Once `create_vm` has succeeded, or timed
//! out and so may have left a VM behind, the VM is deleted exactly once,
//! whatever happens on the remote side, and the deletion result never changes
//! the outcome.

use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{CloudProvisioner, ProgressReporter, RemoteShell};
use crate::domain::{BundleInvocation, CommandError, CreatedVm, ENTRYPOINT, JobRequest, VmSpec};

/// Result of one driver run, mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// VM created and the bundle entrypoint exited 0.
    Succeeded,
    /// VM created but the bundle entrypoint failed.
    BundleFailed,
    /// VM creation failed; nothing to tear down.
    ProvisionFailed,
}

impl Outcome {
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Succeeded => 0,
            Self::BundleFailed | Self::ProvisionFailed => 1,
        }
    }
}

/// Summary of a driver run, rendered by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct OperationReport {
    pub installation_name: String,
    pub action: String,
    pub resource_group: String,
    pub vm_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    pub outcome: Outcome,
    /// `None` when no deletion was attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teardown_succeeded: Option<bool>,
    pub exit_code: i32,
}

impl OperationReport {
    fn new(job: &JobRequest, spec: &VmSpec) -> Self {
        Self {
            installation_name: job.installation_name.clone(),
            action: job.action.clone(),
            resource_group: spec.resource_group.clone(),
            vm_name: spec.name.clone(),
            public_ip: None,
            outcome: Outcome::ProvisionFailed,
            teardown_succeeded: None,
            exit_code: Outcome::ProvisionFailed.exit_code(),
        }
    }

    fn finish(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self.exit_code = outcome.exit_code();
        self
    }
}

/// Context on errors returned after the VM was created: whether it was
/// deleted before the error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortedRun {
    pub teardown_succeeded: bool,
}

impl fmt::Display for AbortedRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.teardown_succeeded {
            f.write_str("bundle run aborted (VM deleted)")
        } else {
            f.write_str("bundle run aborted (VM not deleted, remove it manually)")
        }
    }
}

/// Run `job` on a fresh VM.
///
/// Returns `Ok` with [`Outcome::ProvisionFailed`] when the VM could not be
/// created. A deletion is attempted only if creation timed out.
///
/// # Errors
///
/// Returns an error if the job's image reference is invalid (before any cloud
/// call), or if the remote step could not be attempted at all (unreadable
/// create output, ssh not runnable). In the latter case the teardown has
/// already run and the error carries an [`AbortedRun`] context.
pub async fn run_operation(
    job: &JobRequest,
    admin_username: &str,
    cloud: &impl CloudProvisioner,
    shell: &impl RemoteShell,
    reporter: &impl ProgressReporter,
) -> Result<OperationReport> {
    let spec = VmSpec::for_job(job, admin_username)?;
    let mut report = OperationReport::new(job, &spec);
    tracing::info!(
        installation = %job.installation_name,
        action = %job.action,
        revision = %job.revision,
        resource_group = %spec.resource_group,
        image = %spec.image,
        "starting bundle run"
    );

    reporter.step(&cloud.create_command_line(&spec));
    let created = match cloud.create_vm(&spec).await {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            tracing::error!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "VM creation failed"
            );
            reporter.warn("Failed to create VM. Exiting.");
            return Ok(report.finish(Outcome::ProvisionFailed));
        }
        Err(e) if e.downcast_ref::<CommandError>().is_some() => {
            tracing::error!(error = %format!("{e:#}"), "VM creation timed out");
            reporter.warn(&format!(
                "VM creation timed out; deleting VM '{}' in case it exists",
                spec.name
            ));
            report.teardown_succeeded = Some(teardown(cloud, &spec, reporter).await);
            reporter.warn("Failed to create VM. Exiting.");
            return Ok(report.finish(Outcome::ProvisionFailed));
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "VM creation failed");
            reporter.warn("Failed to create VM. Exiting.");
            return Ok(report.finish(Outcome::ProvisionFailed));
        }
    };
    reporter.success(&format!("VM '{}' created", spec.name));

    let remote = run_bundle(job, &spec, &created.stdout, shell, reporter, &mut report).await;

    let teardown_succeeded = teardown(cloud, &spec, reporter).await;
    report.teardown_succeeded = Some(teardown_succeeded);

    let outcome = if remote.context(AbortedRun { teardown_succeeded })? {
        Outcome::Succeeded
    } else {
        Outcome::BundleFailed
    };
    Ok(report.finish(outcome))
}

/// Returns whether the entrypoint exited successfully.
async fn run_bundle(
    job: &JobRequest,
    spec: &VmSpec,
    create_stdout: &[u8],
    shell: &impl RemoteShell,
    reporter: &impl ProgressReporter,
    report: &mut OperationReport,
) -> Result<bool> {
    let vm = CreatedVm::from_json(create_stdout).context("reading VM creation output")?;
    report.public_ip = Some(vm.public_ip.clone());
    tracing::info!(
        public_ip = %vm.public_ip,
        private_ip = ?vm.private_ip,
        location = ?vm.location,
        power_state = ?vm.power_state,
        "VM ready"
    );

    let invocation = BundleInvocation::new(&job.action, &job.installation_name);
    reporter.step(&format!(
        "running {ENTRYPOINT} on {}@{} (action: {})",
        spec.admin_username, vm.public_ip, job.action
    ));
    let output = shell
        .run(&vm.public_ip, &spec.admin_username, &invocation.command_line())
        .await
        .context("running bundle entrypoint")?;
    tracing::debug!(
        stdout = %String::from_utf8_lossy(&output.stdout),
        stderr = %String::from_utf8_lossy(&output.stderr),
        "bundle entrypoint output"
    );

    if output.status.success() {
        reporter.success(&format!("action '{}' completed", job.action));
        Ok(true)
    } else {
        tracing::warn!(status = %output.status, "bundle entrypoint failed");
        reporter.warn(&format!(
            "action '{}' failed ({})",
            job.action, output.status
        ));
        Ok(false)
    }
}

/// Delete the VM. Failures are reported, never propagated.
async fn teardown(
    cloud: &impl CloudProvisioner,
    spec: &VmSpec,
    reporter: &impl ProgressReporter,
) -> bool {
    reporter.step(&format!("deleting VM '{}'", spec.name));
    let failure = match cloud.delete_vm(spec).await {
        Ok(output) if output.status.success() => {
            reporter.success(&format!("VM '{}' deleted", spec.name));
            return true;
        }
        Ok(output) => format!(
            "{}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
        Err(e) => format!("{e:#}"),
    };
    tracing::warn!(
        vm = %spec.name,
        resource_group = %spec.resource_group,
        error = %failure,
        "VM deletion failed"
    );
    reporter.warn(&format!(
        "could not delete VM '{}' in resource group '{}'; remove it manually",
        spec.name, spec.resource_group
    ));
    false
}
