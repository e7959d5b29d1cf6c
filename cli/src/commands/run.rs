//! Default command: run one bundle action on a fresh VM.

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use crate::app::AppContext;
use crate::application::ports::{CloudProvisioner, RemoteShell};
use crate::application::services::driver;
use crate::domain::JobRequest;
use crate::infra::azure::AzureCli;
use crate::infra::ssh::SshClient;
use crate::output::{TerminalReporter, json};

/// Read the job from stdin and run it against Azure and ssh.
///
/// # Errors
///
/// Returns an error if stdin cannot be read, the job is invalid, or the
/// driver could not complete its sequence.
pub async fn run(app: &AppContext) -> Result<i32> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("reading job description from stdin")?;

    let cloud = AzureCli::from_config(&app.config);
    let shell = SshClient::from_config(&app.config);
    execute(app, &input, &cloud, &shell).await
}

/// Parse `input` and run the job with the given adapters.
///
/// Returns the process exit code: 0 when the bundle action succeeded, 1
/// otherwise. VM deletion failures do not change it.
///
/// # Errors
///
/// Returns an error if the job is invalid or the driver could not complete
/// its sequence.
pub async fn execute(
    app: &AppContext,
    input: &str,
    cloud: &impl CloudProvisioner,
    shell: &impl RemoteShell,
) -> Result<i32> {
    let job = JobRequest::from_json(input)?;
    let reporter = TerminalReporter::new(&app.output);
    let report =
        driver::run_operation(&job, &app.config.admin_username, cloud, shell, &reporter).await?;

    if app.is_json() {
        println!("{}", json::format_report(&report)?);
    }
    Ok(report.exit_code)
}
