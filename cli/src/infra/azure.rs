//! `CloudProvisioner` backed by the Azure CLI.
//!
//! `AzureCli<R>` routes every `az` call through a `CommandRunner` so tests can
//! inject a recording runner instead of spawning real processes.

use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CloudProvisioner, CommandRunner};
use crate::domain::{DriverConfig, VmSpec};
use crate::infra::command_runner::TokioCommandRunner;

pub struct AzureCli<R: CommandRunner> {
    runner: R,
    program: String,
    create_timeout: Option<Duration>,
    delete_timeout: Duration,
}

impl<R: CommandRunner> AzureCli<R> {
    pub fn new(
        runner: R,
        program: impl Into<String>,
        create_timeout: Option<Duration>,
        delete_timeout: Duration,
    ) -> Self {
        Self {
            runner,
            program: program.into(),
            create_timeout,
            delete_timeout,
        }
    }
}

impl AzureCli<TokioCommandRunner> {
    /// Production adapter built from the driver configuration.
    #[must_use]
    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(
            TokioCommandRunner::unbounded(),
            config.az_program.clone(),
            config.create_timeout(),
            config.delete_timeout(),
        )
    }
}

impl<R: CommandRunner> CloudProvisioner for AzureCli<R> {
    fn create_command_line(&self, spec: &VmSpec) -> String {
        format!("{} {}", self.program, spec.create_args().join(" "))
    }

    async fn create_vm(&self, spec: &VmSpec) -> Result<Output> {
        tracing::info!(vm = %spec.name, resource_group = %spec.resource_group, "creating VM");
        let args = spec.create_args();
        let output = match self.create_timeout {
            Some(timeout) => {
                self.runner
                    .run_with_timeout(&self.program, &args, timeout)
                    .await
            }
            None => self.runner.run(&self.program, &args).await,
        };
        output.context("az vm create")
    }

    async fn delete_vm(&self, spec: &VmSpec) -> Result<Output> {
        tracing::info!(vm = %spec.name, resource_group = %spec.resource_group, "deleting VM");
        self.runner
            .run_with_timeout(&self.program, &spec.delete_args(), self.delete_timeout)
            .await
            .context("az vm delete")
    }
}
