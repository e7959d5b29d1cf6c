//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::Parser;

use crate::app::{AppContext, OutputFlags};
use crate::commands;

/// Run a CNAB bundle action inside a throwaway Azure VM.
///
/// Reads the job description (JSON) from stdin, creates the VM, runs
/// /cnab/app/run over ssh, deletes the VM, and exits 0 on success or 1 on
/// failure.
#[derive(Parser)]
#[command(name = "cnab-azure-vm", version)]
pub struct Cli {
    /// Print the invocation image types this driver handles and exit
    #[arg(long)]
    pub handles: bool,

    /// Output the final report in JSON format
    #[arg(long)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Execute the CLI and return the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the job description is invalid,
    /// or the driver could not complete its sequence.
    pub async fn run(self) -> Result<i32> {
        if self.handles {
            commands::handles::run();
            return Ok(0);
        }
        let flags = OutputFlags {
            no_color: self.no_color,
            quiet: self.quiet,
            json: self.json,
        };
        let app = AppContext::new(&flags)?;
        commands::run::run(&app).await
    }

    /// Default log filter for the given `-v` count.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
