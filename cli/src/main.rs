//! cnab-azure-vm - run a CNAB bundle action inside a throwaway Azure VM

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cnab_azure_vm::cli::Cli;
use cnab_azure_vm::output::{OutputContext, json};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries progress or the JSON report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    let json_mode = cli.json;
    let no_color = cli.no_color;
    match cli.run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            match json_mode.then(|| json::format_failure(&e)) {
                Some(Ok(out)) => println!("{out}"),
                _ => OutputContext::new(no_color, false).error(&format!("Error: {e:#}")),
            }
            std::process::exit(1);
        }
    }
}
