//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution, with an optional timeout that kills the child.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;

use crate::application::ports::CommandRunner;
use crate::domain::CommandError;

/// Production `CommandRunner`.
///
/// `tokio::time::timeout` around `.output().await` only drops the future and
/// leaves the OS process running on some platforms, so timeouts go through
/// `tokio::select!` with an explicit `child.kill()`.
pub struct TokioCommandRunner {
    timeout: Option<Duration>,
}

impl TokioCommandRunner {
    /// Runner whose `run` waits for the child however long it takes.
    #[must_use]
    pub fn unbounded() -> Self {
        Self { timeout: None }
    }

    /// Runner bounded by `timeout` when set, unbounded otherwise.
    #[must_use]
    pub fn with_optional_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        match self.timeout {
            Some(timeout) => self.run_with_timeout(program, args, timeout).await,
            None => {
                let mut child = spawn_piped(program, args)?;
                collect_output(&mut child, program).await
            }
        }
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        let mut child = spawn_piped(program, args)?;

        tokio::select! {
            result = collect_output(&mut child, program) => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                Err(CommandError::TimedOut {
                    program: program.to_string(),
                    timeout,
                }
                .into())
            }
        }
    }
}

fn spawn_piped(program: &str, args: &[&str]) -> Result<Child> {
    tracing::debug!(program, ?args, "spawning");
    tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))
}

async fn collect_output(child: &mut Child, program: &str) -> Result<Output> {
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();
    let (status, stdout, stderr) = tokio::join!(
        child.wait(),
        read_to_end(stdout_handle),
        read_to_end(stderr_handle),
    );
    Ok(Output {
        status: status.with_context(|| format!("waiting for {program}"))?,
        stdout,
        stderr,
    })
}

async fn read_to_end<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = h.read_to_end(&mut buf).await;
    }
    buf
}
