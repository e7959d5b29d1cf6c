//! Application context: unified state passed to the driver command.

use anyhow::Result;

use crate::domain::DriverConfig;
use crate::output::OutputContext;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable progress on stdout (default).
    Human,
    /// A single JSON document on stdout; progress suppressed.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context.
///
/// Constructed once in `Cli::run()` and passed as `&AppContext` to the
/// command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Driver configuration from `CNAB_AZURE_VM_*`.
    pub config: DriverConfig,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags, loading
    /// configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(flags: &OutputFlags) -> Result<Self> {
        let config = crate::infra::config::load_config()?;
        Ok(Self::with_config(flags, config))
    }

    /// Construct an `AppContext` around an already loaded configuration.
    #[must_use]
    pub fn with_config(flags: &OutputFlags, config: DriverConfig) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        // JSON mode owns stdout; progress lines would corrupt it.
        let quiet = flags.quiet || flags.json;

        Self {
            output: OutputContext::new(flags.no_color, quiet),
            mode,
            config,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }
}
