//! Loads `DriverConfig` from `CNAB_AZURE_VM_*` environment variables.

use anyhow::{Context, Result};

use crate::domain::DriverConfig;
use crate::domain::config::ENV_PREFIX;

/// Load and validate configuration from the process environment.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or a value is invalid.
pub fn load_config() -> Result<DriverConfig> {
    let config: DriverConfig = envy::prefixed(ENV_PREFIX)
        .from_env()
        .with_context(|| format!("failed to load config from {ENV_PREFIX}* env vars"))?;
    config.validate()?;
    Ok(config)
}

/// Load and validate configuration from explicit `(name, value)` pairs.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or a value is invalid.
pub fn load_config_from<I>(vars: I) -> Result<DriverConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let config: DriverConfig = envy::prefixed(ENV_PREFIX)
        .from_iter(vars)
        .with_context(|| format!("failed to load config from {ENV_PREFIX}* env vars"))?;
    config.validate()?;
    Ok(config)
}
