//! Domain types and validators for driver configuration.
//!
//! Pure functions only: no I/O, no async, no environment access.
//! Loading lives in `crate::infra::config`.

use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Prefix of every configuration environment variable.
pub const ENV_PREFIX: &str = "CNAB_AZURE_VM_";

/// Admin account created on the VM and used for the ssh session.
pub const DEFAULT_ADMIN_USERNAME: &str = "duff";

pub const VALID_HOST_KEY_POLICIES: &[&str] = &["yes", "no", "accept-new"];

// ── Config schema ────────────────────────────────────────────────────────────

/// Driver configuration, read from `CNAB_AZURE_VM_*` variables.
#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    /// VM admin account and ssh login.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// Cloud CLI binary.
    #[serde(default = "default_az_program")]
    pub az_program: String,

    /// Remote shell client binary.
    #[serde(default = "default_ssh_program")]
    pub ssh_program: String,

    /// `StrictHostKeyChecking` value passed to ssh.
    #[serde(default = "default_host_key_checking")]
    pub host_key_checking: String,

    /// Upper bound for `az vm create`, in seconds. Unset waits indefinitely.
    #[serde(default)]
    pub create_timeout_secs: Option<u64>,

    /// Upper bound for `az vm delete`, in seconds.
    #[serde(default = "default_delete_timeout_secs")]
    pub delete_timeout_secs: u64,

    /// Upper bound for the remote bundle run. Unset waits indefinitely.
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            az_program: default_az_program(),
            ssh_program: default_ssh_program(),
            host_key_checking: default_host_key_checking(),
            create_timeout_secs: None,
            delete_timeout_secs: default_delete_timeout_secs(),
            run_timeout_secs: None,
        }
    }
}

fn default_admin_username() -> String {
    DEFAULT_ADMIN_USERNAME.to_string()
}

fn default_az_program() -> String {
    "az".to_string()
}

fn default_ssh_program() -> String {
    "ssh".to_string()
}

fn default_host_key_checking() -> String {
    "accept-new".to_string()
}

fn default_delete_timeout_secs() -> u64 {
    1800
}

impl DriverConfig {
    #[must_use]
    pub fn create_timeout(&self) -> Option<Duration> {
        self.create_timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn delete_timeout(&self) -> Duration {
        Duration::from_secs(self.delete_timeout_secs)
    }

    #[must_use]
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }

    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("admin_username", &self.admin_username),
            ("az_program", &self.az_program),
            ("ssh_program", &self.ssh_program),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty { key: env_key(key) }.into());
            }
        }
        validate_host_key_policy(&self.host_key_checking)?;
        for (key, secs) in [
            ("create_timeout_secs", self.create_timeout_secs),
            ("delete_timeout_secs", Some(self.delete_timeout_secs)),
            ("run_timeout_secs", self.run_timeout_secs),
        ] {
            if secs == Some(0) {
                return Err(ConfigError::ZeroTimeout { key: env_key(key) }.into());
            }
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates an ssh `StrictHostKeyChecking` value.
///
/// # Errors
///
/// Returns an error if the value is not in the allowed list.
pub fn validate_host_key_policy(value: &str) -> Result<()> {
    if !VALID_HOST_KEY_POLICIES.contains(&value) {
        return Err(ConfigError::InvalidValue {
            key: env_key("host_key_checking"),
            value: value.to_string(),
            valid: VALID_HOST_KEY_POLICIES.join(", "),
        }
        .into());
    }
    Ok(())
}

fn env_key(field: &str) -> String {
    format!("{ENV_PREFIX}{}", field.to_ascii_uppercase())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
