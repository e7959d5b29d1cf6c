//! Bundle entrypoint invocation.

/// Fixed entrypoint path inside every invocation image.
pub const ENTRYPOINT: &str = "/cnab/app/run";

pub const ENV_ACTION: &str = "CNAB_ACTION";
pub const ENV_INSTALLATION_NAME: &str = "CNAB_INSTALLATION_NAME";

/// A single run of the bundle entrypoint.
///
/// Only the action and installation name are forwarded. The remaining
/// bundle variables (revision, parameters, credentials) are not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleInvocation<'a> {
    action: &'a str,
    installation_name: &'a str,
}

impl<'a> BundleInvocation<'a> {
    #[must_use]
    pub fn new(action: &'a str, installation_name: &'a str) -> Self {
        Self {
            action,
            installation_name,
        }
    }

    /// Environment passed to the entrypoint, values verbatim.
    #[must_use]
    pub fn env(&self) -> [(&'static str, &'a str); 2] {
        [
            (ENV_ACTION, self.action),
            (ENV_INSTALLATION_NAME, self.installation_name),
        ]
    }

    /// Remote shell command line: inline env assignments followed by the entrypoint.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = String::new();
        for (key, value) in self.env() {
            line.push_str(key);
            line.push('=');
            line.push_str(&shell_quote(value));
            line.push(' ');
        }
        line.push_str(ENTRYPOINT);
        line
    }
}

/// POSIX single-quote `value` so a remote shell reads it back unchanged.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
