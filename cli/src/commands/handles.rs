//! `--handles`: invocation image types accepted by this driver.
//!
//! Bundle runtimes call `<driver> --handles` and split the answer on commas.

/// Image types this driver can run.
pub const HANDLED_IMAGE_TYPES: &[&str] = &["azure-vm"];

/// Comma-separated answer to `--handles`.
#[must_use]
pub fn answer() -> String {
    HANDLED_IMAGE_TYPES.join(",")
}

/// Run the handles command.
pub fn run() {
    println!("{}", answer());
}
