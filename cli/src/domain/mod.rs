//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod bundle;
pub mod config;
pub mod error;
pub mod job;
pub mod vm;

pub use bundle::{BundleInvocation, ENTRYPOINT};
pub use config::DriverConfig;
pub use error::{CommandError, ConfigError, JobError, VmError};
pub use job::{ImageRef, JobRequest};
pub use vm::{CreatedVm, VmSpec};
