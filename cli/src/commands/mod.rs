//! Command implementations

pub mod handles;
pub mod run;
