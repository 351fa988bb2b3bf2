//! Configuration module for ZooLaunch
//!
//! Provides CLI argument parsing, deployment profiles, and the resolved
//! runtime configuration.

mod profile;
mod settings;

pub use profile::*;
pub use settings::*;
