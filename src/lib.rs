//! # ZooLaunch - Launch Configurator for Distributed ImageNet Training
//!
//! ZooLaunch assembles a process environment (OpenMP thread-pool sizing,
//! KMP thread affinity, PYTHONPATH, framework homes) and a deterministic
//! spark-submit argument list, then hands control to the external
//! `spark-submit-python-with-zoo.sh` launcher and propagates its exit
//! status. It replaces a family of per-machine launch scripts with named
//! deployment profiles.
//!
//! ## Quick Start
//!
//! ```no_run
//! use zoolaunch::config::LaunchConfig;
//! use zoolaunch::launch::Launcher;
//!
//! let config = LaunchConfig::for_profile_name("synthetic-2s").unwrap();
//! let exit_code = Launcher::new(config).run().unwrap();
//! std::process::exit(exit_code);
//! ```
//!
//! ## Inspecting a Plan
//!
//! ```no_run
//! use zoolaunch::config::LaunchConfig;
//! use zoolaunch::env::EnvironmentConfig;
//! use zoolaunch::spark::SubmitArgs;
//!
//! let config = LaunchConfig::for_profile_name("imagenet-2s").unwrap();
//! let env = EnvironmentConfig::assemble(&config).unwrap();
//! let args = SubmitArgs::from_config(&config);
//!
//! print!("{}", env.render_exports());
//! print!("{}", args.render("spark-submit-python-with-zoo.sh"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod env;
pub mod error;
pub mod launch;
pub mod spark;
pub mod system;

// Re-export commonly used types
pub use config::{CliArgs, DeploymentProfile, LaunchConfig, ProfileSet};
pub use env::{EnvironmentConfig, KmpAffinity};
pub use error::{LaunchError, Result};
pub use launch::Launcher;
pub use spark::SubmitArgs;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use zoolaunch::prelude::*;
    //! ```

    pub use crate::config::{CliArgs, DataMode, DeploymentProfile, LaunchConfig, ProfileSet};
    pub use crate::env::{EnvironmentConfig, KmpAffinity};
    pub use crate::error::{LaunchError, Result};
    pub use crate::launch::{exit_code_for, Launcher};
    pub use crate::spark::SubmitArgs;
    pub use crate::system::SystemInfo;
}
