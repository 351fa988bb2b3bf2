//! Environment configuration for the launched process
//!
//! The environment is write-once: it is assembled in a fixed order from the
//! resolved launch configuration, validated, and inherited by the child.
//! Nothing mutates it after assembly.

use crate::config::LaunchConfig;
use crate::error::{LaunchError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;

/// Module search path for the training program and its framework imports
pub const PYTHONPATH: &str = "PYTHONPATH";
/// OpenMP thread-pool size
pub const OMP_NUM_THREADS: &str = "OMP_NUM_THREADS";
/// Intel OpenMP thread affinity policy
pub const KMP_AFFINITY: &str = "KMP_AFFINITY";
/// Intel OpenMP settings dump toggle (thread-scheduling diagnostics)
pub const KMP_SETTINGS: &str = "KMP_SETTINGS";
/// Analytics Zoo distribution root
pub const ANALYTICS_ZOO_HOME: &str = "ANALYTICS_ZOO_HOME";
/// Spark installation root
pub const SPARK_HOME: &str = "SPARK_HOME";

/// KMP thread affinity policy
///
/// Rendered to the `KMP_AFFINITY` string format understood by the Intel
/// OpenMP runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum KmpAffinity {
    /// No thread pinning
    Disabled,
    /// Spread threads across cores
    Scatter,
    /// Fine-grained compact binding
    Compact {
        /// Permute level (1 binds adjacent threads to adjacent cores)
        permute: u32,
        /// Starting core offset
        offset: u32,
    },
    /// Verbatim affinity string for policies not modeled here
    Raw {
        /// Literal KMP_AFFINITY value
        value: String,
    },
}

impl Default for KmpAffinity {
    fn default() -> Self {
        KmpAffinity::Compact {
            permute: 1,
            offset: 0,
        }
    }
}

impl KmpAffinity {
    /// Render to the KMP_AFFINITY environment variable value
    pub fn render(&self) -> String {
        match self {
            KmpAffinity::Disabled => "disabled".to_string(),
            KmpAffinity::Scatter => "scatter".to_string(),
            KmpAffinity::Compact { permute, offset } => {
                format!("granularity=fine,compact,{},{}", permute, offset)
            }
            KmpAffinity::Raw { value } => value.clone(),
        }
    }
}

/// The ordered environment block exported to the launcher
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    entries: Vec<(String, String)>,
}

impl EnvironmentConfig {
    /// Assemble the environment from a resolved launch configuration.
    ///
    /// Order is fixed: module search path, thread-pool size, affinity
    /// policy, diagnostics toggle, framework homes. The current working
    /// directory is the only runtime input besides the configuration.
    pub fn assemble(config: &LaunchConfig) -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| LaunchError::io(PathBuf::from("."), e))?;

        let mut entries = Vec::with_capacity(6);
        entries.push((PYTHONPATH.to_string(), Self::python_path(config, &cwd)));
        entries.push((
            OMP_NUM_THREADS.to_string(),
            config.omp_threads().to_string(),
        ));
        entries.push((
            KMP_AFFINITY.to_string(),
            config.profile.affinity.render(),
        ));
        let kmp_settings = if config.profile.kmp_settings { "1" } else { "0" };
        entries.push((KMP_SETTINGS.to_string(), kmp_settings.to_string()));
        entries.push((
            ANALYTICS_ZOO_HOME.to_string(),
            config.profile.zoo_home.display().to_string(),
        ));
        entries.push((
            SPARK_HOME.to_string(),
            config.profile.spark_home.display().to_string(),
        ));

        Ok(Self { entries })
    }

    /// Build the PYTHONPATH value: working directory first, then the
    /// profile's extra framework directories, then any inherited value.
    fn python_path(config: &LaunchConfig, cwd: &std::path::Path) -> String {
        let mut parts: Vec<String> = vec![cwd.display().to_string()];

        for dir in &config.profile.extra_pythonpath {
            let resolved = if dir.is_absolute() {
                dir.clone()
            } else {
                cwd.join(dir)
            };
            parts.push(resolved.display().to_string());
        }

        if let Ok(inherited) = std::env::var(PYTHONPATH) {
            if !inherited.is_empty() {
                parts.push(inherited);
            }
        }

        parts.join(":")
    }

    /// The ordered (name, value) pairs
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Look up a variable by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Verify every variable is present and non-empty
    pub fn validate(&self) -> Result<()> {
        for (name, value) in &self.entries {
            if value.trim().is_empty() {
                return Err(LaunchError::EmptyEnvVar(name.clone()));
            }
        }
        Ok(())
    }

    /// Apply the environment to a command about to be spawned
    pub fn apply(&self, command: &mut Command) {
        for (name, value) in &self.entries {
            command.env(name, value);
        }
    }

    /// Render as shell-style export lines for the plan output
    pub fn render_exports(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.entries {
            out.push_str(&format!("export {}=\"{}\"\n", name, value));
        }
        out
    }
}
