//! Deployment profiles
//!
//! A profile holds the per-machine constants that used to be spread across
//! near-duplicate launch scripts: resource budgets for the Spark executors,
//! thread-pool sizing and affinity for the Intel OpenMP runtime, framework
//! installation paths, and the data mode and hyperparameters for the
//! training entry point. One structure, multiple named instances.

use crate::env::KmpAffinity;
use crate::error::{IoResultExt, LaunchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Data source mode for the training program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DataMode {
    /// Generated input tensors; nothing is read from disk
    Synthetic,
    /// Real ImageNet records read from a dataset directory
    Real {
        /// Dataset root (TFRecord layout)
        data_dir: PathBuf,
        /// Number of training epochs
        train_epochs: u32,
    },
}

impl DataMode {
    /// Whether the training program runs on generated data
    pub fn is_synthetic(&self) -> bool {
        matches!(self, DataMode::Synthetic)
    }

    /// Dataset directory for real-data mode
    pub fn data_dir(&self) -> Option<&Path> {
        match self {
            DataMode::Real { data_dir, .. } => Some(data_dir),
            DataMode::Synthetic => None,
        }
    }
}

/// Per-deployment constants for one machine class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentProfile {
    /// Profile name (CLI selector)
    pub name: String,
    /// Short human description
    pub description: String,
    /// Spark master URL (e.g. `local[44]` or `spark://host:7077`)
    pub master: String,
    /// Cores per executor
    pub executor_cores: u32,
    /// Total core budget across executors
    pub total_executor_cores: u32,
    /// Driver JVM memory, Spark size string (e.g. `160g`)
    pub driver_memory: String,
    /// Executor JVM memory, Spark size string
    pub executor_memory: String,
    /// Optional `spark.network.timeout` override (seconds)
    #[serde(default)]
    pub network_timeout: Option<u64>,
    /// Optional `spark.executor.heartbeatInterval` override (seconds)
    #[serde(default)]
    pub heartbeat_interval: Option<u64>,
    /// OpenMP thread count; 0 means size from physical cores
    pub omp_threads: u32,
    /// KMP thread affinity policy
    pub affinity: KmpAffinity,
    /// Dump the OpenMP runtime settings at startup
    #[serde(default)]
    pub kmp_settings: bool,
    /// Analytics Zoo distribution root
    pub zoo_home: PathBuf,
    /// Spark installation root
    pub spark_home: PathBuf,
    /// Extra directories appended to PYTHONPATH after the working directory
    #[serde(default)]
    pub extra_pythonpath: Vec<PathBuf>,
    /// Data mode and epoch budget
    pub data: DataMode,
    /// Global training batch size
    pub batch_size: u32,
    /// ResNet block version
    pub model_version: u32,
    /// ResNet depth
    pub resnet_size: u32,
    /// Train with bfloat16 numerics
    pub use_bfloat16: bool,
    /// Top-1 accuracy at which training stops
    pub stop_threshold: f64,
    /// Default random seed when none is given on the CLI
    pub default_seed: u64,
}

impl DeploymentProfile {
    /// Default location of the submission launcher under the Zoo home
    pub fn launcher_path(&self) -> PathBuf {
        self.zoo_home.join("bin/spark-submit-python-with-zoo.sh")
    }
}

/// The set of profiles known to this invocation
#[derive(Debug, Clone)]
pub struct ProfileSet {
    profiles: Vec<DeploymentProfile>,
}

impl ProfileSet {
    /// The built-in profiles covering the original deployment targets
    pub fn builtin() -> Self {
        Self {
            profiles: builtin_profiles(),
        }
    }

    /// Merge profiles from a JSON file; same-named entries override built-ins
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path).with_path(path)?;
        let loaded: Vec<DeploymentProfile> = serde_json::from_str(&text)?;

        for profile in loaded {
            if let Some(existing) = self
                .profiles
                .iter_mut()
                .find(|p| p.name == profile.name)
            {
                *existing = profile;
            } else {
                self.profiles.push(profile);
            }
        }
        Ok(())
    }

    /// Look up a profile by name
    pub fn get(&self, name: &str) -> Result<&DeploymentProfile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| LaunchError::UnknownProfile {
                name: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// All profile names, in declaration order
    pub fn names(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.name.clone()).collect()
    }

    /// All profiles
    pub fn profiles(&self) -> &[DeploymentProfile] {
        &self.profiles
    }
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Built-in profiles.
///
/// The 2-socket variants target 44-core Xeon machines running everything in
/// one local Spark executor; the 4-socket variants target 72-core machines.
/// Each machine class has a synthetic-data profile for throughput runs and
/// a real-data profile training ImageNet to the MLPerf quality target.
fn builtin_profiles() -> Vec<DeploymentProfile> {
    let zoo_home = PathBuf::from("/opt/work/analytics-zoo");
    let spark_home = PathBuf::from("/opt/work/spark-2.4.3");
    let model_zoo_paths = vec![
        PathBuf::from("../../official"),
        PathBuf::from("../../../mlperf_compliance"),
    ];

    let base_2s = DeploymentProfile {
        name: "synthetic-2s".to_string(),
        description: "2-socket 44-core node, synthetic data".to_string(),
        master: "local[44]".to_string(),
        executor_cores: 44,
        total_executor_cores: 44,
        driver_memory: "160g".to_string(),
        executor_memory: "160g".to_string(),
        network_timeout: Some(10_000_000),
        heartbeat_interval: Some(10_000_000),
        omp_threads: 44,
        affinity: KmpAffinity::Compact {
            permute: 1,
            offset: 0,
        },
        kmp_settings: true,
        zoo_home: zoo_home.clone(),
        spark_home: spark_home.clone(),
        extra_pythonpath: model_zoo_paths.clone(),
        data: DataMode::Synthetic,
        batch_size: 128,
        model_version: 1,
        resnet_size: 50,
        use_bfloat16: true,
        stop_threshold: 0.759,
        default_seed: 1,
    };

    let imagenet_2s = DeploymentProfile {
        name: "imagenet-2s".to_string(),
        description: "2-socket 44-core node, ImageNet from local disk".to_string(),
        data: DataMode::Real {
            data_dir: PathBuf::from("/opt/ILSVRC2012/"),
            train_epochs: 90,
        },
        ..base_2s.clone()
    };

    let synthetic_4s = DeploymentProfile {
        name: "synthetic-4s".to_string(),
        description: "4-socket 72-core node, synthetic data".to_string(),
        master: "local[72]".to_string(),
        executor_cores: 72,
        total_executor_cores: 72,
        driver_memory: "320g".to_string(),
        executor_memory: "320g".to_string(),
        omp_threads: 72,
        affinity: KmpAffinity::Disabled,
        ..base_2s.clone()
    };

    let imagenet_4s = DeploymentProfile {
        name: "imagenet-4s".to_string(),
        description: "4-socket 72-core node, ImageNet from local disk".to_string(),
        data: DataMode::Real {
            data_dir: PathBuf::from("/opt/ILSVRC2012/"),
            train_epochs: 90,
        },
        ..synthetic_4s.clone()
    };

    vec![base_2s, imagenet_2s, synthetic_4s, imagenet_4s]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_lookup() {
        let set = ProfileSet::builtin();
        let profile = set.get("synthetic-2s").unwrap();
        assert_eq!(profile.batch_size, 128);
        assert_eq!(profile.resnet_size, 50);
        assert!(profile.data.is_synthetic());

        let real = set.get("imagenet-2s").unwrap();
        assert_eq!(
            real.data.data_dir().unwrap(),
            Path::new("/opt/ILSVRC2012/")
        );
    }

    #[test]
    fn test_unknown_profile_lists_available() {
        let set = ProfileSet::builtin();
        let err = set.get("no-such-machine").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no-such-machine"));
        assert!(message.contains("synthetic-2s"));
    }

    #[test]
    fn test_profile_json_roundtrip() {
        let set = ProfileSet::builtin();
        let json = serde_json::to_string(set.profiles()).unwrap();
        let parsed: Vec<DeploymentProfile> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), set.profiles().len());
        assert_eq!(parsed[0].name, "synthetic-2s");
        assert_eq!(parsed[0].affinity, set.profiles()[0].affinity);
    }

    #[test]
    fn test_merge_file_overrides_builtin() {
        let mut set = ProfileSet::builtin();
        let mut custom = set.get("synthetic-2s").unwrap().clone();
        custom.batch_size = 256;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&vec![custom]).unwrap()).unwrap();

        set.merge_file(file.path()).unwrap();
        assert_eq!(set.get("synthetic-2s").unwrap().batch_size, 256);
        // Count unchanged: override, not append
        assert_eq!(set.profiles().len(), 4);
    }

    #[test]
    fn test_launcher_path_under_zoo_home() {
        let set = ProfileSet::builtin();
        let profile = set.get("synthetic-2s").unwrap();
        assert!(profile
            .launcher_path()
            .ends_with("bin/spark-submit-python-with-zoo.sh"));
    }
}
