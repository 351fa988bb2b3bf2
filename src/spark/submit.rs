//! Launcher argument list
//!
//! The argument list is a pure function of the resolved configuration:
//! Spark resource flags first, then the training script path, then the
//! training program's own flags. No value is read from the environment
//! or the filesystem here.

use crate::config::{DataMode, LaunchConfig};
use serde::Serialize;

/// The ordered argument list for the external launcher
#[derive(Debug, Clone, Serialize)]
pub struct SubmitArgs {
    /// Spark resource and conf flags
    spark: Vec<String>,
    /// Training script path
    script: String,
    /// Training program flags (seed first, positional)
    trainer: Vec<String>,
}

impl SubmitArgs {
    /// Build the argument list from the resolved configuration
    pub fn from_config(config: &LaunchConfig) -> Self {
        let profile = &config.profile;

        let mut spark = vec![
            "--master".to_string(),
            profile.master.clone(),
            "--driver-memory".to_string(),
            profile.driver_memory.clone(),
            "--executor-memory".to_string(),
            profile.executor_memory.clone(),
            "--executor-cores".to_string(),
            profile.executor_cores.to_string(),
            "--total-executor-cores".to_string(),
            profile.total_executor_cores.to_string(),
        ];

        if let Some(timeout) = profile.network_timeout {
            spark.push("--conf".to_string());
            spark.push(format!("spark.network.timeout={}", timeout));
        }
        if let Some(interval) = profile.heartbeat_interval {
            spark.push("--conf".to_string());
            spark.push(format!("spark.executor.heartbeatInterval={}", interval));
        }

        let mut trainer = vec![
            config.seed.to_string(),
            "--model_dir".to_string(),
            config.model_dir.display().to_string(),
        ];

        if let DataMode::Real {
            ref data_dir,
            train_epochs,
        } = profile.data
        {
            trainer.push("--data_dir".to_string());
            trainer.push(data_dir.display().to_string());
            trainer.push("--train_epochs".to_string());
            trainer.push(train_epochs.to_string());
        }

        trainer.push("--stop_threshold".to_string());
        trainer.push(profile.stop_threshold.to_string());
        trainer.push("--batch_size".to_string());
        trainer.push(profile.batch_size.to_string());
        trainer.push("--version".to_string());
        trainer.push(profile.model_version.to_string());
        trainer.push("--resnet_size".to_string());
        trainer.push(profile.resnet_size.to_string());

        if profile.use_bfloat16 {
            trainer.push("--use_bfloat16".to_string());
        }
        if profile.data.is_synthetic() {
            trainer.push("--use_synthetic_data".to_string());
        }

        Self {
            spark,
            script: config.training_script.display().to_string(),
            trainer,
        }
    }

    /// The complete argv passed to the launcher
    pub fn argv(&self) -> Vec<String> {
        let mut argv = self.spark.clone();
        argv.push(self.script.clone());
        argv.extend(self.trainer.iter().cloned());
        argv
    }

    /// Render for the plan output, one logical flag group per line
    pub fn render(&self, launcher: &str) -> String {
        let mut out = String::from(launcher);
        let argv = self.argv();
        let mut iter = argv.iter().peekable();

        while let Some(token) = iter.next() {
            if token.starts_with("--") {
                if let Some(value) = iter.peek() {
                    if !value.starts_with("--") {
                        out.push_str(&format!(" \\\n  {} {}", token, iter.next().unwrap()));
                        continue;
                    }
                }
                out.push_str(&format!(" \\\n  {}", token));
            } else {
                out.push_str(&format!(" \\\n  {}", token));
            }
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LaunchConfig;
    use crate::env::KmpAffinity;

    #[test]
    fn test_argv_is_deterministic() {
        let config = LaunchConfig::for_profile_name("synthetic-2s").unwrap();
        let a = SubmitArgs::from_config(&config).argv();
        let b = SubmitArgs::from_config(&config).argv();
        assert_eq!(a, b);
    }

    #[test]
    fn test_synthetic_argv_tail() {
        let mut config = LaunchConfig::for_profile_name("synthetic-2s").unwrap();
        config.profile.stop_threshold = 0.759;
        let argv = SubmitArgs::from_config(&config).argv();

        let tail: Vec<&str> = argv.iter().rev().take(8).rev().map(|s| s.as_str()).collect();
        assert_eq!(
            tail,
            [
                "--batch_size",
                "128",
                "--version",
                "1",
                "--resnet_size",
                "50",
                "--use_bfloat16",
                "--use_synthetic_data"
            ]
        );
    }

    #[test]
    fn test_real_data_argv_includes_epochs_and_data_dir() {
        let config = LaunchConfig::for_profile_name("imagenet-2s").unwrap();
        let argv = SubmitArgs::from_config(&config).argv();
        let joined = argv.join(" ");
        assert!(joined.contains("--train_epochs 90"));
        assert!(joined.contains("--data_dir /opt/ILSVRC2012/"));
        assert!(!joined.contains("--use_synthetic_data"));
    }

    #[test]
    fn test_seed_is_first_trainer_token() {
        let mut config = LaunchConfig::for_profile_name("synthetic-2s").unwrap();
        config.seed = 7;
        let argv = SubmitArgs::from_config(&config).argv();
        let script_pos = argv
            .iter()
            .position(|t| t == "imagenet_main.py")
            .expect("script token present");
        assert_eq!(argv[script_pos + 1], "7");
        assert_eq!(argv[script_pos + 2], "--model_dir");
    }

    #[test]
    fn test_stop_threshold_rendered_plainly() {
        let mut config = LaunchConfig::for_profile_name("synthetic-2s").unwrap();
        config.profile.stop_threshold = 0.759;
        let argv = SubmitArgs::from_config(&config).argv();
        let pos = argv.iter().position(|t| t == "--stop_threshold").unwrap();
        assert_eq!(argv[pos + 1], "0.759");
    }

    #[test]
    fn test_thread_and_affinity_changes_do_not_touch_argv() {
        let base = LaunchConfig::for_profile_name("synthetic-2s").unwrap();
        let baseline = SubmitArgs::from_config(&base).argv();

        let mut tweaked = base.clone();
        tweaked.profile.omp_threads = 2;
        tweaked.profile.affinity = KmpAffinity::Disabled;
        assert_eq!(SubmitArgs::from_config(&tweaked).argv(), baseline);
    }

    #[test]
    fn test_spark_flags_precede_script() {
        let config = LaunchConfig::for_profile_name("synthetic-2s").unwrap();
        let argv = SubmitArgs::from_config(&config).argv();
        assert_eq!(argv[0], "--master");
        assert_eq!(argv[1], "local[44]");
        let script_pos = argv.iter().position(|t| t == "imagenet_main.py").unwrap();
        let conf_pos = argv
            .iter()
            .position(|t| t.starts_with("spark.network.timeout"))
            .unwrap();
        assert!(conf_pos < script_pos);
    }

    #[test]
    fn test_plan_serialization_structure() {
        let mut config = LaunchConfig::for_profile_name("synthetic-2s").unwrap();
        config.seed = 7;
        let value = serde_json::to_value(SubmitArgs::from_config(&config)).unwrap();

        assert_eq!(value["script"], "imagenet_main.py");
        assert_eq!(value["trainer"][0], "7");
        assert!(value["spark"]
            .as_array()
            .unwrap()
            .iter()
            .any(|t| t == "--master"));
    }

    #[test]
    fn test_render_starts_with_launcher() {
        let config = LaunchConfig::for_profile_name("synthetic-2s").unwrap();
        let rendered = SubmitArgs::from_config(&config).render("spark-submit-python-with-zoo.sh");
        assert!(rendered.starts_with("spark-submit-python-with-zoo.sh \\\n"));
        assert!(rendered.contains("--master local[44]"));
    }
}
