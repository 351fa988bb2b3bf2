//! Configuration settings for ZooLaunch
//!
//! Defines CLI arguments, subcommands, and the resolved runtime
//! configuration a launch runs with.

use crate::config::{DataMode, DeploymentProfile, ProfileSet};
use crate::env::KmpAffinity;
use crate::error::{LaunchError, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ZooLaunch - launch configurator for distributed ImageNet training
#[derive(Parser, Debug, Clone)]
#[command(name = "zoolaunch")]
#[command(author = "ZooLaunch Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Configure and launch ResNet/ImageNet training on Spark + Analytics Zoo")]
#[command(long_about = r#"
ZooLaunch assembles the process environment (OpenMP thread count, KMP
affinity, PYTHONPATH, framework homes) and the spark-submit argument list
for the external ImageNet training entry point, then hands control to the
spark-submit-python-with-zoo.sh launcher and propagates its exit status.

Per-machine constants live in named deployment profiles; CLI flags override
individual values for one run.

Examples:
  zoolaunch --profile synthetic-2s --seed 7      # throughput run
  zoolaunch --profile imagenet-2s --quality 0.759
  zoolaunch plan --profile imagenet-4s           # show env + argv, no launch
  zoolaunch profiles                             # list known profiles
"#)]
pub struct CliArgs {
    /// Deployment profile name
    #[arg(short = 'P', long, default_value = "synthetic-2s", value_name = "NAME")]
    pub profile: String,

    /// Extra profile file (JSON array; same-named entries override built-ins)
    #[arg(long, value_name = "PATH")]
    pub profile_file: Option<PathBuf>,

    /// Random seed passed as the training program's positional argument
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Checkpoint/model output directory
    #[arg(long, value_name = "PATH")]
    pub model_dir: Option<PathBuf>,

    /// Global batch size override
    #[arg(long, value_name = "NUM")]
    pub batch_size: Option<u32>,

    /// Training epoch count override (real-data profiles only)
    #[arg(long, value_name = "NUM")]
    pub train_epochs: Option<u32>,

    /// Top-1 accuracy threshold at which training stops
    #[arg(long, value_name = "FRACTION")]
    pub quality: Option<f64>,

    /// Spark master URL override
    #[arg(long, value_name = "URL")]
    pub master: Option<String>,

    /// Driver JVM memory override (e.g. 160g)
    #[arg(long, value_name = "SIZE")]
    pub driver_memory: Option<String>,

    /// Executor JVM memory override (e.g. 160g)
    #[arg(long, value_name = "SIZE")]
    pub executor_memory: Option<String>,

    /// OpenMP thread count override (0 = physical cores)
    #[arg(long, value_name = "NUM")]
    pub omp_threads: Option<u32>,

    /// KMP affinity policy override
    #[arg(long, value_enum, value_name = "POLICY")]
    pub affinity: Option<AffinityPolicy>,

    /// Path to the submission launcher (default: under the Zoo home)
    #[arg(long, value_name = "PATH")]
    pub launcher: Option<PathBuf>,

    /// Path to the training entry point script
    #[arg(long, default_value = "imagenet_main.py", value_name = "PATH")]
    pub training_script: PathBuf,

    /// Print the plan instead of launching
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the environment exports and launcher argv without launching
    #[command(name = "plan")]
    Plan {
        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show only the environment exports
    #[command(name = "env")]
    Env,

    /// List known deployment profiles
    #[command(name = "profiles")]
    Profiles,

    /// Analyze host resources and recommend a profile
    #[command(name = "analyze")]
    Analyze {
        /// Include memory details
        #[arg(short, long)]
        detailed: bool,
    },
}

impl CliArgs {
    /// Effective verbosity; quiet wins over any number of `-v` flags
    pub fn effective_verbose(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Log filter directive forced by quiet mode.
    ///
    /// Returns `Some("error")` when `--quiet` is set; `None` defers to the
    /// `RUST_LOG` environment.
    pub fn log_filter(&self) -> Option<&'static str> {
        if self.quiet {
            Some("error")
        } else {
            None
        }
    }
}

/// KMP affinity policy selector for the CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffinityPolicy {
    /// No thread pinning
    Disabled,
    /// Spread threads across cores
    Scatter,
    /// Fine-grained compact binding (granularity=fine,compact,1,0)
    Compact,
}

impl From<AffinityPolicy> for KmpAffinity {
    fn from(policy: AffinityPolicy) -> Self {
        match policy {
            AffinityPolicy::Disabled => KmpAffinity::Disabled,
            AffinityPolicy::Scatter => KmpAffinity::Scatter,
            AffinityPolicy::Compact => KmpAffinity::Compact {
                permute: 1,
                offset: 0,
            },
        }
    }
}

/// Validate a Spark/JVM memory size string (e.g. "160g", "8192m")
pub fn validate_memory_spec(spec: &str) -> Result<()> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(LaunchError::config("empty memory size"));
    }

    let (digits, suffix) = spec.split_at(
        spec.find(|c: char| !c.is_ascii_digit())
            .unwrap_or(spec.len()),
    );

    if digits.is_empty() {
        return Err(LaunchError::config(format!(
            "invalid memory size '{}': no leading digits",
            spec
        )));
    }

    match suffix.to_ascii_lowercase().as_str() {
        "" | "k" | "m" | "g" | "t" => Ok(()),
        other => Err(LaunchError::config(format!(
            "invalid memory size '{}': unknown suffix '{}'",
            spec, other
        ))),
    }
}

/// Resolved runtime configuration for one launch
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Profile constants with CLI overrides already applied
    pub profile: DeploymentProfile,
    /// Random seed for this run
    pub seed: u64,
    /// Checkpoint/model output directory
    pub model_dir: PathBuf,
    /// The external submission launcher
    pub launcher: PathBuf,
    /// The training entry point script
    pub training_script: PathBuf,
    /// Print the plan instead of spawning
    pub dry_run: bool,
}

impl LaunchConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let mut profiles = ProfileSet::builtin();
        if let Some(ref path) = args.profile_file {
            profiles
                .merge_file(path)
                .map_err(|e| e.with_context(format!("loading profiles from {}", path.display())))?;
        }

        let mut profile = profiles.get(&args.profile)?.clone();

        if let Some(ref master) = args.master {
            profile.master = master.clone();
        }
        if let Some(batch_size) = args.batch_size {
            profile.batch_size = batch_size;
        }
        if let Some(quality) = args.quality {
            if !(0.0..=1.0).contains(&quality) {
                return Err(LaunchError::config(format!(
                    "quality threshold {} outside [0, 1]",
                    quality
                )));
            }
            profile.stop_threshold = quality;
        }
        if let Some(ref memory) = args.driver_memory {
            profile.driver_memory = memory.clone();
        }
        if let Some(ref memory) = args.executor_memory {
            profile.executor_memory = memory.clone();
        }
        if let Some(threads) = args.omp_threads {
            profile.omp_threads = threads;
        }
        if let Some(policy) = args.affinity {
            profile.affinity = policy.into();
        }
        if let Some(epochs) = args.train_epochs {
            match profile.data {
                DataMode::Real {
                    ref mut train_epochs,
                    ..
                } => *train_epochs = epochs,
                DataMode::Synthetic => {
                    tracing::warn!(
                        "--train-epochs ignored: profile '{}' uses synthetic data",
                        profile.name
                    );
                }
            }
        }

        validate_memory_spec(&profile.driver_memory)?;
        validate_memory_spec(&profile.executor_memory)?;

        let seed = args.seed.unwrap_or(profile.default_seed);
        let model_dir = args
            .model_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("./resnet50_model"));
        let launcher = args
            .launcher
            .clone()
            .unwrap_or_else(|| profile.launcher_path());

        Ok(Self {
            profile,
            seed,
            model_dir,
            launcher,
            training_script: args.training_script.clone(),
            dry_run: args.dry_run,
        })
    }

    /// Resolve a built-in profile with default run options
    pub fn for_profile_name(name: &str) -> Result<Self> {
        let profiles = ProfileSet::builtin();
        let profile = profiles.get(name)?.clone();
        let seed = profile.default_seed;
        let launcher = profile.launcher_path();

        Ok(Self {
            seed,
            model_dir: PathBuf::from("./resnet50_model"),
            launcher,
            training_script: PathBuf::from("imagenet_main.py"),
            dry_run: false,
            profile,
        })
    }

    /// Effective OpenMP thread count; 0 in the profile sizes from
    /// the host's physical cores.
    pub fn omp_threads(&self) -> u32 {
        if self.profile.omp_threads == 0 {
            num_cpus::get_physical() as u32
        } else {
            self.profile.omp_threads
        }
    }
}
