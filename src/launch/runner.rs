//! Launcher invocation
//!
//! Two states: configuring, launched. Every setup failure aborts before the
//! external launcher is spawned; once spawned, the child's exit status is
//! this process's exit status, untranslated.

use crate::config::LaunchConfig;
use crate::env::EnvironmentConfig;
use crate::error::{IoResultExt, LaunchError, Result};
use crate::spark::SubmitArgs;
use std::process::Command;
use tracing::{debug, info};

/// Drives one configure-then-launch sequence
pub struct Launcher {
    config: LaunchConfig,
}

impl Launcher {
    /// Create a launcher for a resolved configuration
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }

    /// The resolved configuration
    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Assemble and validate the child environment
    pub fn environment(&self) -> Result<EnvironmentConfig> {
        let env = EnvironmentConfig::assemble(&self.config)?;
        env.validate()?;
        Ok(env)
    }

    /// Build the launcher argument list
    pub fn submit_args(&self) -> SubmitArgs {
        SubmitArgs::from_config(&self.config)
    }

    /// Fail-fast setup validation.
    ///
    /// Checks everything the launch depends on so that a broken setup never
    /// reaches the external launcher: the launcher script and training
    /// script exist, and real-data profiles point at an existing dataset.
    pub fn preflight(&self) -> Result<()> {
        let launcher = &self.config.launcher;
        if !launcher.is_file() {
            return Err(LaunchError::LauncherNotFound(launcher.clone()));
        }

        let script = &self.config.training_script;
        if !script.is_file() {
            return Err(LaunchError::TrainingScriptNotFound(script.clone()));
        }

        if let Some(data_dir) = self.config.profile.data.data_dir() {
            if !data_dir.is_dir() {
                return Err(LaunchError::DataDirNotFound(data_dir.to_path_buf()));
            }
        }

        debug!(launcher = %launcher.display(), "preflight passed");
        Ok(())
    }

    /// Validate, spawn the external launcher, and wait for it.
    ///
    /// Returns the child's exit code unchanged. A child killed by a signal
    /// is an error carrying the signal number; `exit_code_for` maps it to
    /// the conventional 128+signal shell code.
    pub fn run(&self) -> Result<i32> {
        let env = self.environment()?;
        self.preflight()?;

        let args = self.submit_args();
        let argv = args.argv();

        info!(
            launcher = %self.config.launcher.display(),
            profile = %self.config.profile.name,
            "launching"
        );
        debug!(?argv, "launcher arguments");

        let mut command = Command::new(&self.config.launcher);
        command.args(&argv);
        env.apply(&mut command);

        let status = command.status().with_path(&self.config.launcher)?;

        match status.code() {
            Some(code) => Ok(code),
            None => Err(LaunchError::KilledBySignal(signal_of(&status))),
        }
    }
}

#[cfg(unix)]
fn signal_of(status: &std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().unwrap_or(0)
}

#[cfg(not(unix))]
fn signal_of(_status: &std::process::ExitStatus) -> i32 {
    0
}

/// Map a launch result to this process's exit code.
///
/// Setup failures exit 1; a child killed by a signal maps to the
/// conventional 128+signal shell code.
pub fn exit_code_for(result: &Result<i32>) -> i32 {
    match result {
        Ok(code) => *code,
        Err(err) if err.is_setup_error() => 1,
        Err(LaunchError::KilledBySignal(signal)) => 128 + signal,
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DataMode, LaunchConfig};
    use std::fs;
    use std::path::{Path, PathBuf};

    fn stub_config(dir: &Path, exit_code: i32) -> LaunchConfig {
        let launcher = dir.join("spark-submit-python-with-zoo.sh");
        let marker = dir.join("launched.marker");
        write_executable(
            &launcher,
            &format!("#!/bin/sh\ntouch {}\nexit {}\n", marker.display(), exit_code),
        );

        let script = dir.join("imagenet_main.py");
        fs::write(&script, "# stub\n").unwrap();

        let mut config = LaunchConfig::for_profile_name("synthetic-2s").unwrap();
        config.launcher = launcher;
        config.training_script = script;
        config.model_dir = dir.join("model");
        config
    }

    #[cfg(unix)]
    fn write_executable(path: &Path, contents: &str) {
        use std::os::unix::fs::PermissionsExt;
        fs::write(path, contents).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(not(unix))]
    fn write_executable(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_exit_code_passthrough_success() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Launcher::new(stub_config(dir.path(), 0));
        assert_eq!(launcher.run().unwrap(), 0);
        assert!(dir.path().join("launched.marker").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_exit_code_passthrough_failure() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Launcher::new(stub_config(dir.path(), 3));
        assert_eq!(launcher.run().unwrap(), 3);
    }

    #[test]
    fn test_missing_launcher_aborts_before_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = stub_config(dir.path(), 0);
        let marker = dir.path().join("launched.marker");
        config.launcher = PathBuf::from("/nonexistent/spark-submit-python-with-zoo.sh");

        let result = Launcher::new(config).run();
        assert!(matches!(result, Err(LaunchError::LauncherNotFound(_))));
        assert!(!marker.exists(), "launcher must not have been invoked");
    }

    #[test]
    fn test_missing_data_dir_aborts_before_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = stub_config(dir.path(), 0);
        let marker = dir.path().join("launched.marker");
        config.profile.data = DataMode::Real {
            data_dir: dir.path().join("no-such-dataset"),
            train_epochs: 90,
        };

        let result = Launcher::new(config).run();
        assert!(matches!(result, Err(LaunchError::DataDirNotFound(_))));
        assert!(!marker.exists(), "launcher must not have been invoked");
    }

    #[test]
    fn test_missing_training_script_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = stub_config(dir.path(), 0);
        config.training_script = dir.path().join("missing_main.py");

        let result = Launcher::new(config).preflight();
        assert!(matches!(
            result,
            Err(LaunchError::TrainingScriptNotFound(_))
        ));
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_code_for(&Ok(0)), 0);
        assert_eq!(exit_code_for(&Ok(3)), 3);
        assert_eq!(exit_code_for(&Err(LaunchError::KilledBySignal(9))), 137);
        assert_eq!(
            exit_code_for(&Err(LaunchError::ConfigError("x".into()))),
            1
        );

        // Every setup error exits 1, never the signal range
        let setup = LaunchError::LauncherNotFound(PathBuf::from("/x"));
        assert!(setup.is_setup_error());
        assert_eq!(exit_code_for(&Err(setup)), 1);
    }
}
