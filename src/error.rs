//! Error types for ZooLaunch
//!
//! This module defines all error types used throughout the application.
//! Errors split into two families: setup errors, which abort before the
//! external launcher is ever invoked, and execution errors, which carry
//! the exit status of the launched process.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ZooLaunch operations
#[derive(Error, Debug)]
pub enum LaunchError {
    /// I/O error during file operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external submission launcher was not found
    #[error("Launcher not found: {0}")]
    LauncherNotFound(PathBuf),

    /// The training entry point script was not found
    #[error("Training script not found: {0}")]
    TrainingScriptNotFound(PathBuf),

    /// Dataset directory required for real-data training is missing
    #[error("Data directory not found: {0}")]
    DataDirNotFound(PathBuf),

    /// Unknown deployment profile name
    #[error("Unknown profile '{name}' (available: {available})")]
    UnknownProfile { name: String, available: String },

    /// Environment variable resolved to an empty value
    #[error("Environment variable '{0}' would be exported empty")]
    EmptyEnvVar(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Profile file parsing error
    #[error("Profile file error: {0}")]
    ProfileFileError(String),

    /// The launched process was killed by a signal before exiting
    #[error("Launcher terminated by signal {0}")]
    KilledBySignal(i32),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<LaunchError>,
    },
}

impl LaunchError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check whether this error belongs to the setup phase.
    ///
    /// Setup errors abort before the launcher is spawned; anything else
    /// surfaces only as the child's exit status.
    pub fn is_setup_error(&self) -> bool {
        !matches!(self, Self::KilledBySignal(_))
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::LauncherNotFound(path)
            | Self::TrainingScriptNotFound(path)
            | Self::DataDirNotFound(path) => Some(path),
            Self::WithContext { source, .. } => source.path(),
            _ => None,
        }
    }
}

/// Result type alias for ZooLaunch operations
pub type Result<T> = std::result::Result<T, LaunchError>;

impl From<std::io::Error> for LaunchError {
    fn from(err: std::io::Error) -> Self {
        LaunchError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for LaunchError {
    fn from(err: serde_json::Error) -> Self {
        LaunchError::ProfileFileError(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| LaunchError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = LaunchError::io("/test/path", io_err);
        assert!(err.path().is_some());
        assert_eq!(err.path().unwrap(), &PathBuf::from("/test/path"));
    }

    #[test]
    fn test_setup_error_classification() {
        assert!(LaunchError::LauncherNotFound(PathBuf::from("/x")).is_setup_error());
        assert!(LaunchError::EmptyEnvVar("SPARK_HOME".into()).is_setup_error());
        assert!(!LaunchError::KilledBySignal(9).is_setup_error());
    }

    #[test]
    fn test_context_preserves_path() {
        let err = LaunchError::DataDirNotFound(PathBuf::from("/opt/ILSVRC2012"))
            .with_context("preflight");
        assert_eq!(err.path().unwrap(), &PathBuf::from("/opt/ILSVRC2012"));
    }
}
