//! Process environment assembly
//!
//! Builds the environment block inherited by the external launcher:
//! PYTHONPATH augmentation, OpenMP thread-pool sizing, KMP thread
//! affinity, and the framework home directories.

mod environment;

pub use environment::*;
