//! Launch preflight and process hand-off

mod runner;

pub use runner::*;
