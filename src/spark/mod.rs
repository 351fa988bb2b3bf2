//! Spark submission argument construction
//!
//! Builds the ordered token list handed to the external launcher.

mod submit;

pub use submit::*;
