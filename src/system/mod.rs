//! Host resource detection
//!
//! Powers the `analyze` subcommand and the automatic OpenMP thread sizing.

mod resources;

pub use resources::*;
