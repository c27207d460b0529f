//! CLI command implementations
//!
//! Handles all command-line interface operations:
//! - save: Convert the project database into SQL files
//! - open: Restore the project database from SQL files
//! - sync: Save, then open

mod args;
mod commands;

pub use args::*;
pub use commands::*;
