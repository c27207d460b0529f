//! easyeda-git: EasyEDA Pro projects as diffable SQL files
//!
//! An EasyEDA Pro project is a single SQLite database (`<name>.eprjDB`).
//! This crate turns it into SQL text that version control can diff, and
//! rebuilds the database from that text.
//!
//! ## Files
//!
//! - `<name>.eprjDB.sql` - schema and every row, with document payloads blanked
//! - `<name>_<tree>.eprjDB.sql` - one `UPDATE` per document restoring its payload
//! - `<name>_backup/` - databases replaced by an open, stamped with the time
//!
//! ## Commands
//!
//! - `save` - database to SQL files ([`split`])
//! - `open` - SQL files to database ([`merge`]), then start EasyEDA
//! - `sync` - save, then open
//!
//! All SQL runs through an [`engine::Engine`]: an external `sqlite3` when one
//! is installed, the bundled SQLite library otherwise.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod launch;
pub mod merge;
pub mod project;
pub mod split;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use merge::merge;
pub use project::Project;
pub use split::split;
