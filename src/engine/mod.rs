//! SQL engine capability
//!
//! All SQL semantics live behind [`Engine`]. The splitter and merger only
//! ever talk to this trait, so they run the same against:
//! - [`Sqlite3Cli`]: an external `sqlite3` process
//! - [`EmbeddedEngine`]: the SQLite library linked into this binary
//!
//! Query output follows the `sqlite3` list mode: one row per line, columns
//! separated by `|`, NULL printed as nothing. List mode is lossy for text
//! holding newlines, `|` or control characters, so callers that need exact
//! values select `hex(...)` and decode it with [`decode_hex_text`].

mod cli;
mod embedded;
mod locate;

use std::path::Path;

use crate::error::Result;

pub use cli::Sqlite3Cli;
pub use embedded::EmbeddedEngine;
pub use locate::{EngineLocator, EngineSource};

pub trait Engine {
    /// Run one statement against `database` and return its list-mode output
    fn execute(&self, database: &Path, sql: &str) -> Result<String>;

    /// Full textual dump of `database` (schema and data)
    fn dump(&self, database: &Path) -> Result<String>;

    /// Replay a SQL script against `database`, creating it if needed
    fn read(&self, database: &Path, script: &Path) -> Result<()>;

    /// Short label for logs
    fn describe(&self) -> String;
}

/// Quote a value as a SQL string literal
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// SQL expression for `text` that survives line-oriented script readers.
///
/// Newlines and tabs stay inside the quoted literal so payload diffs stay
/// readable. Every other control character (CR included) is spliced in as
/// `char(N)`, since the `sqlite3` shell drops a CR before a line break and
/// its output mode rewrites the rest.
pub fn text_literal(text: &str) -> String {
    let mut parts = Vec::new();
    let mut run = String::new();
    for c in text.chars() {
        if c.is_control() && c != '\n' && c != '\t' {
            if !run.is_empty() {
                parts.push(sql_literal(&run));
                run.clear();
            }
            parts.push(format!("char({})", c as u32));
        } else {
            run.push(c);
        }
    }
    if !run.is_empty() || parts.is_empty() {
        parts.push(sql_literal(&run));
    }
    parts.join(" || ")
}

/// Decode one `hex(...)` column; NULL and the empty string both decode to
/// an empty string
pub fn decode_hex_text(field: &str) -> Option<String> {
    let bytes = hex::decode(field.trim()).ok()?;
    String::from_utf8(bytes).ok()
}

/// Trim the trailing blanks and newlines `sqlite3` leaves after output
pub fn trim_output(output: &str) -> &str {
    output.trim_matches(|c| c == ' ' || c == '\r' || c == '\n')
}
