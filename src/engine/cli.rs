//! External `sqlite3` process

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use super::Engine;
use crate::error::{Error, Result};

/// Runs every request as `sqlite3 <database> <command>` and blocks until it
/// exits.
#[derive(Debug, Clone)]
pub struct Sqlite3Cli {
    program: PathBuf,
}

impl Sqlite3Cli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, database: &Path, command: &str) -> Result<String> {
        let program = self.program.display().to_string();
        let args = vec![database.display().to_string(), command.to_string()];
        debug!("Run sqlite3 {} {}", program, abbreviate(command));

        let output = Command::new(&self.program)
            .arg(database)
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(Error::EngineFailed {
                program,
                args,
                status: output.status,
                stderr,
            });
        }
        if !stderr.is_empty() {
            warn!("sqlite3: {}", stderr);
        }

        String::from_utf8(output.stdout).map_err(|source| Error::EngineOutput { program, source })
    }
}

impl Engine for Sqlite3Cli {
    fn execute(&self, database: &Path, sql: &str) -> Result<String> {
        self.run(database, sql)
    }

    fn dump(&self, database: &Path) -> Result<String> {
        self.run(database, ".dump")
    }

    fn read(&self, database: &Path, script: &Path) -> Result<()> {
        self.run(database, &read_command(script))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sqlite3 at {}", self.program.display())
    }
}

/// `.read "<path>"` with the argument escaped for the sqlite3 shell
fn read_command(script: &Path) -> String {
    let path = script.display().to_string();
    let escaped = path.replace('\\', "\\\\").replace('"', "\\\"");
    format!(".read \"{}\"", escaped)
}

/// Keep debug logs readable when a command embeds a whole payload
fn abbreviate(command: &str) -> String {
    const MAX: usize = 120;
    match command.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}... ({} bytes)", &command[..cut], command.len()),
        None => command.to_string(),
    }
}
