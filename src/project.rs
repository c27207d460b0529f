//! Project identity and on-disk naming
//!
//! A project is a name plus a directory. Every artifact lives next to the
//! binary database:
//! - `<name>.eprjDB` (or `.<name>.eprjDB`): live binary database
//! - `<name>.eprjDB.sql`: base dump
//! - `<name>_<tree>.eprjDB.sql`: one file per document
//! - `<name>_backup/<name><YYYYMMDDHHMMSS>.eprjDB`: backups

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DATABASE_EXT: &str = ".eprjDB";
pub const SQL_EXT: &str = ".eprjDB.sql";
const BACKUP_DIR_SUFFIX: &str = "_backup";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub dir: PathBuf,
}

impl Project {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    /// Derive the project from any of its artifacts (database, hidden
    /// database or base dump).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = base.strip_suffix(".sql").unwrap_or(&base);
        let name = name.strip_suffix(DATABASE_EXT).unwrap_or(name);
        let name = name.strip_prefix('.').unwrap_or(name);
        Self::new(name, dir)
    }

    pub fn database_path(&self) -> PathBuf {
        self.dir.join(format!("{}{}", self.name, DATABASE_EXT))
    }

    pub fn hidden_database_path(&self) -> PathBuf {
        self.dir.join(format!(".{}{}", self.name, DATABASE_EXT))
    }

    pub fn base_sql_path(&self) -> PathBuf {
        self.dir.join(format!("{}{}", self.name, SQL_EXT))
    }

    pub fn document_sql_path(&self, tree_name: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}{}", self.name, tree_name, SQL_EXT))
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.dir.join(format!("{}{}", self.name, BACKUP_DIR_SUFFIX))
    }

    pub fn backup_path(&self, timestamp: &str) -> PathBuf {
        self.backup_dir()
            .join(format!("{}{}{}", self.name, timestamp, DATABASE_EXT))
    }

    /// Whether a file name in the project directory is a per-document dump
    pub fn is_document_sql(&self, file_name: &str) -> bool {
        file_name.starts_with(&format!("{}_", self.name)) && file_name.ends_with(SQL_EXT)
    }

    /// Try `<name>.eprjDB`, then `.<name>.eprjDB`
    pub fn guess_database_path(&self) -> Result<PathBuf> {
        for candidate in [self.database_path(), self.hidden_database_path()] {
            match std::fs::metadata(&candidate) {
                Ok(_) => return Ok(candidate),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => return Err(Error::io(candidate, err)),
            }
        }
        Err(Error::NotFound {
            what: "project database",
            path: self.database_path(),
        })
    }

    /// Resolve the database a save should read from
    pub fn resolve_database(&self, given: &Path) -> Result<PathBuf> {
        if given.to_string_lossy().ends_with(DATABASE_EXT) {
            if !given.exists() {
                return Err(Error::NotFound {
                    what: "project database",
                    path: given.to_path_buf(),
                });
            }
            return Ok(given.to_path_buf());
        }
        self.guess_database_path()
    }

    /// Resolve the base dump an open should replay
    pub fn resolve_base_sql(&self, given: &Path) -> PathBuf {
        if given.to_string_lossy().ends_with(SQL_EXT) {
            given.to_path_buf()
        } else {
            self.base_sql_path()
        }
    }
}
