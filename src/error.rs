//! Error types for easyeda-git
//!
//! Every failure is fatal except a missing source database during `sync`,
//! which the dispatcher detects with [`Error::is_not_found`].

use std::path::PathBuf;
use std::process::ExitStatus;
use std::string::FromUtf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Source database or base dump is absent
    #[error("{what} not found: {}", path.display())]
    NotFound { what: &'static str, path: PathBuf },

    /// The SQL engine exited with a non-zero status
    #[error("{program} {args:?} failed with {status}: {stderr}")]
    EngineFailed {
        program: String,
        args: Vec<String>,
        status: ExitStatus,
        stderr: String,
    },

    /// The SQL engine printed something that is not UTF-8
    #[error("unreadable output from {program}")]
    EngineOutput {
        program: String,
        #[source]
        source: FromUtf8Error,
    },

    /// A query answered with something that cannot be parsed
    #[error("unexpected engine output for `{query}`: {output:?}")]
    MalformedOutput { query: String, output: String },

    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Two documents resolve to the same tree-name
    #[error("Duplicate document name at {0}. Please rename it before continuing")]
    DuplicateTreeName(String),

    #[error("unsupported platform {os}/{arch}")]
    UnsupportedPlatform {
        os: &'static str,
        arch: &'static str,
    },

    #[error("no sqlite3 executable found (searched: {searched})")]
    EngineUnavailable { searched: String },

    #[error("EasyEDA / LCEDA is not installed (looked for: {candidates})")]
    LauncherNotFound { candidates: String },

    #[error("failed to launch {}", path.display())]
    LaunchFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(query: &str, output: &str) -> Self {
        Error::MalformedOutput {
            query: query.to_string(),
            output: output.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
