//! Engine discovery
//!
//! Sources are tried in order until one yields an engine:
//! 1. an explicit `sqlite3` path from the configuration
//! 2. `sqlite3` on the search path
//! 3. a `sqlite3` left in the project directory (the local cache)
//! 4. the bundled SQLite library

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{EmbeddedEngine, Engine, Sqlite3Cli};
use crate::config::{Config, EnginePreference};
use crate::error::{Error, Result};

#[cfg(windows)]
const SQLITE3_BIN: &str = "sqlite3.exe";
#[cfg(not(windows))]
const SQLITE3_BIN: &str = "sqlite3";

/// A regular file the current user may run
#[cfg(unix)]
fn runnable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn runnable(path: &Path) -> bool {
    path.is_file()
}

/// One place an engine may come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSource {
    Explicit(PathBuf),
    SearchPath,
    LocalCache(PathBuf),
    Bundled,
}

impl EngineSource {
    /// The `sqlite3` executable this source points at, if it is there
    fn program(&self) -> Option<PathBuf> {
        match self {
            EngineSource::Explicit(path) => runnable(path).then(|| path.clone()),
            EngineSource::SearchPath => {
                let search_path = std::env::var_os("PATH")?;
                std::env::split_paths(&search_path)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(|dir| dir.join(SQLITE3_BIN))
                    .find(|candidate| runnable(candidate))
            }
            EngineSource::LocalCache(dir) => {
                let candidate = dir.join(SQLITE3_BIN);
                runnable(&candidate).then_some(candidate)
            }
            EngineSource::Bundled => None,
        }
    }

    fn resolve(&self) -> Option<Box<dyn Engine>> {
        match self {
            EngineSource::Bundled => Some(Box::new(EmbeddedEngine::new())),
            source => source
                .program()
                .map(|program| Box::new(Sqlite3Cli::new(program)) as Box<dyn Engine>),
        }
    }

    fn describe(&self) -> String {
        match self {
            EngineSource::Explicit(path) => path.display().to_string(),
            EngineSource::SearchPath => format!("{} on PATH", SQLITE3_BIN),
            EngineSource::LocalCache(dir) => dir.join(SQLITE3_BIN).display().to_string(),
            EngineSource::Bundled => "bundled library".to_string(),
        }
    }
}

/// Ordered engine lookup for one project directory
#[derive(Debug, Clone)]
pub struct EngineLocator {
    sources: Vec<EngineSource>,
}

impl EngineLocator {
    pub fn new(config: &Config, project_dir: &Path) -> Self {
        let mut sources = Vec::new();
        if config.engine != EnginePreference::Embedded {
            if let Some(explicit) = &config.sqlite3 {
                sources.push(EngineSource::Explicit(explicit.clone()));
            }
            sources.push(EngineSource::SearchPath);
            sources.push(EngineSource::LocalCache(project_dir.to_path_buf()));
        }
        if config.engine != EnginePreference::Cli {
            sources.push(EngineSource::Bundled);
        }
        Self { sources }
    }

    pub fn sources(&self) -> &[EngineSource] {
        &self.sources
    }

    pub fn locate(&self) -> Result<Box<dyn Engine>> {
        for source in &self.sources {
            debug!("Try engine source {}", source.describe());
            if let Some(engine) = source.resolve() {
                return Ok(engine);
            }
        }
        Err(Error::EngineUnavailable {
            searched: self
                .sources
                .iter()
                .map(EngineSource::describe)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}
