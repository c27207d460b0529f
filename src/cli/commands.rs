//! Command implementations for CLI operations

use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;
use crate::launch::Launcher;
use crate::merge::merge;
use crate::project::Project;
use crate::split::split;
use crate::types::{MergeReport, SplitReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Save,
    Open,
    Sync,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Save => "save",
            Command::Open => "open",
            Command::Sync => "sync",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "save" => Some(Command::Save),
            "open" => Some(Command::Open),
            "sync" => Some(Command::Sync),
            _ => None,
        }
    }
}

/// What a command left on disk
#[derive(Debug, Clone)]
pub enum Outcome {
    Saved(SplitReport),
    Opened(MergeReport),
}

/// Runs save / open / sync against one engine and launcher
pub struct Dispatcher<'a> {
    engine: &'a dyn Engine,
    launcher: &'a dyn Launcher,
    config: &'a Config,
}

impl<'a> Dispatcher<'a> {
    pub fn new(engine: &'a dyn Engine, launcher: &'a dyn Launcher, config: &'a Config) -> Self {
        Self {
            engine,
            launcher,
            config,
        }
    }

    pub fn run(&self, command: Command, path: &Path) -> Result<Outcome> {
        match command {
            Command::Save => self.save(path).map(Outcome::Saved),
            Command::Open => self.open(path).map(Outcome::Opened),
            Command::Sync => self.sync(path).map(Outcome::Opened),
        }
    }

    /// Convert the database into SQL files.
    ///
    /// The first save of a project goes through a full open and a second
    /// save, so the committed files already carry the engine's own dump
    /// formatting.
    pub fn save(&self, path: &Path) -> Result<SplitReport> {
        let project = Project::from_path(path);
        let report = split(self.engine, &project, path, self.config.split_documents)?;
        if !report.base_created {
            return Ok(report);
        }

        info!(
            "Created {}, rebuilding the project once to settle its format",
            report.base_sql.display()
        );
        let merged = merge(self.engine, &project, path)?;
        split(
            self.engine,
            &project,
            &merged.database,
            self.config.split_documents,
        )
    }

    /// Restore the database from SQL files and start the application
    pub fn open(&self, path: &Path) -> Result<MergeReport> {
        let project = Project::from_path(path);
        let report = merge(self.engine, &project, path)?;
        self.launch(&report)?;
        Ok(report)
    }

    /// Save whatever the database holds, then restore it from the SQL files.
    ///
    /// A missing database is not an error here: the project may only exist
    /// as SQL files, e.g. right after a checkout.
    pub fn sync(&self, path: &Path) -> Result<MergeReport> {
        match self.save(path) {
            Ok(_) => {}
            Err(err) if err.is_not_found() => info!("Nothing to save: {}", err),
            Err(err) => return Err(err),
        }
        self.open(path)
    }

    fn launch(&self, report: &MergeReport) -> Result<()> {
        if self.config.launch {
            self.launcher.launch(&report.database)?;
        }
        Ok(())
    }
}
