use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use super::commands::Command;
use crate::config::{Config, EnginePreference};

#[derive(Parser, Debug)]
#[command(name = "easyeda-git", version)]
#[command(
    about = "Convert EasyEDA Pro project files into SQL files for diffing and version control",
    long_about = None,
    after_help = "\
Examples:
    easyeda-git MyProject.eprjDB
        Run `sync`: save the project into SQL files, then restore it from them
    easyeda-git save MyProject.eprjDB
        Convert the project into SQL files, usually before committing
    easyeda-git open MyProject.eprjDB.sql
        Restore the project from SQL files and start EasyEDA, usually after a checkout"
)]
pub struct Cli {
    /// [sync|save|open] followed by the project file
    #[arg(value_name = "ARGS", required = true)]
    pub args: Vec<String>,

    /// Do not extract documents into separate SQL files
    #[arg(long)]
    pub no_split: bool,

    /// Do not start EasyEDA after open / sync
    #[arg(long)]
    pub no_start: bool,

    /// Which SQL engine to use
    #[arg(long, value_enum)]
    pub engine: Option<EngineArg>,

    /// Path to a sqlite3 executable
    #[arg(long, value_name = "PATH")]
    pub sqlite3: Option<PathBuf>,

    /// Print verbose messages
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineArg {
    Auto,
    Cli,
    Embedded,
}

impl From<EngineArg> for EnginePreference {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Auto => EnginePreference::Auto,
            EngineArg::Cli => EnginePreference::Cli,
            EngineArg::Embedded => EnginePreference::Embedded,
        }
    }
}

impl Cli {
    /// `<path>` alone means `sync <path>`
    pub fn invocation(&self) -> Result<(Command, PathBuf), String> {
        match self.args.as_slice() {
            [only] => match Command::from_str(only) {
                Some(command) => Err(format!("missing project file after `{}`", command.as_str())),
                None => Ok((Command::Sync, PathBuf::from(only))),
            },
            [command, path] => match Command::from_str(command) {
                Some(command) => Ok((command, PathBuf::from(path))),
                None => Err(format!(
                    "unknown command `{}`, expected sync, save or open",
                    command
                )),
            },
            _ => Err("usage: easyeda-git [sync|save|open] <eprjDB-file>".to_string()),
        }
    }

    /// Flags override whatever the environment configured
    pub fn apply(&self, mut config: Config) -> Config {
        if self.no_split {
            config.split_documents = false;
        }
        if self.no_start {
            config.launch = false;
        }
        if let Some(engine) = self.engine {
            config.engine = engine.into();
        }
        if let Some(sqlite3) = &self.sqlite3 {
            config.sqlite3 = Some(sqlite3.clone());
        }
        config
    }
}
