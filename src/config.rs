//! Runtime configuration
//!
//! Defaults, overridden by `EASYEDA_GIT_*` environment variables, overridden
//! by command-line flags (applied in `main`).

use std::env;
use std::path::PathBuf;

/// Which SQL engine the locator may hand out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnginePreference {
    /// External `sqlite3` if one can be found, the bundled library otherwise
    #[default]
    Auto,
    /// External `sqlite3` only
    Cli,
    /// Bundled library only
    Embedded,
}

impl EnginePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnginePreference::Auto => "auto",
            EnginePreference::Cli => "cli",
            EnginePreference::Embedded => "embedded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(EnginePreference::Auto),
            "cli" | "sqlite3" => Some(EnginePreference::Cli),
            "embedded" | "bundled" => Some(EnginePreference::Embedded),
            _ => None,
        }
    }
}

/// Configuration for save / open / sync
#[derive(Debug, Clone)]
pub struct Config {
    /// Extract each document payload into its own SQL file
    pub split_documents: bool,
    /// Start the GUI after open / sync
    pub launch: bool,
    pub engine: EnginePreference,
    /// Explicit `sqlite3` executable, tried before the search path
    pub sqlite3: Option<PathBuf>,
    /// Explicit GUI executable, tried before the platform defaults
    pub launcher: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            split_documents: true,
            launch: true,
            engine: EnginePreference::Auto,
            sqlite3: None,
            launcher: None,
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).map_or(false, |v| v == "1" || v == "true");
        let path = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };

        let mut config = Self::default();
        if flag("EASYEDA_GIT_NO_SPLIT") {
            config.split_documents = false;
        }
        if flag("EASYEDA_GIT_NO_START") {
            config.launch = false;
        }
        if let Some(engine) = lookup("EASYEDA_GIT_ENGINE")
            .as_deref()
            .and_then(EnginePreference::from_str)
        {
            config.engine = engine;
        }
        config.sqlite3 = path("EASYEDA_GIT_SQLITE3");
        config.launcher = path("EASYEDA_GIT_LAUNCHER");
        config
    }
}
