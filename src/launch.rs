//! Start the EasyEDA / LCEDA desktop application on a restored project

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Linux install locations, tried in order
const LINUX_CANDIDATES: &[&str] = &["/opt/easyeda-pro/easyeda-pro", "/opt/lceda-pro/lceda-pro"];

pub trait Launcher {
    /// Start the application on `database` without waiting for it
    fn launch(&self, database: &Path) -> Result<()>;
}

/// Launches the installed desktop application
#[derive(Debug, Clone, Default)]
pub struct DesktopLauncher {
    program: Option<PathBuf>,
}

impl DesktopLauncher {
    /// `program` overrides the platform default install locations
    pub fn new(program: Option<PathBuf>) -> Self {
        Self { program }
    }

    fn command(&self, database: &Path) -> Result<Command> {
        if let Some(program) = &self.program {
            let mut cmd = Command::new(program);
            cmd.arg(database);
            return Ok(cmd);
        }

        match std::env::consts::OS {
            "windows" => {
                let mut cmd = Command::new("cmd");
                cmd.args(["/C", "start", ""]).arg(database);
                Ok(cmd)
            }
            "linux" => {
                let program = LINUX_CANDIDATES
                    .iter()
                    .map(Path::new)
                    .find(|p| p.is_file())
                    .ok_or_else(|| Error::LauncherNotFound {
                        candidates: LINUX_CANDIDATES.join(", "),
                    })?;
                let mut cmd = Command::new(program);
                cmd.arg(database);
                Ok(cmd)
            }
            os => Err(Error::UnsupportedPlatform {
                os,
                arch: std::env::consts::ARCH,
            }),
        }
    }
}

impl Launcher for DesktopLauncher {
    fn launch(&self, database: &Path) -> Result<()> {
        let mut cmd = self.command(database)?;
        info!("Start {}", database.display());
        debug!("Run {:?}", cmd);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| Error::LaunchFailed {
                path: database.to_path_buf(),
                source,
            })?;
        Ok(())
    }
}
