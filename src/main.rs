//! easyeda-git: EasyEDA Pro projects as diffable SQL files
//!
//! Usage:
//!   easyeda-git [sync] <eprjDB-file>   Save into SQL files, then restore from them
//!   easyeda-git save <eprjDB-file>     Convert the project into SQL files
//!   easyeda-git open <eprjDB-file>     Restore the project and start EasyEDA

use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{debug, error, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use easyeda_git::cli::{Cli, Dispatcher, Outcome};
use easyeda_git::config::Config;
use easyeda_git::engine::EngineLocator;
use easyeda_git::launch::DesktopLauncher;
use easyeda_git::project::Project;

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let (command, path) = cli.invocation().map_err(|msg| anyhow!(msg))?;
    let config = cli.apply(Config::from_env());
    debug!("Command: {}", command.as_str());
    debug!("Project: {}", path.display());

    let project = Project::from_path(&path);
    let engine = EngineLocator::new(&config, &project.dir)
        .locate()
        .context("Could not find a SQL engine")?;
    debug!("Using {}", engine.describe());

    let launcher = DesktopLauncher::new(config.launcher.clone());
    let dispatcher = Dispatcher::new(engine.as_ref(), &launcher, &config);
    let outcome = dispatcher
        .run(command, &path)
        .with_context(|| format!("{} {} failed", command.as_str(), path.display()))?;

    match outcome {
        Outcome::Saved(report) => {
            println!(
                "Saved {} into {} ({} documents)",
                project.name,
                report.base_sql.display(),
                report.documents.len()
            );
        }
        Outcome::Opened(report) => {
            println!(
                "Restored {} from {} document files",
                report.database.display(),
                report.documents.len()
            );
            if let Some(backup) = report.backup {
                println!("Previous database kept at {}", backup.display());
            }
        }
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
