//! Merger: SQL files -> binary project database
//!
//! Any live database is moved into the backup directory first, then the base
//! dump and every per-document file are replayed into a fresh database.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::project::Project;
use crate::types::MergeReport;

const BACKUP_TIMESTAMP: &str = "%Y%m%d%H%M%S";

/// Rebuild `<name>.eprjDB` from the base dump and the document files.
///
/// `given` may point straight at a base dump; otherwise the dump is derived
/// from the project name.
pub fn merge(engine: &dyn Engine, project: &Project, given: &Path) -> Result<MergeReport> {
    let base_sql = project.resolve_base_sql(given);
    if !base_sql.is_file() {
        return Err(Error::NotFound {
            what: "base dump",
            path: base_sql,
        });
    }

    let backup = backup_database(project, Local::now())?;
    let database = project.database_path();

    info!("Load {}", base_sql.display());
    engine.read(&database, &base_sql)?;

    let documents = document_files(project)?;
    replay_documents(engine, &database, &documents)?;

    Ok(MergeReport {
        database,
        backup,
        documents,
    })
}

/// Per-document dumps of the project, sorted by file name
pub fn document_files(project: &Project) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(&project.dir).map_err(|err| Error::io(&project.dir, err))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| Error::io(&project.dir, err))?;
        let name = entry.file_name();
        if project.is_document_sql(&name.to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Replay document files in the given order.
///
/// Each file updates a single row, so any order yields the same database.
pub fn replay_documents(engine: &dyn Engine, database: &Path, files: &[PathBuf]) -> Result<()> {
    for file in files {
        info!("Load {}", file.display());
        engine.read(database, file)?;
    }
    Ok(())
}

/// Move the live database into `<name>_backup/`, stamped with `now`.
///
/// A second backup within the same second gets a `_1`, `_2`, ... suffix
/// instead of replacing the first.
pub fn backup_database(project: &Project, now: DateTime<Local>) -> Result<Option<PathBuf>> {
    let database = project.database_path();
    match fs::symlink_metadata(&database) {
        Ok(_) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(Error::io(&database, err)),
    }

    let backup_dir = project.backup_dir();
    debug!("Creating backup directory {}", backup_dir.display());
    fs::create_dir_all(&backup_dir).map_err(|err| Error::io(&backup_dir, err))?;

    let stamp = now.format(BACKUP_TIMESTAMP).to_string();
    let mut target = project.backup_path(&stamp);
    let mut counter = 1;
    while target.exists() {
        target = project.backup_path(&format!("{}_{}", stamp, counter));
        counter += 1;
    }

    info!("Moving {} to {}", database.display(), target.display());
    fs::rename(&database, &target).map_err(|err| Error::io(&database, err))?;
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_backup_without_database_is_noop() {
        let dir = tempdir().unwrap();
        let project = Project::new("proj", dir.path());
        assert_eq!(backup_database(&project, fixed_time()).unwrap(), None);
        assert!(!project.backup_dir().exists());
    }

    #[test]
    fn test_backup_moves_database_with_timestamp() {
        let dir = tempdir().unwrap();
        let project = Project::new("proj", dir.path());
        fs::write(project.database_path(), b"original bytes").unwrap();

        let backup = backup_database(&project, fixed_time()).unwrap().unwrap();
        assert_eq!(backup, project.backup_path("20240102030405"));
        assert_eq!(fs::read(&backup).unwrap(), b"original bytes");
        assert!(!project.database_path().exists());
    }

    #[test]
    fn test_backups_in_the_same_second_do_not_collide() {
        let dir = tempdir().unwrap();
        let project = Project::new("proj", dir.path());

        let mut backups = Vec::new();
        for content in ["first", "second", "third"] {
            fs::write(project.database_path(), content).unwrap();
            backups.push(backup_database(&project, fixed_time()).unwrap().unwrap());
        }

        assert_eq!(
            backups,
            vec![
                project.backup_path("20240102030405"),
                project.backup_path("20240102030405_1"),
                project.backup_path("20240102030405_2"),
            ]
        );
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "first");
        assert_eq!(fs::read_to_string(&backups[2]).unwrap(), "third");
    }

    #[test]
    fn test_document_files_are_filtered_and_sorted() {
        let dir = tempdir().unwrap();
        let project = Project::new("proj", dir.path());
        for name in [
            "proj_proj_Sheet2.eprjDB.sql",
            "proj.eprjDB.sql",
            "proj_proj_Sheet1.eprjDB.sql",
            "other_proj_Sheet1.eprjDB.sql",
            "proj_notes.txt",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let files = document_files(&project).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("proj_proj_Sheet1.eprjDB.sql"),
                dir.path().join("proj_proj_Sheet2.eprjDB.sql"),
            ]
        );
    }

    #[test]
    fn test_merge_without_base_dump_keeps_live_database() {
        let dir = tempdir().unwrap();
        let project = Project::new("proj", dir.path());
        fs::write(project.database_path(), b"live").unwrap();

        let engine = crate::engine::EmbeddedEngine::new();
        let err = merge(&engine, &project, &project.database_path()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fs::read(project.database_path()).unwrap(), b"live");
        assert!(!project.backup_dir().exists());
    }
}
