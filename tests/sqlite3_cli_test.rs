//! Save / open through an external `sqlite3` process
//!
//! Every test returns early when no `sqlite3` executable is installed.

use std::fs;
use std::path::Path;

use easyeda_git::config::EnginePreference;
use easyeda_git::engine::{Engine, EngineLocator};
use easyeda_git::merge::{document_files, replay_documents};
use easyeda_git::{merge, split, Config, Error, Project};
use rusqlite::Connection;
use tempfile::tempdir;

const SCHEMA: &str = r#"
CREATE TABLE projects (uuid TEXT PRIMARY KEY, name TEXT NOT NULL);
CREATE TABLE schematics (uuid TEXT PRIMARY KEY, display_name TEXT NOT NULL);
CREATE TABLE documents (
    uuid TEXT PRIMARY KEY,
    display_title TEXT NOT NULL,
    schematic_uuid TEXT,
    project_uuid TEXT NOT NULL,
    dataStr TEXT
);
INSERT INTO projects VALUES ('P', 'proj');
INSERT INTO schematics VALUES ('S1', 'Main');
"#;

/// (uuid, title, schematic, payload)
type Row<'a> = (&'a str, &'a str, Option<&'a str>, Option<&'a str>);

fn system_sqlite3(dir: &Path) -> Option<Box<dyn Engine>> {
    let config = Config {
        engine: EnginePreference::Cli,
        ..Default::default()
    };
    match EngineLocator::new(&config, dir).locate() {
        Ok(engine) => Some(engine),
        Err(_) => {
            eprintln!("sqlite3 is not installed, skipping");
            None
        }
    }
}

fn create_project(dir: &Path, rows: &[Row]) -> Project {
    let project = Project::new("proj", dir);
    let conn = Connection::open(project.database_path()).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    for (uuid, title, schematic, payload) in rows {
        conn.execute(
            "INSERT INTO documents VALUES (?1, ?2, ?3, 'P', ?4)",
            rusqlite::params![uuid, title, schematic, payload],
        )
        .unwrap();
    }
    project
}

fn payloads(database: &Path) -> Vec<(String, Option<String>)> {
    let conn = Connection::open(database).unwrap();
    let mut stmt = conn
        .prepare("SELECT uuid, dataStr FROM documents ORDER BY uuid")
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap();
    rows.collect::<rusqlite::Result<_>>().unwrap()
}

fn awkward_rows() -> Vec<Row<'static>> {
    vec![
        ("A", "Sheet1", None, Some(r#"{"shapes":[{"type":"wire"}]}"#)),
        ("B", "Sheet1", Some("S1"), Some("{..}\nit's\r\n\ttab")),
        ("C", "Console", None, Some("esc\u{1b}[0m bell\u{7}")),
        ("D", "Trailing", None, Some("cr at the end\r")),
        ("E", "Unicode", None, Some("电阻 10kΩ ±1%\r\n")),
        ("F", "Empty", None, Some("")),
        ("G", "Missing", None, None),
    ]
}

#[test]
fn test_round_trip_keeps_carriage_returns_and_control_characters() {
    let dir = tempdir().unwrap();
    let Some(engine) = system_sqlite3(dir.path()) else {
        return;
    };
    let project = create_project(dir.path(), &awkward_rows());
    let original = payloads(&project.database_path());

    let report = split(engine.as_ref(), &project, &project.database_path(), true).unwrap();
    assert_eq!(report.documents.len(), original.len());
    for document in &report.documents {
        let statement = fs::read_to_string(&document.path).unwrap();
        assert!(!statement.contains('\r'), "{}", document.path.display());
    }

    fs::remove_file(project.database_path()).unwrap();
    let merged = merge(engine.as_ref(), &project, &project.base_sql_path()).unwrap();

    assert_eq!(merged.backup, None);
    assert_eq!(payloads(&merged.database), original);
}

#[test]
fn test_repeated_save_is_stable() {
    let dir = tempdir().unwrap();
    let Some(engine) = system_sqlite3(dir.path()) else {
        return;
    };
    let project = create_project(dir.path(), &awkward_rows());

    let first = split(engine.as_ref(), &project, &project.database_path(), true).unwrap();
    let first_contents: Vec<String> = first
        .documents
        .iter()
        .map(|d| fs::read_to_string(&d.path).unwrap())
        .collect();

    merge(engine.as_ref(), &project, &project.base_sql_path()).unwrap();
    let second = split(engine.as_ref(), &project, &project.database_path(), true).unwrap();
    let second_contents: Vec<String> = second
        .documents
        .iter()
        .map(|d| fs::read_to_string(&d.path).unwrap())
        .collect();

    assert_eq!(first.documents, second.documents);
    assert_eq!(first_contents, second_contents);
}

#[test]
fn test_replay_order_does_not_matter() {
    let dir = tempdir().unwrap();
    let Some(engine) = system_sqlite3(dir.path()) else {
        return;
    };
    let project = create_project(dir.path(), &awkward_rows());
    split(engine.as_ref(), &project, &project.database_path(), true).unwrap();

    let files = document_files(&project).unwrap();
    let mut reversed = files.clone();
    reversed.reverse();

    let mut restored = Vec::new();
    for (i, order) in [files, reversed].iter().enumerate() {
        let database = dir.path().join(format!("replay{}.db", i));
        engine.read(&database, &project.base_sql_path()).unwrap();
        replay_documents(engine.as_ref(), &database, order).unwrap();
        restored.push(payloads(&database));
    }

    assert_eq!(restored[0], restored[1]);
}

#[cfg(unix)]
#[test]
fn test_title_with_line_break_is_extracted() {
    let dir = tempdir().unwrap();
    let Some(engine) = system_sqlite3(dir.path()) else {
        return;
    };
    let project = create_project(
        dir.path(),
        &[
            ("A", "Top\nX|Y", Some("S1"), Some("top sheet")),
            ("X", "Y", Some("S1"), Some("other sheet")),
        ],
    );

    let report = split(engine.as_ref(), &project, &project.database_path(), true).unwrap();
    let mut uuids: Vec<&str> = report.documents.iter().map(|d| d.uuid.as_str()).collect();
    uuids.sort();
    assert_eq!(uuids, vec!["A", "X"]);
    assert!(report
        .documents
        .iter()
        .any(|d| d.tree_name == "proj_Main_Top\nX|Y"));
}

#[test]
fn test_duplicate_tree_name_is_fatal() {
    let dir = tempdir().unwrap();
    let Some(engine) = system_sqlite3(dir.path()) else {
        return;
    };
    let project = create_project(
        dir.path(),
        &[
            ("A", "Sheet1", Some("S1"), Some("a")),
            ("B", "Sheet1", Some("S1"), Some("b")),
        ],
    );

    let err = split(engine.as_ref(), &project, &project.database_path(), true).unwrap_err();
    assert!(matches!(&err, Error::DuplicateTreeName(name) if name == "proj_Main_Sheet1"));
    assert!(!project.base_sql_path().exists());
}

#[test]
fn test_tree_names_differing_only_in_case_are_fatal() {
    let dir = tempdir().unwrap();
    let Some(engine) = system_sqlite3(dir.path()) else {
        return;
    };
    let project = create_project(
        dir.path(),
        &[
            ("A", "Sheet1", None, Some("a")),
            ("B", "sheet1", None, Some("b")),
        ],
    );

    let err = split(engine.as_ref(), &project, &project.database_path(), true).unwrap_err();
    assert!(matches!(&err, Error::DuplicateTreeName(name) if name == "proj_sheet1"));
}
