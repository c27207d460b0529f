//! Splitter: binary project database -> SQL files
//!
//! Works on a throwaway copy of the database. Each document payload is
//! written to its own `UPDATE` file and blanked in the copy, then the rest
//! of the copy is dumped to the base SQL file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::engine::{decode_hex_text, sql_literal, text_literal, trim_output, Engine};
use crate::error::{Error, Result};
use crate::project::Project;
use crate::types::{Document, DocumentFile, SplitReport};

const LIST_DOCUMENTS: &str = r#"SELECT hex("uuid") FROM "documents""#;

/// Split the project database into the base dump and per-document files.
///
/// `given` is whatever the user pointed at; a path ending in `.eprjDB` is
/// used as-is, anything else makes the database path be guessed from the
/// project name.
pub fn split(
    engine: &dyn Engine,
    project: &Project,
    given: &Path,
    split_documents: bool,
) -> Result<SplitReport> {
    let source = project.resolve_database(given)?;
    let working = clone_database(&source, project)?;

    let documents = if split_documents {
        extract_documents(engine, project, &working)?
    } else {
        Vec::new()
    };

    let dump = engine.dump(&working)?;
    let base_sql = project.base_sql_path();
    let base_created = !base_sql.exists();
    info!("Write {}", base_sql.display());
    fs::write(&base_sql, dump).map_err(|err| Error::io(&base_sql, err))?;

    Ok(SplitReport {
        base_sql,
        documents,
        base_created,
    })
}

/// Copy the source database next to it; the copy is deleted when the
/// returned path is dropped.
fn clone_database(source: &Path, project: &Project) -> Result<TempPath> {
    let working = tempfile::Builder::new()
        .prefix(&format!("{}.", project.name))
        .suffix(".tmp.sqlite3")
        .tempfile_in(&project.dir)
        .map_err(|err| Error::io(&project.dir, err))?
        .into_temp_path();
    debug!("Clone {} to {}", source.display(), working.display());
    fs::copy(source, &working).map_err(|err| Error::io(source, err))?;
    Ok(working)
}

fn extract_documents(
    engine: &dyn Engine,
    project: &Project,
    database: &Path,
) -> Result<Vec<DocumentFile>> {
    let uuids = list_documents(engine, database)?;
    debug!("Found {} documents", uuids.len());

    // Keyed case-insensitively: the files land in one directory, which
    // macOS and Windows treat as case-insensitive.
    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(uuids.len());

    for uuid in uuids {
        let document = describe_document(engine, database, &uuid)?;
        debug!(
            "Get tree name for {} {:?} ({} {})",
            document.uuid,
            document.display_title,
            document.project_uuid,
            document.schematic_uuid.as_deref().unwrap_or("")
        );
        let project_name = lookup_text(
            engine,
            database,
            &format!(
                r#"SELECT hex("name") FROM "projects" WHERE "uuid" = {}"#,
                sql_literal(&document.project_uuid)
            ),
        )?;
        let schematic_name = match &document.schematic_uuid {
            Some(uuid) => Some(lookup_text(
                engine,
                database,
                &format!(
                    r#"SELECT hex("display_name") FROM "schematics" WHERE "uuid" = {}"#,
                    sql_literal(uuid)
                ),
            )?),
            None => None,
        };

        let tree_name = document.tree_name(&project_name, schematic_name.as_deref());
        if !seen.insert(tree_name.to_lowercase()) {
            return Err(Error::DuplicateTreeName(tree_name));
        }

        let path = project.document_sql_path(&tree_name);
        info!(
            "Extract document {} {} into {}",
            document.uuid,
            tree_name,
            path.display()
        );
        let statement = payload_statement(engine, database, &document.uuid)?;
        fs::write(&path, statement).map_err(|err| Error::io(&path, err))?;

        engine.execute(
            database,
            &format!(
                r#"UPDATE "documents" SET "dataStr" = '' WHERE "uuid" = {}"#,
                sql_literal(&document.uuid)
            ),
        )?;

        files.push(DocumentFile {
            uuid: document.uuid,
            tree_name,
            path,
        });
    }

    Ok(files)
}

/// Every document uuid, one hex-encoded row each
fn list_documents(engine: &dyn Engine, database: &Path) -> Result<Vec<String>> {
    let listing = engine.execute(database, LIST_DOCUMENTS)?;
    let mut uuids = Vec::new();
    for row in listing.lines().map(trim_output) {
        if row.is_empty() {
            warn!("Skip document without uuid");
            continue;
        }
        let uuid = decode_hex_text(row).ok_or_else(|| Error::malformed(LIST_DOCUMENTS, row))?;
        uuids.push(uuid);
    }
    Ok(uuids)
}

fn describe_document(engine: &dyn Engine, database: &Path, uuid: &str) -> Result<Document> {
    let query = format!(
        r#"SELECT hex("display_title"), hex("schematic_uuid"), hex("project_uuid") FROM "documents" WHERE "uuid" = {}"#,
        sql_literal(uuid)
    );
    let output = engine.execute(database, &query)?;
    Document::from_hex_row(uuid, trim_output(&output))
        .ok_or_else(|| Error::malformed(&query, &output))
}

/// Exact text of a single-value `hex(...)` query; no row reads as empty
fn lookup_text(engine: &dyn Engine, database: &Path, query: &str) -> Result<String> {
    let output = engine.execute(database, query)?;
    let value = trim_output(&output);
    decode_hex_text(value).ok_or_else(|| Error::malformed(query, &output))
}

/// The single statement that restores one document's payload.
///
/// Text comes back hex-encoded so the exact value reaches us whatever the
/// engine's output mode does to it, and is written out with
/// [`text_literal`].
fn payload_statement(engine: &dyn Engine, database: &Path, uuid: &str) -> Result<String> {
    let query = format!(
        r#"SELECT typeof("dataStr"), CASE WHEN typeof("dataStr") IN ('text', 'blob') THEN hex("dataStr") ELSE quote("dataStr") END FROM "documents" WHERE "uuid" = {}"#,
        sql_literal(uuid)
    );
    let output = engine.execute(database, &query)?;
    let (kind, value) = trim_output(&output)
        .split_once('|')
        .ok_or_else(|| Error::malformed(&query, &output))?;

    let payload = match kind {
        "null" => "NULL".to_string(),
        "integer" | "real" => value.to_string(),
        "blob" => format!("X'{}'", value),
        "text" => {
            let bytes = hex::decode(value).map_err(|_| Error::malformed(&query, &output))?;
            match String::from_utf8(bytes) {
                Ok(text) => text_literal(&text),
                Err(_) => format!("CAST(X'{}' AS TEXT)", value),
            }
        }
        _ => return Err(Error::malformed(&query, &output)),
    };
    Ok(format!(
        r#"UPDATE "documents" SET "dataStr" = {} WHERE "uuid" = {};"#,
        payload,
        text_literal(uuid)
    ))
}
