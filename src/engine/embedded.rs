//! In-process engine backed by the bundled SQLite library
//!
//! Serves the same contract as the `sqlite3` shell: list-mode query output,
//! `.dump`-compatible text and `.read` replay.

use std::fmt::Write as _;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use tracing::debug;

use super::{sql_literal, text_literal, Engine};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedEngine;

impl EmbeddedEngine {
    pub fn new() -> Self {
        Self
    }

    fn open(database: &Path) -> Result<Connection> {
        Ok(Connection::open(database)?)
    }
}

impl Engine for EmbeddedEngine {
    fn execute(&self, database: &Path, sql: &str) -> Result<String> {
        let conn = Self::open(database)?;
        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();
        if column_count == 0 {
            stmt.execute([])?;
            return Ok(String::new());
        }

        let mut output = String::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for i in 0..column_count {
                if i > 0 {
                    output.push('|');
                }
                push_value(&mut output, row.get_ref(i)?);
            }
            output.push('\n');
        }
        Ok(output)
    }

    fn dump(&self, database: &Path) -> Result<String> {
        let conn = Self::open(database)?;
        dump_database(&conn)
    }

    fn read(&self, database: &Path, script: &Path) -> Result<()> {
        let sql = std::fs::read_to_string(script).map_err(|err| Error::io(script, err))?;
        debug!("Replay {} ({} bytes)", script.display(), sql.len());
        let conn = Self::open(database)?;
        conn.execute_batch(&sql)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("bundled SQLite {}", rusqlite::version())
    }
}

/// Print a value the way the `sqlite3` list mode does
fn push_value(output: &mut String, value: ValueRef<'_>) {
    match value {
        ValueRef::Null => {}
        ValueRef::Integer(i) => {
            let _ = write!(output, "{}", i);
        }
        ValueRef::Real(f) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                let _ = write!(output, "{:.1}", f);
            } else {
                let _ = write!(output, "{}", f);
            }
        }
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            output.push_str(&String::from_utf8_lossy(bytes));
        }
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Text dump equivalent to the shell's `.dump`: tables with their rows
/// first, then indexes, triggers and views, all in one transaction.
fn dump_database(conn: &Connection) -> Result<String> {
    let mut out = String::from("PRAGMA foreign_keys=OFF;\nBEGIN TRANSACTION;\n");
    let mut writable_schema = false;

    let tables: Vec<(String, String)> = {
        let mut stmt = conn.prepare(
            "SELECT name, sql FROM sqlite_master \
             WHERE type = 'table' AND sql NOT NULL \
             ORDER BY name = 'sqlite_sequence', rowid",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<rusqlite::Result<_>>()?
    };

    for (name, sql) in &tables {
        if name == "sqlite_sequence" {
            out.push_str("DELETE FROM sqlite_sequence;\n");
        } else if name == "sqlite_stat1" {
            out.push_str("ANALYZE sqlite_master;\n");
        } else if name.starts_with("sqlite_") {
            continue;
        } else if sql.starts_with("CREATE VIRTUAL TABLE") {
            if !writable_schema {
                out.push_str("PRAGMA writable_schema=ON;\n");
                writable_schema = true;
            }
            let _ = writeln!(
                out,
                "INSERT INTO sqlite_master(type,name,tbl_name,rootpage,sql) \
                 VALUES('table',{},{},0,{});",
                sql_literal(name),
                sql_literal(name),
                sql_literal(sql)
            );
            continue;
        } else {
            let _ = writeln!(out, "{};", sql);
        }
        dump_rows(conn, name, &mut out)?;
    }

    let mut stmt = conn.prepare(
        "SELECT sql FROM sqlite_master \
         WHERE sql NOT NULL AND type IN ('index', 'trigger', 'view') \
         ORDER BY rowid",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    for sql in rows {
        let _ = writeln!(out, "{};", sql?);
    }

    if writable_schema {
        out.push_str("PRAGMA writable_schema=OFF;\n");
    }
    out.push_str("COMMIT;\n");
    Ok(out)
}

fn dump_rows(conn: &Connection, table: &str, out: &mut String) -> Result<()> {
    let columns: Vec<String> = {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_identifier(table)))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
        rows.collect::<rusqlite::Result<_>>()?
    };
    if columns.is_empty() {
        return Ok(());
    }

    let selected = columns
        .iter()
        .map(|c| {
            let c = quote_identifier(c);
            format!("typeof({c}), CASE WHEN typeof({c}) = 'text' THEN {c} ELSE quote({c}) END")
        })
        .collect::<Vec<_>>()
        .join(", ");
    let table_ident = if table == "sqlite_sequence" || table == "sqlite_stat1" {
        table.to_string()
    } else {
        quote_identifier(table)
    };

    let mut stmt = conn.prepare(&format!("SELECT {} FROM {}", selected, table_ident))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            let kind: String = row.get(2 * i)?;
            values.push(match row.get_ref(2 * i + 1)? {
                ValueRef::Text(bytes) if kind == "text" => match std::str::from_utf8(bytes) {
                    Ok(text) => text_literal(text),
                    Err(_) => format!("CAST(X'{}' AS TEXT)", hex::encode_upper(bytes)),
                },
                // quote() already rendered everything else
                ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                _ => "NULL".to_string(),
            });
        }
        let _ = writeln!(out, "INSERT INTO {} VALUES({});", table_ident, values.join(","));
    }
    Ok(())
}
