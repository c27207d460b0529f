//! Core type definitions for easyeda-git
//!
//! Defines the records that flow between the splitter and the merger:
//! - Documents: rows of the `documents` table, minus their payload
//! - Reports: what a save or open wrote to disk

use std::path::PathBuf;

use crate::engine::decode_hex_text;

/// A document row as listed by the splitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub uuid: String,
    pub display_title: String,
    /// Empty in the database means "not attached to a schematic"
    pub schematic_uuid: Option<String>,
    pub project_uuid: String,
}

impl Document {
    /// Build a document from its uuid and one row of
    /// `SELECT hex(display_title), hex(schematic_uuid), hex(project_uuid)`.
    ///
    /// Hex columns never contain `|` or line breaks, so a row that does not
    /// split into exactly three decodable fields is malformed.
    pub fn from_hex_row(uuid: &str, row: &str) -> Option<Self> {
        let mut fields = row.trim().split('|').map(decode_hex_text);
        let display_title = fields.next()??;
        let schematic_uuid = fields.next()??;
        let project_uuid = fields.next()??;
        if fields.next().is_some() {
            return None;
        }

        Some(Self {
            uuid: uuid.to_string(),
            display_title,
            schematic_uuid: (!schematic_uuid.is_empty()).then_some(schematic_uuid),
            project_uuid,
        })
    }

    /// `{project}_{title}`, or `{project}_{schematic}_{title}` when the
    /// document belongs to a schematic
    pub fn tree_name(&self, project_name: &str, schematic_name: Option<&str>) -> String {
        match schematic_name {
            Some(schematic) => format!("{}_{}_{}", project_name, schematic, self.display_title),
            None => format!("{}_{}", project_name, self.display_title),
        }
    }
}

/// A per-document SQL file written during a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub uuid: String,
    pub tree_name: String,
    pub path: PathBuf,
}

/// Outcome of one splitter pass
#[derive(Debug, Clone)]
pub struct SplitReport {
    pub base_sql: PathBuf,
    pub documents: Vec<DocumentFile>,
    /// The base dump did not exist before this pass
    pub base_created: bool,
}

/// Outcome of one merger pass
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub database: PathBuf,
    pub backup: Option<PathBuf>,
    pub documents: Vec<PathBuf>,
}
