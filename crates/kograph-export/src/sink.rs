//! File artifacts
//!
//! Writes the tables, the JSON Lines export, and the pretty JSON document
//! into one output directory. CSV files carry a UTF-8 BOM. A table with no
//! rows produces no file; any file left from an earlier run for that table
//! is removed so the directory always reflects the latest extraction.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use kograph_core::{ExtractionResult, Result};

use crate::jsonl::{to_json_document, to_jsonl};
use crate::table::{build_tables, ExtractionTables, Table};

pub const ENTITIES_FILE: &str = "entities.csv";
pub const RELATIONS_FILE: &str = "relations.csv";
pub const RELATIONS_WITH_INFO_FILE: &str = "relations_with_info.csv";
pub const JSONL_FILE: &str = "extracted_data.jsonl";
pub const DOCUMENT_FILE: &str = "knowledge_graph.json";

/// Kinds of artifact a sink produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Entities,
    Relations,
    RelationsWithInfo,
    Jsonl,
    Document,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        Self::Entities,
        Self::Relations,
        Self::RelationsWithInfo,
        Self::Jsonl,
        Self::Document,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Entities => ENTITIES_FILE,
            Self::Relations => RELATIONS_FILE,
            Self::RelationsWithInfo => RELATIONS_WITH_INFO_FILE,
            Self::Jsonl => JSONL_FILE,
            Self::Document => DOCUMENT_FILE,
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Writes extraction artifacts to a directory
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build every artifact from `result` and write it
    pub fn write_result(&self, result: &ExtractionResult) -> Result<BTreeMap<ArtifactKind, PathBuf>> {
        let tables = build_tables(result);
        let jsonl = to_jsonl(result)?;
        let document = to_json_document(result)?;
        self.write(&tables, &jsonl, &document)
    }

    /// Write pre-built artifacts; returns the path of every file written
    pub fn write(
        &self,
        tables: &ExtractionTables,
        jsonl: &str,
        document: &str,
    ) -> Result<BTreeMap<ArtifactKind, PathBuf>> {
        fs::create_dir_all(&self.dir)?;

        let mut written = BTreeMap::new();

        for (kind, table) in [
            (ArtifactKind::Entities, &tables.entities),
            (ArtifactKind::Relations, &tables.relations),
            (ArtifactKind::RelationsWithInfo, &tables.relations_with_info),
        ] {
            if let Some(path) = self.write_table(kind, table)? {
                written.insert(kind, path);
            }
        }

        let mut jsonl_bytes = jsonl.as_bytes().to_vec();
        if !jsonl_bytes.is_empty() {
            jsonl_bytes.push(b'\n');
        }
        written.insert(
            ArtifactKind::Jsonl,
            self.write_atomic(ArtifactKind::Jsonl, &jsonl_bytes)?,
        );
        written.insert(
            ArtifactKind::Document,
            self.write_atomic(ArtifactKind::Document, document.as_bytes())?,
        );

        tracing::info!(dir = %self.dir.display(), files = written.len(), "Artifacts written");
        Ok(written)
    }

    fn write_table(&self, kind: ArtifactKind, table: &Table) -> Result<Option<PathBuf>> {
        if table.is_empty() {
            let stale = self.path_for(kind);
            if stale.exists() {
                tracing::debug!(path = %stale.display(), "Removing stale table");
                fs::remove_file(&stale)?;
            }
            return Ok(None);
        }

        let bytes = table.to_csv_bytes_with_bom()?;
        self.write_atomic(kind, &bytes).map(Some)
    }

    /// Write through a sibling temp file and rename into place
    fn write_atomic(&self, kind: ArtifactKind, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(kind);
        let tmp = self.dir.join(format!(".{}.tmp", kind.file_name()));

        fs::write(&tmp, bytes)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote artifact");
        Ok(path)
    }

    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}
