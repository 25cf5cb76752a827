//! Tabular views of an extraction result
//!
//! Three fixed-schema tables are assembled from an [`ExtractionResult`]:
//! entities, relations, and relations joined with their endpoint entities.
//! Every cell is a string; absent values are empty strings, never missing.

use std::collections::HashMap;

use serde::Serialize;

use kograph_core::{Entity, ExtractionResult, KographError, Result};

pub const ENTITY_COLUMNS: [&str; 4] = ["id", "name", "type", "description"];

pub const RELATION_COLUMNS: [&str; 4] = ["source", "target", "relation", "sentence"];

pub const RELATION_INFO_COLUMNS: [&str; 8] = [
    "source_id",
    "source_name",
    "source_type",
    "target_id",
    "target_name",
    "target_type",
    "relation",
    "sentence",
];

/// UTF-8 byte order mark, so spreadsheet tools detect the encoding
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A rectangular table of string cells with a fixed column schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with empty cells, long rows truncated
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value by row index and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// All values of one column
    pub fn column(&self, column: &str) -> Option<Vec<&str>> {
        let col = self.columns.iter().position(|c| c == column)?;
        Some(self.rows.iter().map(|r| r[col].as_str()).collect())
    }

    /// Encode as CSV with a header row
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(vec![]);

        writer
            .write_record(&self.columns)
            .map_err(|e| KographError::Csv(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|e| KographError::Csv(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| KographError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| KographError::Csv(e.to_string()))
    }

    /// CSV bytes prefixed with a UTF-8 BOM
    pub fn to_csv_bytes_with_bom(&self) -> Result<Vec<u8>> {
        let csv = self.to_csv()?;
        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + csv.len());
        bytes.extend_from_slice(UTF8_BOM);
        bytes.extend_from_slice(csv.as_bytes());
        Ok(bytes)
    }
}

/// The three derived tables of one extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionTables {
    pub entities: Table,
    pub relations: Table,
    pub relations_with_info: Table,
}

/// Build the entities, relations, and relations-with-info tables
///
/// The info table is a left join of relations against entities, once for
/// the source and once for the target: it always has exactly one row per
/// relation, with empty name/type cells where an endpoint does not resolve.
///
/// The row count holds even when `entities` is empty: every relation still
/// gets a row, with all name/type cells blank, rather than the table being
/// emptied. The pipeline never reaches that case, since a run with no
/// entities fails before tables are built.
pub fn build_tables(result: &ExtractionResult) -> ExtractionTables {
    let mut entities = Table::new(&ENTITY_COLUMNS);
    for entity in &result.entities {
        entities.push_row(vec![
            entity.id.clone(),
            entity.name.clone(),
            entity.entity_type.to_string(),
            entity.description.clone(),
        ]);
    }

    let mut relations = Table::new(&RELATION_COLUMNS);
    for relation in &result.relations {
        relations.push_row(vec![
            relation.source.clone(),
            relation.target.clone(),
            relation.relation.clone(),
            relation.sentence.clone(),
        ]);
    }

    // first entity wins if an id repeats
    let mut by_id: HashMap<&str, &Entity> = HashMap::new();
    for entity in &result.entities {
        by_id.entry(entity.id.as_str()).or_insert(entity);
    }

    let endpoint = |id: &str| -> (String, String) {
        by_id
            .get(id)
            .map(|e| (e.name.clone(), e.entity_type.to_string()))
            .unwrap_or_default()
    };

    let mut relations_with_info = Table::new(&RELATION_INFO_COLUMNS);
    for relation in &result.relations {
        let (source_name, source_type) = endpoint(&relation.source);
        let (target_name, target_type) = endpoint(&relation.target);

        relations_with_info.push_row(vec![
            relation.source.clone(),
            source_name,
            source_type,
            relation.target.clone(),
            target_name,
            target_type,
            relation.relation.clone(),
            relation.sentence.clone(),
        ]);
    }

    ExtractionTables {
        entities,
        relations,
        relations_with_info,
    }
}

// ============================================================================
// Tests
// ============================================================================
