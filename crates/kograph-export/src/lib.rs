//! kograph Export - Tables, serialization, and file artifacts
//!
//! Turns an [`ExtractionResult`] into the forms a caller consumes:
//! - Three fixed-schema tables (entities, relations, relations with info)
//! - JSON Lines and a pretty JSON document
//! - Graph summary statistics
//! - Files on disk

pub mod jsonl;
pub mod sink;
pub mod stats;
pub mod table;

pub use jsonl::{from_jsonl, to_json_document, to_jsonl, JsonlRecord};
pub use sink::{ArtifactKind, FileSink};
pub use stats::GraphSummary;
pub use table::{build_tables, ExtractionTables, Table};

use kograph_core::{ExtractionResult, Result};

/// Every derived view of one extraction
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub tables: ExtractionTables,
    pub jsonl: String,
    pub document: String,
    pub summary: GraphSummary,
}

/// Pretty JSON document of a result with no entities and no relations
pub const EMPTY_DOCUMENT: &str = "{\n  \"entities\": [],\n  \"relations\": []\n}";

impl Artifacts {
    /// Zero-row tables with their full schemas, empty JSONL, empty document
    pub fn empty() -> Self {
        Self {
            tables: build_tables(&ExtractionResult::empty()),
            jsonl: String::new(),
            document: EMPTY_DOCUMENT.to_string(),
            summary: GraphSummary::default(),
        }
    }

    pub fn from_result(result: &ExtractionResult) -> Result<Self> {
        Ok(Self {
            tables: build_tables(result),
            jsonl: to_jsonl(result)?,
            document: to_json_document(result)?,
            summary: GraphSummary::from_result(result),
        })
    }
}
