//! JSON Lines and JSON document serialization
//!
//! The line-delimited form is the canonical durable representation: one
//! `{"type": "entity", "data": ...}` line per entity followed by one
//! `{"type": "relation", "data": ...}` line per relation, in discovery
//! order. Korean text is written literally, not escaped.

use serde::{Deserialize, Serialize};

use kograph_core::{Entity, ExtractionResult, KographError, Relation, Result};

/// One line of the JSONL export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum JsonlRecord {
    Entity(Entity),
    Relation(Relation),
}

/// Serialize a result to JSON Lines (newline-joined, no trailing newline)
pub fn to_jsonl(result: &ExtractionResult) -> Result<String> {
    let entities = result.entities.iter().cloned().map(JsonlRecord::Entity);
    let relations = result.relations.iter().cloned().map(JsonlRecord::Relation);

    let lines = entities
        .chain(relations)
        .map(|record| serde_json::to_string(&record))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(lines.join("\n"))
}

/// Parse JSON Lines back into a result; blank lines are skipped
pub fn from_jsonl(text: &str) -> Result<ExtractionResult> {
    let mut result = ExtractionResult::empty();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let record: JsonlRecord = serde_json::from_str(line)
            .map_err(|e| KographError::Parse(format!("line {}: {}", index + 1, e)))?;

        match record {
            JsonlRecord::Entity(entity) => result.entities.push(entity),
            JsonlRecord::Relation(relation) => result.relations.push(relation),
        }
    }

    Ok(result)
}

/// Pretty-printed JSON document mirroring the result
pub fn to_json_document(result: &ExtractionResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}
