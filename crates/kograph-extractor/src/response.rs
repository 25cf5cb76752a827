//! Model response parsing
//!
//! The generation backend returns free text that should contain a JSON
//! object. Candidates are tried in order: every ```json fenced block, every
//! untagged fenced block, the outermost brace-delimited span, and the whole
//! response. Fences tagged with another language are never candidates. The
//! first candidate that parses into a JSON object wins. The object is then
//! validated into a typed [`ExtractionResult`].

use std::collections::HashSet;

use serde_json::{Map, Value};

use kograph_core::{Entity, EntityType, ExtractionResult, KographError, Relation, Result};

/// Parse a raw model response into a validated extraction result
pub fn parse_response(response: &str) -> Result<ExtractionResult> {
    let object = locate_object(response).ok_or_else(|| {
        KographError::Parse("response does not contain a JSON object".to_string())
    })?;

    Ok(validate(object))
}

/// Try each candidate span in order of preference
fn locate_object(response: &str) -> Option<Map<String, Value>> {
    let blocks = fenced_blocks(response);

    let json_fences = blocks
        .iter()
        .filter(|(tag, _)| tag.eq_ignore_ascii_case("json"))
        .map(|(_, body)| ("json fence", *body));
    let bare_fences = blocks
        .iter()
        .filter(|(tag, _)| tag.is_empty())
        .map(|(_, body)| ("bare fence", *body));

    let candidates = json_fences
        .chain(bare_fences)
        .chain(braced_span(response).map(|span| ("braced", span)))
        .chain(std::iter::once(("whole", response.trim())));

    for (strategy, candidate) in candidates {
        if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(candidate) {
            tracing::debug!("Parsed model response using {} strategy", strategy);
            return Some(object);
        }
    }

    None
}

/// Every closed ``` fenced block as (language tag, trimmed body)
fn fenced_blocks(text: &str) -> Vec<(&str, &str)> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("```") {
        let after = &rest[start + 3..];

        let (tag, body) = match after.split_once('\n') {
            Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
                (tag.trim(), body)
            }
            _ => ("", after),
        };

        let Some(end) = body.find("```") else {
            break;
        };
        blocks.push((tag, body[..end].trim()));
        rest = &body[end + 3..];
    }

    blocks
}

/// From the first '{' to the last '}'
fn braced_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

// ============================================================================
// Validation
// ============================================================================

/// Turn an untrusted JSON object into a typed result
///
/// Missing `entities` / `relations` keys become empty sequences. Entity ids
/// are kept unique: later duplicates are dropped and missing ids are filled
/// with unused `E<n>` values. Types outside the fixed set become OTHER.
pub fn validate(object: Map<String, Value>) -> ExtractionResult {
    let entities = validate_entities(array_field(&object, "entities"));
    let relations = validate_relations(array_field(&object, "relations"));

    ExtractionResult::new(entities, relations)
}

fn array_field<'a>(object: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    match object.get(key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            tracing::warn!("Ignoring non-array `{}` field: {}", key, other);
            &[]
        }
        None => &[],
    }
}

struct RawEntity {
    id: Option<String>,
    name: String,
    entity_type: EntityType,
    description: String,
}

fn validate_entities(items: &[Value]) -> Vec<Entity> {
    let raw: Vec<RawEntity> = items
        .iter()
        .filter_map(|item| {
            let Some(obj) = item.as_object() else {
                tracing::warn!("Skipping non-object entity: {}", item);
                return None;
            };

            let name = string_field(obj, "name");
            if name.is_empty() {
                tracing::warn!("Skipping entity without a name: {}", item);
                return None;
            }

            let id = string_field(obj, "id");
            Some(RawEntity {
                id: (!id.is_empty()).then_some(id),
                name,
                entity_type: EntityType::from_label(&string_field(obj, "type")),
                description: string_field(obj, "description"),
            })
        })
        .collect();

    let explicit: HashSet<String> = raw.iter().filter_map(|e| e.id.clone()).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut next_id = 1;
    let mut entities = Vec::with_capacity(raw.len());

    for entity in raw {
        let id = match entity.id {
            Some(id) => id,
            None => loop {
                let candidate = format!("E{next_id}");
                next_id += 1;
                if !explicit.contains(&candidate) && !seen.contains(&candidate) {
                    break candidate;
                }
            },
        };

        if !seen.insert(id.clone()) {
            tracing::warn!("Dropping entity `{}` with duplicate id {}", entity.name, id);
            continue;
        }

        entities.push(Entity {
            id,
            name: entity.name,
            entity_type: entity.entity_type,
            description: entity.description,
        });
    }

    entities
}

fn validate_relations(items: &[Value]) -> Vec<Relation> {
    items
        .iter()
        .filter_map(|item| match item.as_object() {
            Some(obj) => Some(Relation::new(
                string_field(obj, "source"),
                string_field(obj, "target"),
                string_field(obj, "relation"),
                string_field(obj, "sentence"),
            )),
            None => {
                tracing::warn!("Skipping non-object relation: {}", item);
                None
            }
        })
        .collect()
}

/// Read a field as a string; numbers are stringified, anything else is empty
fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
