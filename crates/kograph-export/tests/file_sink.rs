//! File sink tests against a temporary directory

use std::fs;

use kograph_core::{Entity, EntityType, ExtractionResult, Relation};
use kograph_export::sink::{ArtifactKind, FileSink};
use kograph_export::table::UTF8_BOM;
use kograph_export::from_jsonl;
use tempfile::TempDir;

fn sample() -> ExtractionResult {
    ExtractionResult::new(
        vec![
            Entity::new("E1", "김민수", EntityType::Person, "김민수 is an entity of type PERSON."),
            Entity::new("E2", "네이버", EntityType::Organization, ""),
        ],
        vec![Relation::new("E1", "E2", "affiliation", "김민수 교수는 네이버와 협력했다.")],
    )
}

#[test]
fn writes_all_artifacts() {
    let dir = TempDir::new().unwrap();
    let sink = FileSink::new(dir.path().join("out"));

    let written = sink.write_result(&sample()).unwrap();
    assert_eq!(written.len(), ArtifactKind::ALL.len());

    let entities = fs::read(&written[&ArtifactKind::Entities]).unwrap();
    assert!(entities.starts_with(UTF8_BOM));
    let text = String::from_utf8(entities[UTF8_BOM.len()..].to_vec()).unwrap();
    assert!(text.starts_with("id,name,type,description\n"));
    assert!(text.contains("E1,김민수,PERSON"));

    let info = fs::read_to_string(&written[&ArtifactKind::RelationsWithInfo]).unwrap();
    assert!(info.contains("source_id,source_name,source_type"));
    assert!(info.contains("E1,김민수,PERSON,E2,네이버,ORGANIZATION,affiliation"));

    let jsonl = fs::read_to_string(&written[&ArtifactKind::Jsonl]).unwrap();
    assert!(jsonl.ends_with('\n'));
    assert_eq!(from_jsonl(&jsonl).unwrap(), sample());

    let doc = fs::read_to_string(&written[&ArtifactKind::Document]).unwrap();
    let parsed: ExtractionResult = serde_json::from_str(&doc).unwrap();
    assert_eq!(parsed, sample());
}

#[test]
fn empty_tables_are_skipped_and_stale_files_removed() {
    let dir = TempDir::new().unwrap();
    let sink = FileSink::new(dir.path());

    sink.write_result(&sample()).unwrap();
    assert!(sink.path_for(ArtifactKind::Relations).exists());

    let entities_only = ExtractionResult::new(sample().entities, vec![]);
    let written = sink.write_result(&entities_only).unwrap();

    assert!(written.contains_key(&ArtifactKind::Entities));
    assert!(!written.contains_key(&ArtifactKind::Relations));
    assert!(!written.contains_key(&ArtifactKind::RelationsWithInfo));
    assert!(!sink.path_for(ArtifactKind::Relations).exists());
    assert!(!sink.path_for(ArtifactKind::RelationsWithInfo).exists());

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn unwritable_destination_is_an_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, b"not a directory").unwrap();

    let sink = FileSink::new(blocker.join("out"));
    assert!(sink.write_result(&sample()).is_err());
}
