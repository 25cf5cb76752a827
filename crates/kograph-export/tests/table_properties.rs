//! Property tests for table assembly

use kograph_core::{Entity, EntityType, ExtractionResult, Relation};
use kograph_export::build_tables;
use proptest::prelude::*;

fn entity_type() -> impl Strategy<Value = EntityType> {
    prop::sample::select(EntityType::ALL.to_vec())
}

fn result() -> impl Strategy<Value = ExtractionResult> {
    let entities = prop::collection::vec((0..6u8, "[가-힣]{1,4}", entity_type()), 0..6);
    let relations = prop::collection::vec((0..8u8, 0..8u8, "[a-z]{1,8}"), 0..10);

    (entities, relations).prop_map(|(entities, relations)| {
        ExtractionResult::new(
            entities
                .into_iter()
                .map(|(id, name, ty)| Entity::new(format!("E{}", id), name, ty, ""))
                .collect(),
            relations
                .into_iter()
                .map(|(s, t, label)| Relation::new(format!("E{}", s), format!("E{}", t), label, ""))
                .collect(),
        )
    })
}

proptest! {
    #[test]
    fn row_counts_follow_the_result(result in result()) {
        let tables = build_tables(&result);

        prop_assert_eq!(tables.entities.len(), result.entities.len());
        prop_assert_eq!(tables.relations.len(), result.relations.len());
        prop_assert_eq!(tables.relations_with_info.len(), tables.relations.len());
    }

    #[test]
    fn info_rows_resolve_known_endpoints(result in result()) {
        let tables = build_tables(&result);
        let info = &tables.relations_with_info;

        for (row, relation) in result.relations.iter().enumerate() {
            let expected = result
                .entities
                .iter()
                .find(|e| e.id == relation.source)
                .map(|e| e.name.as_str())
                .unwrap_or("");
            prop_assert_eq!(info.get(row, "source_name"), Some(expected));
            prop_assert_eq!(info.get(row, "relation"), Some(relation.relation.as_str()));
        }
    }
}
