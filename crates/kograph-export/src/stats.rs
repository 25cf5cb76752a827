//! Graph summary statistics
//!
//! Entities are nodes and resolvable relations are directed edges; parallel
//! edges between the same ordered pair collapse into one.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::connected_components;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use kograph_core::{EntityType, ExtractionResult};

/// Counts and shape metrics for one extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    /// E / (N·(N−1)) for a directed graph; 0 below two nodes
    pub density: f64,
    /// Weakly connected components
    pub components: usize,
    pub isolated_nodes: usize,
    /// Relations whose source or target is not a known entity
    pub dangling_relations: usize,
    pub entity_types: BTreeMap<EntityType, usize>,
    pub relation_labels: BTreeMap<String, usize>,
}

impl GraphSummary {
    pub fn from_result(result: &ExtractionResult) -> Self {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
        let mut entity_types = BTreeMap::new();

        for entity in &result.entities {
            *entity_types.entry(entity.entity_type).or_insert(0) += 1;
            nodes
                .entry(entity.id.as_str())
                .or_insert_with(|| graph.add_node(entity.id.as_str()));
        }

        let mut relation_labels = BTreeMap::new();
        let mut dangling_relations = 0;

        for relation in &result.relations {
            *relation_labels.entry(relation.relation.clone()).or_insert(0) += 1;

            match (
                nodes.get(relation.source.as_str()),
                nodes.get(relation.target.as_str()),
            ) {
                (Some(&source), Some(&target)) => {
                    graph.update_edge(source, target, ());
                }
                _ => dangling_relations += 1,
            }
        }

        let node_count = graph.node_count();
        let edge_count = graph.edge_count();
        let density = if node_count < 2 {
            0.0
        } else {
            edge_count as f64 / (node_count * (node_count - 1)) as f64
        };

        let isolated_nodes = graph
            .node_indices()
            .filter(|&n| graph.neighbors_undirected(n).next().is_none())
            .count();

        Self {
            node_count,
            edge_count,
            density,
            components: connected_components(&graph),
            isolated_nodes,
            dangling_relations,
            entity_types,
            relation_labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kograph_core::{Entity, Relation};

    #[test]
    fn test_empty_graph() {
        let summary = GraphSummary::from_result(&ExtractionResult::empty());
        assert_eq!(summary, GraphSummary::default());
    }

    #[test]
    fn test_summary_counts() {
        let result = ExtractionResult::new(
            vec![
                Entity::new("E1", "김민수", EntityType::Person, ""),
                Entity::new("E2", "서울대학교", EntityType::Organization, ""),
                Entity::new("E3", "네이버", EntityType::Organization, ""),
                Entity::new("E4", "강남", EntityType::Location, ""),
            ],
            vec![
                Relation::new("E1", "E2", "affiliation", ""),
                Relation::new("E1", "E2", "affiliation", ""),
                Relation::new("E2", "E3", "partnership", ""),
                Relation::new("E3", "E9", "related", ""),
            ],
        );
        let summary = GraphSummary::from_result(&result);

        assert_eq!(summary.node_count, 4);
        assert_eq!(summary.edge_count, 2);
        assert!((summary.density - 2.0 / 12.0).abs() < 1e-9);
        assert_eq!(summary.components, 2);
        assert_eq!(summary.isolated_nodes, 1);
        assert_eq!(summary.dangling_relations, 1);
        assert_eq!(summary.entity_types[&EntityType::Organization], 2);
        assert_eq!(summary.relation_labels["affiliation"], 2);
    }

    #[test]
    fn test_summary_serializes_type_keys() {
        let result = ExtractionResult::new(
            vec![Entity::new("E1", "김민수", EntityType::Person, "")],
            vec![],
        );
        let json = serde_json::to_value(GraphSummary::from_result(&result)).unwrap();
        assert_eq!(json["entity_types"]["PERSON"], 1);
        assert_eq!(json["density"], 0.0);
    }
}
