//! Synthetic case data for demos and tests.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hyperlex_core::{AttributeMap, EdgeRecord, GraphExport, NodeRecord, Value};

const NUM_PERSONS: usize = 20;
const NUM_EVIDENCE: usize = 15;
const NUM_RELATIONSHIPS: usize = 30;
const RELATIONSHIP_TYPES: [&str; 3] = ["transaction", "communication", "association"];

fn record(id: String, node_type: &str, key: &str, value: String) -> NodeRecord {
    let mut attributes = AttributeMap::new();
    attributes.insert(key.to_string(), Value::String(value));
    NodeRecord {
        id,
        node_type: node_type.to_string(),
        attributes,
    }
}

/// A seeded case: 20 people, 15 evidence items and 30 relationships, each
/// joining 2 to 5 distinct people with a weight in `[0.5, 1.0]`.
///
/// Evidence items are not linked by any relationship.
pub fn generate_sample_case_data(seed: u64) -> GraphExport {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let persons: Vec<NodeRecord> = (0..NUM_PERSONS)
        .map(|i| record(format!("entity_{i}"), "person", "name", format!("Person {i}")))
        .collect();
    let evidence = (0..NUM_EVIDENCE).map(|i| {
        record(
            format!("evidence_{i}"),
            "evidence",
            "description",
            format!("Evidence item {i}"),
        )
    });

    let edges = (0..NUM_RELATIONSHIPS)
        .map(|i| {
            let size = rng.gen_range(2..=5);
            let member_ids = persons
                .choose_multiple(&mut rng, size)
                .map(|p| p.id.clone())
                .collect();
            let edge_type = RELATIONSHIP_TYPES
                .choose(&mut rng)
                .copied()
                .unwrap_or(RELATIONSHIP_TYPES[0]);
            EdgeRecord {
                id: format!("edge_{i}"),
                edge_type: edge_type.to_string(),
                member_ids,
                weight: rng.gen_range(0.5..=1.0),
                attributes: AttributeMap::new(),
            }
        })
        .collect();

    let mut nodes = persons;
    nodes.extend(evidence);
    GraphExport { nodes, edges }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_sample_shape() {
        let data = generate_sample_case_data(42);
        assert_eq!(data.nodes.len(), 35);
        assert_eq!(data.edges.len(), 30);
        assert_eq!(
            data.nodes.iter().filter(|n| n.node_type == "evidence").count(),
            15
        );

        for edge in &data.edges {
            let members: HashSet<&String> = edge.member_ids.iter().collect();
            assert_eq!(members.len(), edge.member_ids.len());
            assert!((2..=5).contains(&members.len()));
            assert!(members.iter().all(|m| m.starts_with("entity_")));
            assert!((0.5..=1.0).contains(&edge.weight));
            assert!(RELATIONSHIP_TYPES.contains(&edge.edge_type.as_str()));
        }
    }

    #[test]
    fn test_sample_is_seeded() {
        assert_eq!(generate_sample_case_data(7), generate_sample_case_data(7));
        assert_ne!(generate_sample_case_data(7), generate_sample_case_data(8));
    }

    #[test]
    fn test_sample_builds_a_valid_graph() {
        let graph = generate_sample_case_data(1).into_hypergraph().unwrap();
        assert_eq!(graph.node_count(), 35);
        assert_eq!(graph.hyperedge_count(), 30);
    }
}
