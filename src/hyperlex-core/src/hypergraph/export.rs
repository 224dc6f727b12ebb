//! Record-level interchange format.
//!
//! Upstream producers hand entities and relations over as plain records and
//! the display layer consumes the same shape, so a graph round-trips through
//! [`GraphExport`] without loss of ids, types, attributes, members or weights.
//! Embeddings are derived state and are not part of the records.

use serde::{Deserialize, Serialize};

use common_error::HyperlexResult;

use super::{AttributeMap, EdgeId, Hyperedge, Hypergraph, Label, Node, NodeId};

/// An entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: Label,
    #[serde(default)]
    pub attributes: AttributeMap,
}

/// A relation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: EdgeId,
    #[serde(rename = "type")]
    pub edge_type: Label,
    pub member_ids: Vec<NodeId>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "AttributeMap::is_empty")]
    pub attributes: AttributeMap,
}

fn default_weight() -> f64 {
    super::hyperedge::DEFAULT_WEIGHT
}

/// Serializable `{nodes, edges}` view of a hypergraph in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            node_type: node.node_type.clone(),
            attributes: node.attributes.clone(),
        }
    }
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Node::new(record.id, record.node_type).with_attributes(record.attributes)
    }
}

impl From<&Hyperedge> for EdgeRecord {
    fn from(edge: &Hyperedge) -> Self {
        Self {
            id: edge.id.clone(),
            edge_type: edge.edge_type.clone(),
            member_ids: edge.members().to_vec(),
            weight: edge.weight,
            attributes: edge.attributes.clone(),
        }
    }
}

impl From<EdgeRecord> for Hyperedge {
    fn from(record: EdgeRecord) -> Self {
        let mut edge =
            Hyperedge::new(record.id, record.edge_type, record.member_ids).with_weight(record.weight);
        edge.attributes = record.attributes;
        edge
    }
}

impl GraphExport {
    /// Build a hypergraph from the records.
    ///
    /// Nodes are inserted first, then edges, each through the validating
    /// insert path, so malformed records surface the usual errors.
    pub fn into_hypergraph(self) -> HyperlexResult<Hypergraph> {
        let mut graph = Hypergraph::new();
        for record in self.nodes {
            graph.add_node(record.into())?;
        }
        for record in self.edges {
            graph.add_hyperedge(record.into())?;
        }
        Ok(graph)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> HyperlexResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> HyperlexResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Hypergraph {
    /// Export nodes and hyperedges as records.
    pub fn export(&self) -> GraphExport {
        GraphExport {
            nodes: self.nodes().map(NodeRecord::from).collect(),
            edges: self.hyperedges().map(EdgeRecord::from).collect(),
        }
    }

    /// Build a hypergraph from exported records.
    pub fn import(records: GraphExport) -> HyperlexResult<Self> {
        records.into_hypergraph()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use common_error::HyperlexError;

    fn sample() -> Hypergraph {
        let mut hg = Hypergraph::new();
        hg.add_node(Node::new("p1", "person").with_attribute("name", "Ada"))
            .unwrap();
        hg.add_node(Node::new("p2", "person").with_embedding(vec![0.5, 0.5]))
            .unwrap();
        hg.add_node(Node::new("ev", "evidence").with_attribute("score", 0.8))
            .unwrap();
        hg.add_hyperedge(
            Hyperedge::new("r1", "testimony", ["p1", "p2", "ev"])
                .with_weight(0.4)
                .with_attribute("verified", true),
        )
        .unwrap();
        hg
    }

    #[test]
    fn test_export_preserves_order_and_fields() {
        let export = sample().export();

        let ids: Vec<&str> = export.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "ev"]);
        assert_eq!(export.edges[0].member_ids, ["p1", "p2", "ev"]);
        assert_eq!(export.edges[0].weight, 0.4);
    }

    #[test]
    fn test_json_shape_uses_type_key() {
        let json = sample().export().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["nodes"][0]["type"], "person");
        assert_eq!(value["edges"][0]["type"], "testimony");
        assert!(value["nodes"][1].get("embedding").is_none());
    }

    #[test]
    fn test_round_trip_reconstructs_graph() {
        let original = sample();
        let json = original.export().to_json().unwrap();
        let restored = Hypergraph::import(GraphExport::from_json(&json).unwrap()).unwrap();

        assert_eq!(restored.node_ids(), original.node_ids());
        assert_eq!(restored.hyperedge_ids(), original.hyperedge_ids());
        let edge = restored.get_hyperedge("r1").unwrap();
        assert_eq!(edge.members(), ["p1", "p2", "ev"]);
        assert_eq!(edge.weight, 0.4);
        assert_eq!(restored.neighbors("p1").len(), 2);
    }

    #[test]
    fn test_weight_defaults_when_absent() {
        let json = r#"{
            "nodes": [{"id": "a", "type": "t"}, {"id": "b", "type": "t"}],
            "edges": [{"id": "e", "type": "rel", "member_ids": ["a", "b"]}]
        }"#;
        let graph = GraphExport::from_json(json).unwrap().into_hypergraph().unwrap();
        assert_eq!(graph.get_hyperedge("e").unwrap().weight, 1.0);
    }

    #[test]
    fn test_import_rejects_dangling_members() {
        let json = r#"{
            "nodes": [{"id": "a", "type": "t"}],
            "edges": [{"id": "e", "type": "rel", "member_ids": ["a", "ghost"]}]
        }"#;
        let err = GraphExport::from_json(json)
            .unwrap()
            .into_hypergraph()
            .unwrap_err();
        assert!(matches!(err, HyperlexError::NotFound(_)));
    }
}
