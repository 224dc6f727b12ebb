//! Input loading and sample data.

use std::fs;
use std::path::Path;

use log::info;

use common_config::HyperlexConfig;
use common_error::HyperlexResult;
use hyperlex_core::{GraphExport, Hyperedge, Node, TemporalHypergraph};

/// Read a case file in the `{nodes, edges}` record shape.
pub fn load_case_file(path: &Path) -> HyperlexResult<GraphExport> {
    let json = fs::read_to_string(path)?;
    let records = GraphExport::from_json(&json)?;
    info!(
        "Loaded {} entities and {} relations from {}",
        records.nodes.len(),
        records.edges.len(),
        path.display()
    );
    Ok(records)
}

/// Read and validate a JSON configuration file.
pub fn load_config(path: &Path) -> HyperlexResult<HyperlexConfig> {
    let json = fs::read_to_string(path)?;
    HyperlexConfig::from_json_str(&json)
}

/// A contract dispute unfolding over six time steps.
///
/// Negotiation opens at t=1, the contract is signed at t=2, a breach is
/// reported at t=3, negotiation ends at t=4, the lawsuit is filed at t=5 and
/// the breach report is superseded by the ruling at t=6.
pub fn create_case_timeline() -> HyperlexResult<TemporalHypergraph> {
    let mut timeline = TemporalHypergraph::new();
    for (id, node_type) in [
        ("buyer", "party"),
        ("seller", "party"),
        ("broker", "agent"),
        ("contract", "evidence"),
        ("invoice", "evidence"),
        ("court", "institution"),
    ] {
        timeline.add_node(Node::new(id, node_type))?;
    }

    timeline.add_temporal_hyperedge(
        Hyperedge::new("negotiation", "communication", ["buyer", "seller", "broker"]),
        1.0,
    )?;
    timeline.add_temporal_hyperedge(
        Hyperedge::new("signing", "transaction", ["buyer", "seller", "contract"]),
        2.0,
    )?;
    timeline.add_temporal_hyperedge(
        Hyperedge::new("breach", "dispute", ["seller", "invoice"]).with_weight(0.7),
        3.0,
    )?;
    timeline.remove_temporal_hyperedge("negotiation", 4.0)?;
    timeline.add_temporal_hyperedge(
        Hyperedge::new("lawsuit", "proceeding", ["buyer", "seller", "court"]),
        5.0,
    )?;
    timeline.remove_temporal_hyperedge("breach", 6.0)?;
    timeline.add_temporal_hyperedge(
        Hyperedge::new("ruling", "proceeding", ["court", "contract", "invoice"]),
        6.0,
    )?;
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_timeline() {
        let timeline = create_case_timeline().unwrap();

        assert_eq!(timeline.snapshot_at_time(0.5).hyperedge_count(), 0);
        assert_eq!(timeline.snapshot_at_time(3.5).hyperedge_count(), 3);
        assert_eq!(
            timeline.current().hyperedge_ids(),
            ["signing", "lawsuit", "ruling"]
        );
        assert_eq!(timeline.get_temporal_evolution().total_events, 7);
    }

    #[test]
    fn test_missing_files_are_io_errors() {
        let missing = Path::new("/nonexistent/hyperlex/case.json");
        assert!(matches!(
            load_case_file(missing),
            Err(common_error::HyperlexError::IoError(_))
        ));
        assert!(load_config(missing).is_err());
    }
}
