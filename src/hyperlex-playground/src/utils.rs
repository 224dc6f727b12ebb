//! Formatting and display utilities for the playground.

use hyperlex_core::hierarchy::HierarchyStatistics;
use hyperlex_core::GraphStatistics;
use hyperlex_gnn::AnalysisReport;

/// Rows shown for long listings.
const MAX_ROWS: usize = 10;

/// Print a divider line.
pub fn print_divider() {
    println!("{}", "-".repeat(60));
}

/// Print a section header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", "=".repeat(60));
    println!("  {}", title);
    println!("{}", "=".repeat(60));
}

/// Print graph statistics.
pub fn print_statistics(stats: &GraphStatistics) {
    println!("  nodes:            {}", stats.num_nodes);
    println!("  hyperedges:       {}", stats.num_hyperedges);
    println!("  avg node degree:  {:.2}", stats.avg_node_degree);
    println!("  max node degree:  {}", stats.max_node_degree);
    println!("  avg edge size:    {:.2}", stats.avg_edge_size);
    println!("  max edge size:    {}", stats.max_edge_size);
    for (label, distribution) in [
        ("node types", &stats.node_type_distribution),
        ("edge types", &stats.edge_type_distribution),
    ] {
        let counts: Vec<String> = distribution.iter().map(|(t, n)| format!("{t}={n}")).collect();
        println!("  {:<17} {}", format!("{label}:"), truncate(&counts.join(", "), 40));
    }
}

/// Print per-level hierarchy statistics as a table.
pub fn print_hierarchy(stats: &HierarchyStatistics) {
    println!("| {:>5} | {:>8} | {:>10} | {:>10} |", "level", "nodes", "hyperedges", "avg degree");
    print_divider();
    for level in &stats.level_stats {
        println!(
            "| {:>5} | {:>8} | {:>10} | {:>10.2} |",
            level.level, level.num_nodes, level.num_hyperedges, level.avg_node_degree
        );
    }
}

/// Print an analysis report.
pub fn print_report(report: &AnalysisReport) {
    print_header("Graph");
    print_statistics(&report.graph_statistics);

    print_header("Communities");
    println!("  {} communities", report.num_communities);
    for community in 0..report.num_communities {
        let members: Vec<&str> = report
            .communities
            .iter()
            .filter(|(_, &c)| c == community)
            .map(|(id, _)| id.as_str())
            .collect();
        println!("  [{community}] {}", truncate(&members.join(", "), 52));
    }

    print_header("Link Predictions");
    if report.link_predictions.is_empty() {
        println!("  (none above threshold)");
    }
    for link in &report.link_predictions {
        println!("  {:<14} <-> {:<14} {:.4}", link.source, link.target, link.score);
    }

    print_header("Conflicts");
    if report.detected_conflicts.is_empty() {
        println!("  (none above threshold)");
    }
    for conflict in report.detected_conflicts.iter().take(MAX_ROWS) {
        println!("  {:<14} vs  {:<14} {:.4}", conflict.first, conflict.second, conflict.score);
    }

    print_header("Most Important Nodes");
    let mut ranked: Vec<(&String, &f64)> = report.node_importance.iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (id, score) in ranked.into_iter().take(MAX_ROWS) {
        println!("  {:<14} {:.4}", id, score);
    }

    print_header("Sample Embeddings");
    for (id, values) in &report.sample_embeddings {
        let rendered: Vec<String> = values.iter().map(|v| format!("{v:+.3}")).collect();
        println!("  {:<14} [{}]", id, rendered.join(", "));
    }
}

/// Truncate a string to `max_len` characters, marking the cut with `...`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
