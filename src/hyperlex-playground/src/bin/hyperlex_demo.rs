//! Hyperlex Demo - End-to-end examples
//!
//! Three subcommands exercise the engine:
//! 1. `analyze`: build a case hypergraph, refine it with HyperGNN and report
//!    communities, link predictions and node importance
//! 2. `temporal`: replay a dispute timeline and show point-in-time snapshots
//! 3. `hierarchy`: coarsen a case graph into progressively smaller levels
//!
//! # Usage
//!
//! ```bash
//! cargo run --package hyperlex-playground --bin hyperlex-demo -- --help
//! RUST_LOG=debug cargo run --package hyperlex-playground --bin hyperlex-demo -- analyze --json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use common_config::{AggregationMode, HyperlexConfig};
use common_error::HyperlexResult;
use hyperlex_core::{HierarchicalHypergraph, Hypergraph};
use hyperlex_gnn::{generate_sample_case_data, run_analysis, HyperGNN};

use hyperlex_playground::{
    create_case_timeline, load_case_file, load_config, print_divider, print_header,
    print_hierarchy, print_report, print_statistics,
};

/// Hyperlex demo CLI.
#[derive(Parser, Debug)]
#[command(name = "hyperlex-demo")]
#[command(about = "Explore hypergraph analysis of legal case data")]
#[command(version)]
struct Args {
    /// Verbose output
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run HyperGNN analysis on a case
    Analyze {
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON case file with `nodes` and `edges` records
        #[arg(long)]
        case: Option<PathBuf>,

        /// Seed for the generated sample case
        #[arg(long, default_value_t = 42)]
        sample_seed: u64,

        /// Aggregation mode override (attention, mean, max, sum)
        #[arg(short, long)]
        aggregation: Option<AggregationMode>,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Replay a dispute timeline and show snapshots
    Temporal {
        /// Timestamps to snapshot
        #[arg(long, num_args = 1.., default_values_t = [0.5, 2.5, 4.5, 6.5])]
        at: Vec<f64>,
    },

    /// Build a coarsening hierarchy over a case graph
    Hierarchy {
        /// Number of levels including the base graph
        #[arg(short, long, default_value_t = 3)]
        levels: usize,

        /// JSON case file; defaults to the generated sample case
        #[arg(long)]
        case: Option<PathBuf>,

        /// Seed for the generated sample case
        #[arg(long, default_value_t = 42)]
        sample_seed: u64,
    },
}

fn main() -> HyperlexResult<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Analyze {
            config,
            case,
            sample_seed,
            aggregation,
            json,
        } => run_analyze(config, case, sample_seed, aggregation, json, args.verbose),
        Commands::Temporal { at } => run_temporal(&at, args.verbose),
        Commands::Hierarchy {
            levels,
            case,
            sample_seed,
        } => run_hierarchy(levels, case, sample_seed, args.verbose),
    }
}

fn run_analyze(
    config_path: Option<PathBuf>,
    case_path: Option<PathBuf>,
    sample_seed: u64,
    aggregation: Option<AggregationMode>,
    json: bool,
    verbose: bool,
) -> HyperlexResult<()> {
    let mut config = match config_path {
        Some(path) => load_config(&path)?,
        None => HyperlexConfig::default(),
    };
    if let Some(mode) = aggregation {
        config.analysis.aggregation = mode;
    }
    let records = match case_path {
        Some(path) => load_case_file(&path)?,
        None => generate_sample_case_data(sample_seed),
    };

    if verbose {
        print_header("Configuration");
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    let report = run_analysis(records, &config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_header("HyperGNN Analysis");
        print_report(&report);
    }
    Ok(())
}

fn run_temporal(times: &[f64], verbose: bool) -> HyperlexResult<()> {
    let timeline = create_case_timeline()?;

    print_header("Timeline");
    for entry in timeline.get_temporal_evolution().evolution {
        let kind = format!("{:?}", entry.kind);
        println!(
            "  t={:<5} {:<8} {:<12} active: {}",
            entry.timestamp, kind, entry.edge_id, entry.num_edges
        );
    }

    for &t in times {
        print_header(&format!("Snapshot at t={t}"));
        let snapshot = timeline.snapshot_at_time(t);
        if snapshot.hyperedge_count() == 0 {
            println!("  (no active relations)");
        }
        for edge in snapshot.hyperedges() {
            println!("  {:<12} {:<14} {}", edge.id, edge.edge_type, edge.members().join(", "));
        }
        if verbose {
            print_divider();
            print_statistics(&snapshot.statistics());
        }
    }
    Ok(())
}

fn run_hierarchy(
    levels: usize,
    case_path: Option<PathBuf>,
    sample_seed: u64,
    verbose: bool,
) -> HyperlexResult<()> {
    let config = HyperlexConfig::default();
    let records = match case_path {
        Some(path) => load_case_file(&path)?,
        None => generate_sample_case_data(sample_seed),
    };
    let mut graph: Hypergraph = records.into_hypergraph()?;
    let mut model = HyperGNN::new(config.gnn.clone(), config.analysis.seed)?;
    model.initialize_embeddings(&mut graph)?;
    let refined = model.refine(&graph)?;

    let mut hierarchy = HierarchicalHypergraph::new(config.coarsening);
    hierarchy.build_hierarchy(&refined, levels)?;

    print_header("Hierarchy");
    print_hierarchy(&hierarchy.get_statistics());

    if verbose {
        for (level, graph) in hierarchy.levels().iter().enumerate().skip(1) {
            print_header(&format!("Level {level} clusters"));
            for cluster in graph.node_ids() {
                let members = hierarchy.cluster_members(level, cluster);
                println!("  {:<14} {}", cluster, members.join(", "));
            }
        }
    }
    Ok(())
}
