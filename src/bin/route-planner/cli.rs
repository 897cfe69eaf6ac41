//! Argument parsing and command implementations for the route-planner binary.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use route_planner::{
    measure, reachable_from, run_batch, summarize, unreachable, BatchConfig, GraphError,
    GraphStore, Heuristic, LatLon, LocateError, NodeId, NodeLocator, PathResult, Planner,
    RunRecord, SummaryStatistic,
};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::tables::{self, TableError};

const DEFAULT_MAX_NODES: usize = 1_000_000;
const DEFAULT_MAX_EDGES: usize = 5_000_000;
const DEFAULT_QUERIES: usize = 100;

#[derive(Debug, Parser)]
#[command(name = "route-planner", about = "Shortest routes and reachability over a road network.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shortest route between two node ids, with Dijkstra and A*.
    Route(RouteArgs),
    /// Node closest to a coordinate.
    Nearest(NearestArgs),
    /// Nodes reachable (and unreachable) from a start node.
    Reach(ReachArgs),
    /// Random queries, timed and summarized per algorithm.
    Batch(BatchArgs),
    /// Summarize a metrics table written by `batch --out`.
    Summarize(SummarizeArgs),
}

/// Node and edge tables plus input bounds.
#[derive(Debug, Args)]
pub struct GraphArgs {
    /// Node table: id,lat,lon,name
    pub nodes: PathBuf,
    /// Edge table: src_id,dst_id,distance
    pub edges: PathBuf,
    #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
    pub max_nodes: usize,
    #[arg(long, default_value_t = DEFAULT_MAX_EDGES)]
    pub max_edges: usize,
}

#[derive(Debug, Args)]
pub struct RouteArgs {
    #[command(flatten)]
    pub graph: GraphArgs,
    pub from: NodeId,
    pub to: NodeId,
    #[arg(long, value_enum, default_value_t = HeuristicArg::Haversine)]
    pub heuristic: HeuristicArg,
}

#[derive(Debug, Args)]
pub struct NearestArgs {
    #[command(flatten)]
    pub graph: GraphArgs,
    #[arg(allow_negative_numbers = true)]
    pub lat: f64,
    #[arg(allow_negative_numbers = true)]
    pub lon: f64,
}

#[derive(Debug, Args)]
pub struct ReachArgs {
    #[command(flatten)]
    pub graph: GraphArgs,
    /// Start node, defaults to the first node in the table
    #[arg(long)]
    pub from: Option<NodeId>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    #[command(flatten)]
    pub graph: GraphArgs,
    #[arg(long, default_value_t = DEFAULT_QUERIES)]
    pub queries: usize,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, value_enum, default_value_t = HeuristicArg::Haversine)]
    pub heuristic: HeuristicArg,
    /// Write every run record to this file
    #[arg(long)]
    pub out: Option<PathBuf>,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    pub metrics: PathBuf,
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HeuristicArg {
    Zero,
    Planar,
    Haversine,
}

impl From<HeuristicArg> for Heuristic {
    fn from(arg: HeuristicArg) -> Self {
        match arg {
            HeuristicArg::Zero => Heuristic::Zero,
            HeuristicArg::Planar => Heuristic::Planar,
            HeuristicArg::Haversine => Heuristic::Haversine,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),
}


pub fn run_cli(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    match cli.command {
        Command::Route(args) => route(&args, out),
        Command::Nearest(args) => nearest(&args, out),
        Command::Reach(args) => reach(&args, out),
        Command::Batch(args) => batch(&args, out),
        Command::Summarize(args) => {
            let records = tables::read_records(&args.metrics)?;
            write_summary(&summarize(&records), args.json, out)
        }
    }
}

/// Read both tables and build the graph, logging every integrity violation
#[instrument(skip_all, fields(nodes = %args.nodes.display(), edges = %args.edges.display()))]
fn load_graph(args: &GraphArgs) -> Result<GraphStore, CliError> {
    let nodes = tables::read_nodes(&args.nodes, args.max_nodes)?;
    let edges = tables::read_edges(&args.edges, args.max_edges)?;

    match GraphStore::load(nodes, edges) {
        Ok(store) => {
            info!(nodes = store.node_count(), edges = store.edge_count(), "loaded graph");
            Ok(store)
        }
        Err(err) => {
            for violation in err.violations() {
                error!("{violation}");
            }
            Err(err.into())
        }
    }
}

fn route(args: &RouteArgs, out: &mut impl Write) -> Result<(), CliError> {
    let store = load_graph(&args.graph)?;
    let planners = [Planner::Dijkstra, Planner::AStar(args.heuristic.into())];

    for planner in planners {
        let (result, record) = measure(&store, planner, args.from, args.to)?;
        write_route(&store, &result, &record, out)?;
    }
    Ok(())
}

fn write_route(store: &GraphStore, result: &PathResult, record: &RunRecord, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(
        out,
        "{}: dist={:.6} nodes={} us={} path_len={}",
        record.label.to_uppercase(),
        result.cost,
        result.nodes_expanded,
        record.elapsed,
        result.path.len()
    )?;

    let steps = result
        .path
        .iter()
        .map(|&id| -> Result<String, GraphError> { Ok(format!("{id} ({})", store.name_of(id)?)) })
        .collect::<Result<Vec<_>, GraphError>>()?;
    if steps.is_empty() {
        writeln!(out, "Path: none")?;
    } else {
        writeln!(out, "Path: {}", steps.join(" -> "))?;
    }
    Ok(())
}

fn nearest(args: &NearestArgs, out: &mut impl Write) -> Result<(), CliError> {
    let store = load_graph(&args.graph)?;
    let locator = NodeLocator::build(&store)?;
    let id = locator.nearest(LatLon::new(args.lat, args.lon))?;
    writeln!(out, "{id} ({})", store.name_of(id)?)?;
    Ok(())
}

fn reach(args: &ReachArgs, out: &mut impl Write) -> Result<(), CliError> {
    let store = load_graph(&args.graph)?;
    let Some(start) = args.from.or_else(|| store.node_ids().next()) else {
        writeln!(out, "No nodes found.")?;
        return Ok(());
    };

    let visited = reachable_from(&store, start)?;
    let mut missing: Vec<NodeId> = unreachable(&store, start)?.into_iter().collect();
    missing.sort_unstable();

    writeln!(out, "Connected: {} of {} nodes reachable from {start}.", visited.len(), store.node_count())?;
    if missing.is_empty() {
        writeln!(out, "All nodes are connected.")?;
    } else {
        let ids: Vec<String> = missing.iter().map(ToString::to_string).collect();
        writeln!(out, "Unreachable node ids: {}", ids.join(", "))?;
    }
    Ok(())
}

fn batch(args: &BatchArgs, out: &mut impl Write) -> Result<(), CliError> {
    let store = load_graph(&args.graph)?;
    let planners = [Planner::Dijkstra, Planner::AStar(args.heuristic.into())];
    let config = BatchConfig { queries: args.queries, seed: args.seed };

    let records = run_batch(&store, &planners, &config)?;
    if let Some(path) = &args.out {
        tables::write_records(path, &records)?;
        info!(path = %path.display(), records = records.len(), "wrote run records");
    }
    write_summary(&summarize(&records), args.json, out)
}

fn write_summary(summary: &BTreeMap<String, SummaryStatistic>, json: bool, out: &mut impl Write) -> Result<(), CliError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, summary)?;
        writeln!(out)?;
        return Ok(());
    }

    for (label, stat) in summary {
        writeln!(out, "{label} count={}", stat.count)?;
        writeln!(out, "  mean time={:.3}", stat.mean_elapsed)?;
        writeln!(out, "  p50={:.3} p90={:.3} p99={:.3}", stat.p50, stat.p90, stat.p99)?;
        writeln!(out, "  mean nodes={:.3} mean dist={:.3}", stat.mean_nodes_expanded, stat.mean_distance)?;
    }
    Ok(())
}
