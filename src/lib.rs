//! Road network analysis over a static, undirected, weighted graph.
//!
//! Cities are nodes and routes are weighted edges. The crate loads a validated
//! [`GraphStore`] from already parsed rows, answers reachability and
//! shortest-path queries against it, and summarizes repeated query
//! measurements into mean / p50 / p90 / p99 statistics.
//!
//! Everything is synchronous and single-threaded. A loaded graph never changes,
//! so a `&GraphStore` can be shared freely between queries.

mod collections;
pub mod errors;
pub mod geometry;
pub mod graph;
pub mod graph_algos;
pub mod locate;
pub mod metrics;

pub use collections::FxHashSet;
pub use errors::{GraphError, LoadViolation, LocateError};
pub use geometry::LatLon;
pub use graph::{Edge, EdgeRow, GraphStore, Node, NodeId, NodeRow};
pub use graph_algos::{
    a_star, components, is_connected, reachable_from, shortest_path, unreachable, Heuristic,
    PathResult, Planner,
};
pub use locate::NodeLocator;
pub use metrics::{
    measure, percentile, run_batch, summarize, BatchConfig, RunRecord, SummaryStatistic,
};
