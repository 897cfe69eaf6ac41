pub mod bfs;
pub mod dijkstra;
pub mod a_star;
mod path;

use path::trace_path;

use crate::collections::FxIndexMap;
use crate::errors::GraphError;
use crate::graph::{GraphStore, NodeId};

pub use a_star::{a_star, Heuristic};
pub use bfs::{components, is_connected, reachable_from, unreachable};
pub use dijkstra::shortest_path;

/// Type alias for the node map used in path planning algorithms
/// N: Node - space on a graph
/// C: Cost of reaching the node from the start
/// The tuple contains (parent_index, cost) where:
/// - parent_index is the index of the parent node in the map
/// - cost is the total cost to reach this node from the start
pub(crate) type GraphNodeMap<N, C> = FxIndexMap<N, (usize, C)>;


/// Outcome of one point-to-point search.
/// An unreachable goal is a normal result: infinite cost and an empty path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    pub cost: f64,
    pub path: Vec<NodeId>,
    /// Nodes finalized before the search stopped, goal included
    pub nodes_expanded: usize,
}

impl PathResult {

    pub fn unreachable(nodes_expanded: usize) -> Self {
        Self { cost: f64::INFINITY, path: Vec::new(), nodes_expanded }
    }

    pub fn is_reachable(&self) -> bool {
        !self.path.is_empty()
    }
}


/// Search algorithm selector used by the batch runner and the CLI
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Planner {
    Dijkstra,
    AStar(Heuristic),
}

impl Planner {

    /// Label written into run records
    pub fn label(&self) -> &'static str {
        match self {
            Planner::Dijkstra => "dijkstra",
            Planner::AStar(_) => "astar",
        }
    }

    pub fn run(&self, store: &GraphStore, start: NodeId, goal: NodeId) -> Result<PathResult, GraphError> {
        match *self {
            Planner::Dijkstra => shortest_path(store, start, goal),
            Planner::AStar(heuristic) => a_star(store, start, goal, heuristic),
        }
    }
}
