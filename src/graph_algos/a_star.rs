use crate::collections::FxHashSet;
use crate::errors::GraphError;
use crate::geometry::LatLon;
use crate::graph::{GraphStore, NodeId};
use super::{trace_path, GraphNodeMap, PathResult};

use std::{
    collections::BinaryHeap,
    hash::Hash,
    cmp::Ordering
};
use num_traits::Float;
use indexmap::map::Entry::{Occupied, Vacant};
use tracing::{instrument, trace};



/// Node on A* graph
#[derive(Debug)]
struct Node<T> {
    index: usize, // index in the closed_list - maps to the Id of the node
    f_cost: T, // Total cost = cost + h(n) aka estimated cost
}

impl<T: Float> Ord for Node<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.index.cmp(&self.index))
    }
}
impl<T: Float> PartialOrd for Node<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: Float> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<T: Float> Eq for Node<T> {}


/// Remaining-distance estimate used to guide A*.
/// Nodes without a position always estimate 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heuristic {
    /// No guidance, A* expands like Dijkstra
    Zero,
    /// Straight-line distance in degree space
    Planar,
    /// Great-circle distance in kilometers
    Haversine,
}

impl Heuristic {

    pub fn estimate(&self, from: Option<LatLon>, to: Option<LatLon>) -> f64 {
        match (self, from, to) {
            (Heuristic::Planar, Some(a), Some(b)) => a.planar_distance(&b),
            (Heuristic::Haversine, Some(a), Some(b)) => a.haversine_km(&b),
            _ => 0.0,
        }
    }
}


/// A* Algorithm
/// https://en.wikipedia.org/wiki/A*_search_algorithm
///
/// Same contract as `shortest_path`. The returned cost is optimal when the
/// heuristic never overestimates the remaining distance for the weights in
/// the graph (Haversine with kilometer distances, or Zero).
#[instrument(level = "debug", skip(store))]
pub fn a_star(store: &GraphStore, start: NodeId, goal: NodeId, heuristic: Heuristic) -> Result<PathResult, GraphError> {
    store.require(start)?;
    let target = store.position_of(goal)?;

    let neighbors = |node: &NodeId| store.edges_of(*node).iter().map(|e| (e.target, e.weight));
    let heuristic_fn = |node: &NodeId| {
        let from = store.node(*node).and_then(|n| n.position);
        heuristic.estimate(from, target)
    };

    let (closed_list, goal_index, expanded) = build_graph(start, neighbors, heuristic_fn, |node| *node == goal);

    trace!(expanded, discovered = closed_list.len(), "a* finished");

    match goal_index {
        Some(goal_index) => {
            let (_, &(_, cost)) = closed_list.get_index(goal_index).ok_or(GraphError::UnknownNode(goal))?;
            Ok(PathResult {
                cost,
                path: trace_path(&closed_list, goal_index),
                nodes_expanded: expanded,
            })
        }
        None => Ok(PathResult::unreachable(expanded)),
    }
}


/// Traverses the graph using A* algorithm
/// Returns a map of nodes with their smallest costs, the index of the goal node
/// and the number of nodes expanded
fn build_graph<N, C, IT, NN, H, G>(start: N, neighbors: NN, heuristic_fn: H, goal_fn: G) -> (GraphNodeMap<N, C>, Option<usize>, usize)
where
    N: Eq + Hash + Clone,
    NN: Fn(&N) -> IT, // returns iterator of neighbors + costs
    IT: IntoIterator<Item = (N, C)>, // Iterator of neighbors + edge cost to neighbor node
    C: Float,
    H: Fn(&N) -> C, // heuristic function
    G: Fn(&N) -> bool // Returns true if goal is met
{
    // Open List
    // Nodes that need to be evaluated, implemented as priority queue
    // Sorting is done by f_cost (cost + heuristic)
    let mut open_list: BinaryHeap<Node<C>> = BinaryHeap::new();

    // Every discovered node, used to find the final path
    // The tuple contains (parent_index, cost) where parent_index is the index of the parent node in the closed_list
    // for the start node, parent_index is set to usize::MAX to indicate it has no parent
    let mut closed_list: GraphNodeMap<N, C> = GraphNodeMap::default();

    // nodes already expanded, their cost is final
    let mut expanded: FxHashSet<usize> = FxHashSet::default();

    let start_h = heuristic_fn(&start);
    let start_index = closed_list.insert_full(start, (usize::MAX, C::zero())).0;
    open_list.push(Node {
        index: start_index,
        f_cost: start_h,
    });

    while let Some(Node { index, .. }) = open_list.pop() {

        if !expanded.insert(index) {
            continue;
        }

        let Some((node, &(_, c))) = closed_list.get_index(index) else {
            continue;
        };
        let node = node.clone();

        // Check if we've reached the goal
        if goal_fn(&node) {
            let count = expanded.len();
            return (closed_list, Some(index), count);
        }

        // loop over neighbors
        for (neighbor, edge_cost) in neighbors(&node) {

            // new cost to reach this node = edge cost + node cost
            // This is confirmed cost, not heuristic
            let new_cost = edge_cost + c;

            // calculate heuristic cost
            let h_cost: C = heuristic_fn(&neighbor);

            let neighbor_index = match closed_list.entry(neighbor) {
                Vacant(e) => {
                    // This is the first time we're seeing this neighbor
                    let neighbor_index = e.index();
                    e.insert((index, new_cost));
                    neighbor_index
                }
                Occupied(mut e) => {
                    if !expanded.contains(&e.index()) && e.get().1 > new_cost {
                        // We've found a better path to this neighbor
                        e.insert((index, new_cost));
                        e.index()
                    } else {
                        // The existing path is better, do nothing
                        continue;
                    }
                }
            };

            // Only add to the queue if we've found a better path
            open_list.push(Node {
                index: neighbor_index,
                f_cost: new_cost + h_cost,
            });
        }
    }

    let count = expanded.len();
    (closed_list, None, count)
}
