use crate::collections::FxHashSet;
use crate::errors::GraphError;
use crate::graph::{GraphStore, NodeId};
use super::{trace_path, GraphNodeMap, PathResult};

use std::{collections::BinaryHeap, hash::Hash, cmp::Ordering};
use num_traits::Float;
use indexmap::map::Entry::{Occupied, Vacant};
use tracing::{instrument, trace};



/// Weighted shortest path from `start` to `goal` using Dijkstra's Algorithm
/// https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm
///
/// Stops as soon as `goal` is finalized. Returns `PathResult::unreachable`
/// (infinite cost, empty path) when no path exists. Both endpoints must be
/// loaded, otherwise fails with `UnknownNode`.
#[instrument(level = "debug", skip(store))]
pub fn shortest_path(store: &GraphStore, start: NodeId, goal: NodeId) -> Result<PathResult, GraphError> {
    store.require(start)?;
    store.require(goal)?;

    let neighbors = |node: &NodeId| store.edges_of(*node).iter().map(|e| (e.target, e.weight));
    let search = build_dijkstra_graph(start, neighbors, |node| *node == goal);

    trace!(expanded = search.expanded, discovered = search.node_map.len(), "dijkstra finished");

    match search.goal_index {
        Some(goal_index) => {
            let (_, &(_, cost)) = search.node_map.get_index(goal_index).ok_or(GraphError::UnknownNode(goal))?;
            Ok(PathResult {
                cost,
                path: trace_path(&search.node_map, goal_index),
                nodes_expanded: search.expanded,
            })
        }
        None => Ok(PathResult::unreachable(search.expanded)),
    }
}


/// State left behind by one Dijkstra run
pub(crate) struct DijkstraSearch<N, C> {
    /// Every discovered node with its parent index and best known cost
    pub node_map: GraphNodeMap<N, C>,
    /// Index of the goal in node_map, if it was finalized
    pub goal_index: Option<usize>,
    /// Number of nodes finalized
    pub expanded: usize,
}


/// Traverses the graph using Dijkstra's algorithm
/// Returns the map of discovered nodes with their smallest costs along with the index of the goal node
///
/// A node is finalized the first time it is popped. The queue is never
/// updated in place; entries for already finalized nodes are skipped at pop time.
pub(crate) fn build_dijkstra_graph<N, C, IT, NN, G>(start: N, neighbors: NN, goal_fn: G) -> DijkstraSearch<N, C>
where
    N: Eq + Hash + Clone,
    NN: Fn(&N) -> IT, // returns iterator of neighbors + costs
    IT: IntoIterator<Item = (N, C)>, // Iterator of neighbors + edge cost to neighbor node
    C: Float,
    G: Fn(&N) -> bool // Returns true if goal is met
    {

    // Nodes to visit - binary heap sorts Biggest to Smallest, QueueEntry reverses it
    let mut nodes_to_visit: BinaryHeap<QueueEntry<C>> = BinaryHeap::new();

    // The tuple contains (parent_index, cost) where parent_index is the index of the parent node in the map
    // for the start node, parent_index is set to usize::MAX to indicate it has no parent
    let mut nodes_map: GraphNodeMap<N, C> = GraphNodeMap::default();

    // indexes into nodes_map whose cost is final
    let mut closed: FxHashSet<usize> = FxHashSet::default();

    let start_index = nodes_map.insert_full(start, (usize::MAX, C::zero())).0;
    nodes_to_visit.push(QueueEntry {
        index: start_index,
        cost: C::zero(),
    });

    // Loop over each node to visit, removing the smallest node
    while let Some(QueueEntry { index, .. }) = nodes_to_visit.pop() {

        // stale entry, a cheaper one was popped earlier
        if !closed.insert(index) {
            continue;
        }

        let Some((node, &(_, c))) = nodes_map.get_index(index) else {
            continue;
        };
        let node = node.clone();

        // Check if we've reached the goal
        if goal_fn(&node) {
            return DijkstraSearch { node_map: nodes_map, goal_index: Some(index), expanded: closed.len() };
        }

        // loop over neighbors
        for (neighbor, edge_cost) in neighbors(&node) {

            // new cost to reach this node = edge cost + node cost
            let new_cost = edge_cost + c;

            let neighbor_index = match nodes_map.entry(neighbor) {
                Vacant(e) => {
                    // This is the first time we're seeing this neighbor
                    let neighbor_index = e.index();
                    e.insert((index, new_cost));
                    neighbor_index
                }
                Occupied(mut e) => {
                    if !closed.contains(&e.index()) && e.get().1 > new_cost {
                        // We've found a better path to this neighbor
                        e.insert((index, new_cost));
                        e.index()
                    } else {
                        // The existing path is better, do nothing
                        continue;
                    }
                }
            };

            nodes_to_visit.push(QueueEntry {
                index: neighbor_index,
                cost: new_cost,
            });
        }
    }

    let expanded = closed.len();
    DijkstraSearch { node_map: nodes_map, goal_index: None, expanded }
}


/// Priority queue entry
/// - for ordering we only need cost and a way to identify the node
/// - ordering is reversed so the BinaryHeap pops the cheapest entry first
/// - equal costs fall back to the index so the order is stable within a run
#[derive(Debug)]
struct QueueEntry<T> {
    index: usize,
    cost: T
}

impl<T: Float> Ord for QueueEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.index.cmp(&self.index))
    }
}
impl<T: Float> PartialOrd for QueueEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: Float> PartialEq for QueueEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<T: Float> Eq for QueueEntry<T> {}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeRow, NodeRow};

    fn store(n: u64, edges: &[(u64, u64, f64)]) -> GraphStore {
        GraphStore::load(
            (0..n).map(|id| NodeRow::unplaced(id, format!("city-{id}"))),
            edges.iter().map(|&(a, b, w)| EdgeRow::new(a, b, w)),
        ).unwrap()
    }

    // Diamond: 0 -> 1 -> 3 costs 6, 0 -> 2 -> 3 costs 4
    fn diamond() -> GraphStore {
        store(4, &[(0, 1, 1.0), (0, 2, 3.0), (1, 3, 5.0), (2, 3, 1.0)])
    }

    #[test]
    fn test_line_graph() {
        let g = store(3, &[(0, 1, 1.0), (1, 2, 2.0)]);
        let result = shortest_path(&g, 0, 2).unwrap();
        assert_eq!(result.cost, 3.0);
        assert_eq!(result.path, vec![0, 1, 2]);
    }

    #[test]
    fn test_dijkstra_finds_optimal_path() {
        let result = shortest_path(&diamond(), 0, 3).unwrap();
        assert_eq!(result.cost, 4.0);
        assert_eq!(result.path, vec![0, 2, 3]);
    }

    #[test]
    fn test_traversal_ignores_declared_direction() {
        // same diamond, every edge declared backwards
        let g = store(4, &[(1, 0, 1.0), (2, 0, 3.0), (3, 1, 5.0), (3, 2, 1.0)]);
        let result = shortest_path(&g, 3, 0).unwrap();
        assert_eq!(result.cost, 4.0);
        assert_eq!(result.path, vec![3, 2, 0]);
    }

    #[test]
    fn test_start_equals_goal() {
        let result = shortest_path(&diamond(), 2, 2).unwrap();
        assert_eq!(result.cost, 0.0);
        assert_eq!(result.path, vec![2]);
        assert_eq!(result.nodes_expanded, 1);
    }

    #[test]
    fn test_isolated_goal_is_unreachable() {
        let g = store(6, &[(0, 1, 1.0), (1, 2, 1.0)]);
        let result = shortest_path(&g, 0, 5).unwrap();
        assert_eq!(result.cost, f64::INFINITY);
        assert!(result.path.is_empty());
        assert!(!result.is_reachable());
        // whole component of 0 was exhausted
        assert_eq!(result.nodes_expanded, 3);
    }

    #[test]
    fn test_unknown_endpoints() {
        let g = diamond();
        assert_eq!(shortest_path(&g, 0, 42), Err(GraphError::UnknownNode(42)));
        assert_eq!(shortest_path(&g, 42, 0), Err(GraphError::UnknownNode(42)));
    }

    #[test]
    fn test_parallel_edges_use_cheapest() {
        let g = store(2, &[(0, 1, 9.0), (1, 0, 2.0), (0, 1, 5.0)]);
        let result = shortest_path(&g, 0, 1).unwrap();
        assert_eq!(result.cost, 2.0);
        assert_eq!(result.path, vec![0, 1]);
    }

    #[test]
    fn test_tied_alternative_keeps_cost() {
        let mut edges = vec![(0, 1, 1.0), (0, 2, 3.0), (1, 3, 5.0), (2, 3, 1.0)];
        let before = shortest_path(&store(5, &edges), 0, 3).unwrap();

        // 0 -> 4 -> 3 also costs 4
        edges.push((0, 4, 2.0));
        edges.push((4, 3, 2.0));
        let after = shortest_path(&store(5, &edges), 0, 3).unwrap();

        assert_eq!(before.cost, after.cost);
        assert!(after.path == vec![0, 2, 3] || after.path == vec![0, 4, 3]);
    }

    #[test]
    fn test_stops_at_goal() {
        // cheap goal next to start, expensive tail behind it
        let g = store(5, &[(0, 1, 1.0), (0, 2, 10.0), (2, 3, 1.0), (3, 4, 1.0)]);
        let result = shortest_path(&g, 0, 1).unwrap();
        assert_eq!(result.nodes_expanded, 2);
    }

    #[test]
    fn test_repeated_queries_agree() {
        let g = diamond();
        let first = shortest_path(&g, 0, 3).unwrap();
        let second = shortest_path(&g, 0, 3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_dijkstra_graph_with_cycle() {
        let g = store(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0), (2, 3, 2.0)]);
        let neighbors = |node: &NodeId| g.edges_of(*node).iter().map(|e| (e.target, e.weight));
        let search = build_dijkstra_graph(0, neighbors, |_| false);

        let cost = |id: NodeId| search.node_map.get(&id).map(|&(_, c)| c).unwrap();
        assert_eq!(cost(0), 0.0);
        assert_eq!(cost(1), 1.0);
        assert_eq!(cost(2), 1.0);
        assert_eq!(cost(3), 3.0);
        assert_eq!(search.expanded, 4);
        assert_eq!(search.goal_index, None);
    }
}
