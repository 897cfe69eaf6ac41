use std::collections::VecDeque;

use tracing::instrument;

use crate::collections::FxHashSet;
use crate::errors::GraphError;
use crate::graph::{GraphStore, NodeId};


/// Every node connected to `start` by some path, `start` included.
///
/// Breadth-first with a FIFO frontier. A node is marked visited before it is
/// enqueued, so it enters the queue at most once. Only the returned set is
/// meaningful; the order nodes were discovered in is not exposed.
#[instrument(level = "debug", skip(store))]
pub fn reachable_from(store: &GraphStore, start: NodeId) -> Result<FxHashSet<NodeId>, GraphError> {
    store.require(start)?;
    Ok(flood(store, start))
}

/// All nodes of the graph that `start` cannot reach
pub fn unreachable(store: &GraphStore, start: NodeId) -> Result<FxHashSet<NodeId>, GraphError> {
    let visited = reachable_from(store, start)?;
    Ok(store.node_ids().filter(|id| !visited.contains(id)).collect())
}

/// Connected components.
/// Each component starts with its earliest loaded node, and components are
/// ordered by that node's load position. Isolated nodes form their own component.
pub fn components(store: &GraphStore) -> Vec<Vec<NodeId>> {
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    let mut result = Vec::new();

    for id in store.node_ids() {
        if seen.contains(&id) {
            continue;
        }
        let members = flood(store, id);
        let mut component: Vec<NodeId> = members.iter().copied().collect();
        component.sort_by_key(|n| store.slot(*n).unwrap_or(usize::MAX));
        seen.extend(members);
        result.push(component);
    }

    result
}

/// True when every node reaches every other node. Empty graphs count as connected.
pub fn is_connected(store: &GraphStore) -> bool {
    match store.node_ids().next() {
        Some(first) => flood(store, first).len() == store.node_count(),
        None => true,
    }
}

fn flood(store: &GraphStore, start: NodeId) -> FxHashSet<NodeId> {
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for edge in store.edges_of(current) {
            if visited.insert(edge.target) {
                queue.push_back(edge.target);
            }
        }
    }

    visited
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeRow, NodeRow};

    fn store(n: u64, edges: &[(u64, u64)]) -> GraphStore {
        GraphStore::load(
            (0..n).map(|id| NodeRow::unplaced(id, "")),
            edges.iter().map(|&(a, b)| EdgeRow::new(a, b, 1.0)),
        ).unwrap()
    }

    fn set(ids: &[NodeId]) -> FxHashSet<NodeId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_reachable_chain() {
        let g = store(4, &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(reachable_from(&g, 0).unwrap(), set(&[0, 1, 2, 3]));
        assert!(unreachable(&g, 0).unwrap().is_empty());
    }

    #[test]
    fn test_reachable_is_symmetric() {
        // edges only declared pointing away from 0
        let g = store(3, &[(0, 1), (1, 2)]);
        assert_eq!(reachable_from(&g, 2).unwrap(), set(&[0, 1, 2]));
    }

    #[test]
    fn test_split_graph() {
        let g = store(6, &[(0, 1), (1, 2), (3, 4)]);
        assert_eq!(reachable_from(&g, 4).unwrap(), set(&[3, 4]));
        assert_eq!(unreachable(&g, 4).unwrap(), set(&[0, 1, 2, 5]));
        assert_eq!(reachable_from(&g, 5).unwrap(), set(&[5]));
    }

    #[test]
    fn test_cycle_no_infinite_loop() {
        let g = store(5, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        assert_eq!(reachable_from(&g, 3).unwrap().len(), 5);
    }

    #[test]
    fn test_unknown_start() {
        let g = store(2, &[(0, 1)]);
        assert_eq!(reachable_from(&g, 7), Err(GraphError::UnknownNode(7)));
        assert_eq!(unreachable(&g, 7), Err(GraphError::UnknownNode(7)));
    }

    #[test]
    fn test_components() {
        let g = store(6, &[(4, 1), (1, 0), (3, 5)]);
        assert_eq!(components(&g), vec![vec![0, 1, 4], vec![2], vec![3, 5]]);
        assert!(!is_connected(&g));
    }

    #[test]
    fn test_connected_graph() {
        assert!(is_connected(&store(3, &[(0, 1), (2, 1)])));
        assert!(is_connected(&store(0, &[])));
    }
}
