use super::GraphNodeMap;

/// Construct the path from the start node to the node at `goal_index`
/// node_map: GraphNodeMap<N, C> - map of nodes with their parent index and cost
/// goal_index: usize - index of the goal node in the node_map
/// The start node is the only entry whose parent index is usize::MAX
pub(crate) fn trace_path<N, C>(node_map: &GraphNodeMap<N, C>, goal_index: usize) -> Vec<N>
where
    N: Clone,
{

    let mut path = Vec::new();
    let mut current_index = goal_index;

    // Trace back from goal to start
    while let Some((node, &(parent_index, _))) = node_map.get_index(current_index) {
        path.push(node.clone());
        current_index = parent_index;
    }

    // The path is in reverse order, so reverse it
    path.reverse();
    path
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_path() {
        let mut node_map: GraphNodeMap<u64, f64> = GraphNodeMap::default();

        let a = node_map.insert_full(10, (usize::MAX, 0.0)).0;
        let b = node_map.insert_full(11, (a, 1.0)).0;
        let c = node_map.insert_full(12, (a, 3.0)).0;
        let d = node_map.insert_full(13, (c, 4.0)).0;

        assert_eq!(trace_path(&node_map, d), vec![10, 12, 13]);
        assert_eq!(trace_path(&node_map, b), vec![10, 11]);
        assert_eq!(trace_path(&node_map, a), vec![10]);
    }

    #[test]
    fn test_trace_path_unknown_index_is_empty() {
        let node_map: GraphNodeMap<u64, f64> = GraphNodeMap::default();
        assert!(trace_path(&node_map, 3).is_empty());
    }
}
