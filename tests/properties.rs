use proptest::{
    collection::vec,
    prelude::{Just, Strategy},
    prop_assert, prop_assert_eq, proptest,
};
use route_planner::{
    a_star, components, is_connected, percentile, reachable_from, shortest_path, unreachable,
    EdgeRow, GraphStore, Heuristic, NodeId, NodeRow,
};

/// Node count plus edges between existing ids with strictly positive distances
fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(NodeId, NodeId, f64)>)> {
    (1usize..12).prop_flat_map(|n| {
        let id = 0..n as NodeId;
        (Just(n), vec((id.clone(), id, 0.0001f64..500.0), 0..30))
    })
}

fn build(n: usize, edges: &[(NodeId, NodeId, f64)]) -> GraphStore {
    let nodes = (0..n as NodeId).map(|id| NodeRow::new(id, id as f64, 0.0, format!("n{id}")));
    let rows = edges.iter().map(|&(src, dst, distance)| EdgeRow::new(src, dst, distance));
    GraphStore::load(nodes, rows).unwrap()
}

/// Bellman-Ford over the undirected edge list
fn reference_cost(n: usize, edges: &[(NodeId, NodeId, f64)], start: NodeId, goal: NodeId) -> f64 {
    let mut dist = vec![f64::INFINITY; n];
    dist[start as usize] = 0.0;
    for _ in 0..n {
        for &(a, b, w) in edges {
            let (a, b) = (a as usize, b as usize);
            if dist[a] + w < dist[b] {
                dist[b] = dist[a] + w;
            }
            if dist[b] + w < dist[a] {
                dist[a] = dist[b] + w;
            }
        }
    }
    dist[goal as usize]
}

fn close(a: f64, b: f64) -> bool {
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= 1e-9 * a.abs().max(1.0)
}

proptest! {
    #[test]
    fn every_edge_is_stored_in_both_directions((n, edges) in graph_strategy()) {
        let store = build(n, &edges);
        prop_assert_eq!(store.edge_count(), edges.len());

        for id in store.node_ids() {
            for edge in store.neighbors(id).unwrap() {
                let back = store.neighbors(edge.target).unwrap();
                prop_assert!(back.iter().any(|e| e.target == id && e.weight == edge.weight));
            }
        }
    }

    #[test]
    fn reachable_and_unreachable_partition_the_graph(
        (n, edges) in graph_strategy(),
        start in 0u64..12,
    ) {
        let store = build(n, &edges);
        let start = start % n as NodeId;

        let seen = reachable_from(&store, start).unwrap();
        let missing = unreachable(&store, start).unwrap();

        prop_assert!(seen.contains(&start));
        prop_assert!(seen.is_disjoint(&missing));
        prop_assert_eq!(seen.len() + missing.len(), store.node_count());
        prop_assert_eq!(is_connected(&store), missing.is_empty());
        prop_assert_eq!(components(&store).iter().map(Vec::len).sum::<usize>(), n);
    }

    #[test]
    fn dijkstra_finds_the_minimum_cost(
        (n, edges) in graph_strategy(),
        start in 0u64..12,
        goal in 0u64..12,
    ) {
        let store = build(n, &edges);
        let (start, goal) = (start % n as NodeId, goal % n as NodeId);

        let result = shortest_path(&store, start, goal).unwrap();
        prop_assert!(close(result.cost, reference_cost(n, &edges, start, goal)));

        let reachable = reachable_from(&store, start).unwrap().contains(&goal);
        prop_assert_eq!(result.is_reachable(), reachable);
        if reachable {
            prop_assert_eq!(result.path.first(), Some(&start));
            prop_assert_eq!(result.path.last(), Some(&goal));

            // the path follows real edges and their cheapest weights add up to the cost
            let mut total = 0.0;
            for pair in result.path.windows(2) {
                let cheapest = store
                    .neighbors(pair[0])
                    .unwrap()
                    .iter()
                    .filter(|e| e.target == pair[1])
                    .map(|e| e.weight)
                    .fold(f64::INFINITY, f64::min);
                prop_assert!(cheapest.is_finite());
                total += cheapest;
            }
            prop_assert!(close(total, result.cost));
        } else {
            prop_assert!(result.cost.is_infinite());
            prop_assert!(result.path.is_empty());
        }
    }

    #[test]
    fn unguided_a_star_agrees_with_dijkstra(
        (n, edges) in graph_strategy(),
        start in 0u64..12,
        goal in 0u64..12,
    ) {
        let store = build(n, &edges);
        let (start, goal) = (start % n as NodeId, goal % n as NodeId);

        let dijkstra = shortest_path(&store, start, goal).unwrap();
        let astar = a_star(&store, start, goal, Heuristic::Zero).unwrap();
        prop_assert!(close(dijkstra.cost, astar.cost));
        prop_assert_eq!(dijkstra.is_reachable(), astar.is_reachable());
    }

    #[test]
    fn repeated_queries_return_identical_results(
        (n, edges) in graph_strategy(),
        start in 0u64..12,
        goal in 0u64..12,
    ) {
        let store = build(n, &edges);
        let (start, goal) = (start % n as NodeId, goal % n as NodeId);

        let first = shortest_path(&store, start, goal).unwrap();
        let second = shortest_path(&store, start, goal).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn percentiles_are_ordered_and_bounded(values in vec(0.0f64..1e6, 1..50)) {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let p50 = percentile(&values, 50.0);
        let p90 = percentile(&values, 90.0);
        let p99 = percentile(&values, 99.0);

        prop_assert!(min <= p50 + 1e-6);
        prop_assert!(p50 <= p90 + 1e-6);
        prop_assert!(p90 <= p99 + 1e-6);
        prop_assert!(p99 <= max + 1e-6);
        prop_assert_eq!(percentile(&values, 0.0), min);
        prop_assert_eq!(percentile(&values, 100.0), max);
    }
}
