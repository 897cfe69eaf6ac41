use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, instrument, warn};

use crate::errors::GraphError;
use crate::graph::{GraphStore, NodeId};
use crate::graph_algos::{PathResult, Planner};
use super::RunRecord;


/// Settings for a randomized batch of queries
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Number of (start, goal) pairs to draw
    pub queries: usize,
    /// Fixed seed for reproducible batches, entropy when None
    pub seed: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { queries: 100, seed: None }
    }
}


/// Run one planner and time it.
/// Elapsed time in the record is whole microseconds of wall-clock time.
pub fn measure(store: &GraphStore, planner: Planner, start: NodeId, goal: NodeId) -> Result<(PathResult, RunRecord), GraphError> {
    let t = Instant::now();
    let result = planner.run(store, start, goal)?;
    let elapsed = u64::try_from(t.elapsed().as_micros()).unwrap_or(u64::MAX);

    let record = RunRecord::new(planner.label(), result.cost, result.nodes_expanded as u64, elapsed);
    Ok((result, record))
}


/// Draw random (start, goal) pairs with start != goal and run every planner on each.
/// Produces `queries * planners.len()` records, labelled by planner.
/// Graphs with fewer than two nodes produce an empty batch.
#[instrument(level = "debug", skip(store, planners))]
pub fn run_batch(store: &GraphStore, planners: &[Planner], config: &BatchConfig) -> Result<Vec<RunRecord>, GraphError> {
    let ids: Vec<NodeId> = store.node_ids().collect();
    if ids.len() < 2 {
        warn!(nodes = ids.len(), "not enough nodes for a batch");
        return Ok(Vec::new());
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut records = Vec::with_capacity(config.queries * planners.len());

    for i in 0..config.queries {
        let (start, goal) = loop {
            let start = ids[rng.random_range(0..ids.len())];
            let goal = ids[rng.random_range(0..ids.len())];
            if start != goal {
                break (start, goal);
            }
        };

        for &planner in planners {
            let (result, record) = measure(store, planner, start, goal)?;
            if !result.is_reachable() {
                debug!(start, goal, planner = planner.label(), "no path");
            }
            records.push(record);
        }

        if (i + 1) % 10 == 0 {
            debug!(completed = i + 1, total = config.queries, "batch progress");
        }
    }

    Ok(records)
}
