//! Run statistics for repeated shortest-path queries.
//!
//! Records are grouped by label into an accumulator and finalized into a
//! [`SummaryStatistic`]. Nothing here touches the graph.

pub mod batch;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::instrument;

pub use batch::{measure, run_batch, BatchConfig};


/// One measured shortest-path invocation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub label: String,
    pub distance: f64,
    pub nodes_expanded: u64,
    /// Whole time units, consistent across one run
    pub elapsed: u64,
}

impl RunRecord {

    pub fn new(label: impl Into<String>, distance: f64, nodes_expanded: u64, elapsed: u64) -> Self {
        Self { label: label.into(), distance, nodes_expanded, elapsed }
    }

    /// Fractional measurements are floored to whole units; negative and NaN become 0
    pub fn from_millis(label: impl Into<String>, distance: f64, nodes_expanded: u64, millis: f64) -> Self {
        Self::new(label, distance, nodes_expanded, millis.floor().max(0.0) as u64)
    }
}


/// Per-label summary of a set of run records
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistic {
    pub count: usize,
    pub mean_elapsed: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
    pub mean_nodes_expanded: f64,
    /// Mean over finite distances only, 0 when every query was unreachable
    pub mean_distance: f64,
}


/// Samples collected for one label before finalizing
#[derive(Debug, Default)]
struct Accumulator {
    elapsed: Vec<f64>,
    nodes_expanded: Vec<f64>,
    distances: Vec<f64>,
}

impl Accumulator {

    fn push(&mut self, record: &RunRecord) {
        self.elapsed.push(record.elapsed as f64);
        self.nodes_expanded.push(record.nodes_expanded as f64);
        if record.distance.is_finite() {
            self.distances.push(record.distance);
        }
    }

    fn finish(mut self) -> SummaryStatistic {
        self.elapsed.sort_by(f64::total_cmp);
        SummaryStatistic {
            count: self.elapsed.len(),
            mean_elapsed: mean(&self.elapsed),
            p50: percentile_sorted(&self.elapsed, 50.0),
            p90: percentile_sorted(&self.elapsed, 90.0),
            p99: percentile_sorted(&self.elapsed, 99.0),
            mean_nodes_expanded: mean(&self.nodes_expanded),
            mean_distance: mean(&self.distances),
        }
    }
}


/// Group records by label and summarize each group.
/// Map order is by label and unrelated to input order.
#[instrument(level = "debug", skip_all)]
pub fn summarize<'a, I>(records: I) -> BTreeMap<String, SummaryStatistic>
where
    I: IntoIterator<Item = &'a RunRecord>,
{
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for record in records {
        groups.entry(record.label.clone()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(label, acc)| (label, acc.finish()))
        .collect()
}


/// Linearly interpolated percentile, `p` in [0, 100].
///
/// With the values sorted, `idx = p / 100 * (n - 1)` and the result blends
/// `v[floor(idx)]` and `v[floor(idx) + 1]` by the fractional part.
/// An empty input yields 0 through [`EMPTY_PERCENTILE`].
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Value reported for the percentile of an empty sample.
/// Kept at 0 for compatibility with existing reports, although callers
/// cannot tell it apart from a genuine 0 measurement.
pub const EMPTY_PERCENTILE: f64 = 0.0;

fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return EMPTY_PERCENTILE;
    }

    let idx = (p / 100.0) * (n - 1) as f64;
    let lo = (idx.floor() as usize).min(n - 1);
    let hi = (lo + 1).min(n - 1);
    let frac = idx - lo as f64;

    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
