//! Immutable road network: node table plus undirected weighted adjacency.
//!
//! A [`GraphStore`] is built once from already parsed node and edge rows and
//! never changes afterwards. Loading validates every row and reports all
//! problems in one [`GraphError::DataIntegrity`] instead of stopping at the
//! first bad row.

use indexmap::map::Entry::{Occupied, Vacant};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::collections::FxIndexMap;
use crate::errors::{GraphError, LoadViolation};
use crate::geometry::LatLon;

/// Node identifier as it appears in the source tables
pub type NodeId = u64;


/// One row of the node table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRow {
    pub id: NodeId,
    pub name: String,
    pub position: Option<LatLon>,
}

impl NodeRow {

    pub fn new(id: NodeId, lat: f64, lon: f64, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), position: Some(LatLon::new(lat, lon)) }
    }

    /// Node without coordinates
    pub fn unplaced(id: NodeId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), position: None }
    }
}


/// One row of the edge table, declared in either direction
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub src: NodeId,
    pub dst: NodeId,
    pub distance: f64,
}

impl EdgeRow {
    pub fn new(src: NodeId, dst: NodeId, distance: f64) -> Self {
        Self { src, dst, distance }
    }
}


/// Loaded node metadata
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub position: Option<LatLon>,
}

/// Adjacency entry: neighbor reachable directly plus the edge distance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub weight: f64,
}


/// Immutable graph built from validated rows.
///
/// Node ids map to dense slots in load order; `adjacency[slot]` holds every
/// edge touching that node. Each undirected edge is stored once under each
/// endpoint, and both entries are pushed together.
#[derive(Debug, Clone)]
pub struct GraphStore {
    nodes: FxIndexMap<NodeId, Node>,
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
}

impl GraphStore {

    /// Build a graph from node and edge rows.
    ///
    /// Fails with [`GraphError::DataIntegrity`] listing every duplicate node,
    /// dangling edge and non-positive (or non-finite) distance, in row order.
    #[instrument(level = "debug", skip_all)]
    pub fn load<NI, EI>(node_rows: NI, edge_rows: EI) -> Result<Self, GraphError>
    where
        NI: IntoIterator<Item = NodeRow>,
        EI: IntoIterator<Item = EdgeRow>,
    {
        let mut violations: Vec<LoadViolation> = Vec::new();

        let mut nodes: FxIndexMap<NodeId, Node> = FxIndexMap::default();
        for (row, NodeRow { id, name, position }) in node_rows.into_iter().enumerate() {
            match nodes.entry(id) {
                Occupied(_) => violations.push(LoadViolation::DuplicateNode { row, id }),
                Vacant(e) => {
                    e.insert(Node { id, name, position });
                }
            }
        }

        let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); nodes.len()];
        let mut edge_count = 0;

        for (row, EdgeRow { src, dst, distance }) in edge_rows.into_iter().enumerate() {
            let mut valid = true;

            // NaN fails the comparison as well
            if !(distance > 0.0 && distance.is_finite()) {
                violations.push(LoadViolation::InvalidWeight { row, src, dst, weight: distance });
                valid = false;
            }

            let src_slot = nodes.get_index_of(&src);
            let dst_slot = nodes.get_index_of(&dst);
            if src_slot.is_none() {
                violations.push(LoadViolation::DanglingEdge { row, src, dst, missing: src });
            }
            if dst_slot.is_none() && dst != src {
                violations.push(LoadViolation::DanglingEdge { row, src, dst, missing: dst });
            }

            if let (true, Some(a), Some(b)) = (valid, src_slot, dst_slot) {
                adjacency[a].push(Edge { target: dst, weight: distance });
                adjacency[b].push(Edge { target: src, weight: distance });
                edge_count += 1;
            }
        }

        if !violations.is_empty() {
            warn!(violations = violations.len(), "graph load rejected");
            return Err(GraphError::DataIntegrity(violations));
        }

        debug!(nodes = nodes.len(), edges = edge_count, "graph loaded");
        Ok(Self { nodes, adjacency, edge_count })
    }

    /// Edges leaving `id`, in insertion order
    pub fn neighbors(&self, id: NodeId) -> Result<&[Edge], GraphError> {
        let slot = self.slot(id)?;
        Ok(&self.adjacency[slot])
    }

    /// Edges leaving `id`, empty when the node is unknown.
    /// Search code validates its endpoints up front and uses this in the hot loop.
    pub(crate) fn edges_of(&self, id: NodeId) -> &[Edge] {
        match self.nodes.get_index_of(&id) {
            Some(slot) => &self.adjacency[slot],
            None => &[],
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges loaded (parallel edges counted separately)
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn name_of(&self, id: NodeId) -> Result<&str, GraphError> {
        self.nodes
            .get(&id)
            .map(|n| n.name.as_str())
            .ok_or(GraphError::UnknownNode(id))
    }

    pub fn position_of(&self, id: NodeId) -> Result<Option<LatLon>, GraphError> {
        self.nodes
            .get(&id)
            .map(|n| n.position)
            .ok_or(GraphError::UnknownNode(id))
    }

    /// Node ids in load order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Node metadata in load order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Fail with `UnknownNode` unless `id` is loaded
    pub fn require(&self, id: NodeId) -> Result<(), GraphError> {
        self.slot(id).map(|_| ())
    }

    /// Dense load-order position of `id`
    pub(crate) fn slot(&self, id: NodeId) -> Result<usize, GraphError> {
        self.nodes.get_index_of(&id).ok_or(GraphError::UnknownNode(id))
    }
}
