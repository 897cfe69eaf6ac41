use kdtree::KdTree;
use kdtree::distance::squared_euclidean;
use tracing::debug;

use crate::errors::LocateError;
use crate::geometry::LatLon;
use crate::graph::{GraphStore, NodeId};


/// Nearest-node lookup over node positions.
/// Lets a query start from a coordinate instead of a node id.
pub struct NodeLocator {
    tree: KdTree<f64, NodeId, [f64; 2]>, // stores [lat, lon] -> node id
}

impl NodeLocator {

    /// Index every node that has a position. Nodes without one are skipped.
    pub fn build(store: &GraphStore) -> Result<Self, LocateError> {
        let mut tree = KdTree::new(2);
        let mut skipped = 0usize;

        for node in store.nodes() {
            match node.position {
                Some(p) => tree.add([p.lat, p.lon], node.id)?,
                None => skipped += 1,
            }
        }

        if tree.size() == 0 {
            return Err(LocateError::NoPlacedNodes);
        }

        debug!(indexed = tree.size(), skipped, "node locator built");
        Ok(Self { tree })
    }

    /// Closest node to `point`, measured in degree space
    pub fn nearest(&self, point: LatLon) -> Result<NodeId, LocateError> {
        let closest = self.tree.nearest(&[point.lat, point.lon], 1, &squared_euclidean)?;
        closest
            .first()
            .map(|&(_, &id)| id)
            .ok_or(LocateError::NoPlacedNodes)
    }
}
