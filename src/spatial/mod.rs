//! Nearest-node lookup over an R-tree.
//!
//! Node coordinates are projected onto a local equirectangular plane (metres,
//! centred on the graph's mean latitude) and bulk loaded into an R-tree. A
//! query walks the tree's nearest-neighbour iterator and keeps reading while
//! candidates stay at the minimum distance, so the result is the exact
//! nearest node under the planar metric with ties going to the lowest node id.

use std::fmt;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::{
    graph::{Graph, NodeId},
    shared::geo::{Coordinate, Distance, EARTH_RADIUS},
};

/// Equirectangular projection around a reference latitude.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    cos_reference: f64,
}

impl Projection {
    pub fn new(reference_latitude: f64) -> Self {
        Self {
            cos_reference: f64::cos(f64::to_radians(reference_latitude)),
        }
    }

    pub fn project(&self, coordinate: &Coordinate) -> [f64; 2] {
        let radius = EARTH_RADIUS.as_meters();
        [
            f64::to_radians(coordinate.longitude) * radius * self.cos_reference,
            f64::to_radians(coordinate.latitude) * radius,
        ]
    }

    /// Planar distance between two coordinates.
    pub fn distance(&self, a: &Coordinate, b: &Coordinate) -> Distance {
        let [ax, ay] = self.project(a);
        let [bx, by] = self.project(b);
        Distance::from_meters(f64::hypot(ax - bx, ay - by))
    }
}

#[derive(Debug, Clone, Copy)]
struct NodePoint {
    id: NodeId,
    index: u32,
    point: [f64; 2],
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Result of a nearest-node query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub id: NodeId,
    pub index: u32,
    pub distance: Distance,
}

pub struct SpatialIndex {
    projection: Projection,
    tree: RTree<NodePoint>,
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("projection", &self.projection)
            .field("len", &self.tree.size())
            .finish()
    }
}

impl SpatialIndex {
    pub fn new(graph: &Graph) -> Self {
        let reference: Coordinate = graph.nodes.iter().map(|node| node.coordinate).sum();
        let projection = Projection::new(reference.latitude);
        let points: Vec<NodePoint> = graph
            .nodes
            .iter()
            .map(|node| NodePoint {
                id: node.id,
                index: node.index,
                point: projection.project(&node.coordinate),
            })
            .collect();
        Self {
            projection,
            tree: RTree::bulk_load(points),
        }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Id of the node closest to the coordinate.
    /// None is only returned for an empty index or a non-finite coordinate.
    pub fn nearest(&self, coordinate: &Coordinate) -> Option<NodeId> {
        self.nearest_node(coordinate).map(|nearest| nearest.id)
    }

    pub fn nearest_node(&self, coordinate: &Coordinate) -> Option<Nearest> {
        let query = self.projection.project(coordinate);
        if !query.iter().all(|value| value.is_finite()) {
            return None;
        }

        let mut best: Option<(f64, &NodePoint)> = None;
        for (candidate, d2) in self.tree.nearest_neighbor_iter_with_distance_2(&query) {
            match best {
                // Candidates come in increasing distance, past the minimum we are done
                Some((best_d2, _)) if d2 > best_d2 => break,
                Some((_, current)) if current.id <= candidate.id => {}
                _ => best = Some((d2, candidate)),
            }
        }

        best.map(|(d2, point)| Nearest {
            id: point.id,
            index: point.index,
            distance: Distance::from_meters(d2.sqrt()),
        })
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
