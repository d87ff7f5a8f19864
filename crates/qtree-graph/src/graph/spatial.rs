//! Spatial Index for hit testing and drop proximity
//!
//! R-tree (via `rstar`) over node discs in world space. Entries are keyed by
//! simulation index, not node id, since placeholder ids may repeat.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// One node disc in the index
#[derive(Debug, Clone)]
pub struct SpatialNode {
    /// Index into the simulation's node list
    pub index: usize,
    bounds: AABB<[f32; 2]>,
    pub center: [f32; 2],
    pub radius: f32,
}

impl SpatialNode {
    pub fn new(index: usize, center: [f32; 2], radius: f32) -> Self {
        let bounds = AABB::from_corners(
            [center[0] - radius, center[1] - radius],
            [center[0] + radius, center[1] + radius],
        );
        Self {
            index,
            bounds,
            center,
            radius,
        }
    }

    fn center_distance(&self, point: [f32; 2]) -> f32 {
        let dx = point[0] - self.center[0];
        let dy = point[1] - self.center[1];
        (dx * dx + dy * dy).sqrt()
    }

    /// Distance from `point` to the disc edge (0 inside)
    fn edge_distance(&self, point: [f32; 2]) -> f32 {
        (self.center_distance(point) - self.radius).max(0.0)
    }
}

impl RTreeObject for SpatialNode {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

impl PointDistance for SpatialNode {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let d = self.edge_distance(*point);
        d * d
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        self.center_distance(*point) <= self.radius
    }
}

#[derive(Clone, Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialNode>,
    count: usize,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from current positions. Positions change every tick, so this
    /// is called once per frame before any query.
    pub fn rebuild(&mut self, nodes: impl Iterator<Item = SpatialNode>) {
        let nodes: Vec<_> = nodes.collect();
        self.count = nodes.len();
        self.tree = RTree::bulk_load(nodes);
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.count = 0;
    }

    /// Closest node whose disc is within `tolerance` of `point`
    pub fn hit_test(&self, point: [f32; 2], tolerance: f32) -> Option<usize> {
        let search = AABB::from_corners(
            [point[0] - tolerance, point[1] - tolerance],
            [point[0] + tolerance, point[1] + tolerance],
        );
        self.tree
            .locate_in_envelope_intersecting(&search)
            .map(|node| (node.edge_distance(point), node.index))
            .filter(|(d, _)| *d <= tolerance)
            .min_by(|a, b| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1)))
            .map(|(_, index)| index)
    }

    /// Nearest node center within `radius` of `point` that passes `accept`
    pub fn nearest_within(
        &self,
        point: [f32; 2],
        radius: f32,
        mut accept: impl FnMut(usize) -> bool,
    ) -> Option<usize> {
        let search = AABB::from_corners(
            [point[0] - radius, point[1] - radius],
            [point[0] + radius, point[1] + radius],
        );
        self.tree
            .locate_in_envelope_intersecting(&search)
            .map(|node| (node.center_distance(point), node.index))
            .filter(|(d, index)| *d <= radius && accept(*index))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, index)| index)
    }

    /// Indices of all nodes whose disc comes within `radius` of `center`
    pub fn query_radius(&self, center: [f32; 2], radius: f32) -> Vec<usize> {
        let search = AABB::from_corners(
            [center[0] - radius, center[1] - radius],
            [center[0] + radius, center[1] + radius],
        );
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&search)
            .filter(|node| node.edge_distance(center) <= radius)
            .map(|node| node.index)
            .collect();
        hits.sort_unstable();
        hits
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
