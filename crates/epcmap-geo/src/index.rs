use epcmap_core::models::{GeoBounds, LngLat, RenderedFeature};
use rstar::{RTree, RTreeObject, AABB};

/// Building footprint stored in the index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFootprint {
    /// Topographic feature id
    pub id: String,

    /// Render layer the footprint is drawn in
    pub layer: String,

    /// Exterior ring
    pub footprint: Vec<LngLat>,

    envelope: AABB<[f64; 2]>,
}

impl IndexedFootprint {
    pub fn new(id: impl Into<String>, layer: impl Into<String>, footprint: Vec<LngLat>) -> Self {
        let envelope = Self::compute_envelope(&footprint);
        Self { id: id.into(), layer: layer.into(), footprint, envelope }
    }

    fn compute_envelope(footprint: &[LngLat]) -> AABB<[f64; 2]> {
        match footprint.first() {
            Some(first) => {
                let (min, max) = footprint.iter().skip(1).fold(
                    ([first.lng, first.lat], [first.lng, first.lat]),
                    |(min, max), p| {
                        ([min[0].min(p.lng), min[1].min(p.lat)], [max[0].max(p.lng), max[1].max(p.lat)])
                    },
                );
                AABB::from_corners(min, max)
            }
            // Empty footprints collapse to the origin and are only found by
            // queries covering (0, 0).
            None => AABB::from_point([0.0, 0.0]),
        }
    }

    pub fn to_rendered(&self) -> RenderedFeature {
        RenderedFeature {
            id: self.id.clone(),
            layer: self.layer.clone(),
            footprint: self.footprint.clone(),
        }
    }
}

impl RTreeObject for IndexedFootprint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over building footprints
#[derive(Default)]
pub struct FootprintIndex {
    tree: RTree<IndexedFootprint>,
}

impl std::fmt::Debug for FootprintIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FootprintIndex").field("size", &self.tree.size()).finish()
    }
}

impl FootprintIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load an index from footprints
    pub fn from_footprints(footprints: Vec<IndexedFootprint>) -> Self {
        Self { tree: RTree::bulk_load(footprints) }
    }

    pub fn insert(&mut self, footprint: IndexedFootprint) {
        self.tree.insert(footprint);
    }

    /// Remove every footprint with the given id, returning how many were removed
    pub fn remove(&mut self, id: &str) -> usize {
        let to_remove: Vec<IndexedFootprint> =
            self.tree.iter().filter(|f| f.id == id).cloned().collect();
        for footprint in &to_remove {
            self.tree.remove(footprint);
        }
        to_remove.len()
    }

    /// Footprints whose envelope intersects the bounds
    pub fn query_bounds(&self, bounds: &GeoBounds) -> Vec<&IndexedFootprint> {
        let envelope = AABB::from_corners(
            [bounds.south_west.lng, bounds.south_west.lat],
            [bounds.north_east.lng, bounds.north_east.lat],
        );
        self.tree.locate_in_envelope_intersecting(&envelope).collect()
    }

    /// Footprints with the given id
    pub fn find(&self, id: &str) -> Vec<&IndexedFootprint> {
        self.tree.iter().filter(|f| f.id == id).collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
