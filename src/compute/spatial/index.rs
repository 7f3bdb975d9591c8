//! Static per-zoom spatial index over projected cluster positions.
//!
//! Each zoom level gets one R-tree that is bulk loaded from the records of
//! that level and never modified afterwards. Entries carry only the position
//! of the record in its level, so the tree never borrows the records.
//!
//! ## Queries
//!
//! - [`ZoomIndex::range`]: axis-aligned box, boundaries inclusive
//! - [`ZoomIndex::within`]: euclidean radius, boundary inclusive
//!
//! Both return record positions in tree order, which is unspecified.

use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

/// Projected position tagged with its record position.
pub type IndexedPosition = GeomWithData<[f64; 2], usize>;

/// Bulk-loaded R-tree for a single zoom level.
#[derive(Debug, Clone)]
pub struct ZoomIndex {
    tree: RTree<IndexedPosition>,
}

impl ZoomIndex {
    /// Build the index in one pass from `(x, y)` pairs, indexed by position.
    pub fn bulk_load<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let entries: Vec<IndexedPosition> = positions
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| GeomWithData::new([x, y], i))
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Record positions inside the box `[min_x, max_x] x [min_y, max_y]`.
    ///
    /// An inverted box matches nothing.
    pub fn range(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<usize> {
        if min_x > max_x || min_y > max_y {
            return Vec::new();
        }

        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|entry| entry.data)
            .collect()
    }

    /// Record positions at euclidean distance `<= radius` from `(x, y)`.
    pub fn within(&self, x: f64, y: f64, radius: f64) -> Vec<usize> {
        self.tree
            .locate_within_distance([x, y], radius * radius)
            .map(|entry| entry.data)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for ZoomIndex {
    fn default() -> Self {
        Self { tree: RTree::new() }
    }
}
