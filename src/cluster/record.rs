//! Per-zoom record arena.
//!
//! Points and clusters reference each other only through [`ClusterId`]s and
//! positions inside a level, never through pointers.

use super::id::ClusterId;
use crate::compute::spatial::ZoomIndex;

/// Zoom value of a record that has not been absorbed on any pass yet.
pub(crate) const UNPROCESSED: u8 = u8::MAX;

/// What a record stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordKind {
    /// Input feature at this position of the loaded list.
    Point { source: usize },
    /// Synthesized cluster.
    Cluster { id: ClusterId },
}

/// One raw point or synthesized cluster within a zoom level.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClusterRecord<V> {
    /// Projected position; the weighted centroid for clusters.
    pub x: f64,
    pub y: f64,
    /// Lowest zoom this record was processed on.
    pub zoom: u8,
    pub kind: RecordKind,
    pub num_points: usize,
    pub parent_id: Option<ClusterId>,
    /// Mapped properties for points, folded properties for clusters.
    pub aggregate: Option<V>,
}

impl<V> ClusterRecord<V> {
    pub fn point(x: f64, y: f64, source: usize, aggregate: Option<V>) -> Self {
        Self {
            x,
            y,
            zoom: UNPROCESSED,
            kind: RecordKind::Point { source },
            num_points: 1,
            parent_id: None,
            aggregate,
        }
    }

    pub fn cluster(
        x: f64,
        y: f64,
        id: ClusterId,
        num_points: usize,
        aggregate: Option<V>,
    ) -> Self {
        Self {
            x,
            y,
            zoom: UNPROCESSED,
            kind: RecordKind::Cluster { id },
            num_points,
            parent_id: None,
            aggregate,
        }
    }

    pub fn id(&self) -> Option<ClusterId> {
        match self.kind {
            RecordKind::Cluster { id } => Some(id),
            RecordKind::Point { .. } => None,
        }
    }

    #[cfg(test)]
    pub fn is_cluster(&self) -> bool {
        self.id().is_some()
    }
}

/// Records produced for one zoom level plus the index over them.
#[derive(Debug, Clone)]
pub(crate) struct Level<V> {
    pub records: Vec<ClusterRecord<V>>,
    pub index: ZoomIndex,
}

impl<V> Level<V> {
    pub fn new(records: Vec<ClusterRecord<V>>) -> Self {
        let index = ZoomIndex::bulk_load(records.iter().map(|r| (r.x, r.y)));
        Self { records, index }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl<V> Default for Level<V> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: ZoomIndex::default(),
        }
    }
}
