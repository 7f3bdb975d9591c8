//! Cluster identifiers.
//!
//! A cluster id packs the zoom level the cluster was created on together
//! with the position, one level finer, of the record that seeded it:
//!
//! ```text
//! id = (origin_index << ZOOM_BITS) | (zoom + 1)
//! ```
//!
//! The seed record sits at `zoom + 1`, which is exactly the low field, so
//! decoding locates both the seed and the children of the cluster without
//! any lookup table. The low field is never zero, which keeps cluster ids
//! apart from the plain input positions handed out with `generate_id`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bits reserved for the zoom component.
pub const ZOOM_BITS: u32 = 5;

const ZOOM_MASK: u64 = (1 << ZOOM_BITS) - 1;

/// Highest zoom a cluster can be created on; `zoom + 1` must fit the field.
pub const MAX_ZOOM: u8 = (ZOOM_MASK - 1) as u8;

/// Compact identifier of a synthesized cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Encode the cluster created on `zoom` from the record at `origin_index`.
    pub fn new(origin_index: usize, zoom: u8) -> Self {
        debug_assert!(zoom <= MAX_ZOOM, "zoom {zoom} exceeds id capacity");
        Self(((origin_index as u64) << ZOOM_BITS) | (zoom as u64 + 1))
    }

    /// Wrap a raw value, e.g. one read back from a feature's `cluster_id`.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Position of the seed record within level `origin_zoom()`.
    pub fn origin_index(self) -> usize {
        (self.0 >> ZOOM_BITS) as usize
    }

    /// Level holding the seed record and the children, i.e. `zoom() + 1`.
    ///
    /// Zero for raw values that were never produced by [`ClusterId::new`].
    pub fn origin_zoom(self) -> u8 {
        (self.0 & ZOOM_MASK) as u8
    }

    /// Zoom level the cluster was created on.
    pub fn zoom(self) -> Option<u8> {
        self.origin_zoom().checked_sub(1)
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ClusterId> for u64 {
    fn from(id: ClusterId) -> Self {
        id.0
    }
}
