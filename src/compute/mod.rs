//! Compute layer: projection, input validation and spatial indexing.
//!
//! Everything here is independent of the cluster hierarchy itself; the
//! cluster module builds on these primitives.

pub mod projection;
pub mod spatial;
pub mod validation;

pub use projection::{Projection, lat_y, lng_x, x_lng, y_lat};
pub use spatial::ZoomIndex;
