pub mod index;

pub use index::{IndexedPosition, ZoomIndex};
