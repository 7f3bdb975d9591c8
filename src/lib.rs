//! Hierarchical point clustering for interactive maps.
//!
//! Points are clustered greedily on every zoom level from `max_zoom` down to
//! `min_zoom`, producing a hierarchy that can be queried by bounding box or
//! vector tile and walked from any cluster down to its input points.
//!
//! ```rust
//! use spatio_cluster::{ClusterId, Config, Supercluster};
//! use geo::Point;
//!
//! let mut index = Supercluster::new(Config::default())?;
//! index.load_points(vec![
//!     (Point::new(-0.1278, 51.5074), None),
//!     (Point::new(-0.1200, 51.5000), None),
//! ]);
//!
//! let clusters = index.get_clusters([-10.0, 40.0, 10.0, 60.0], 2.0);
//! let id = clusters[0]
//!     .property("cluster_id")
//!     .and_then(|v| v.as_u64())
//!     .map(ClusterId::from_raw)
//!     .unwrap();
//! assert_eq!(index.get_leaves(id, 10, 0)?.len(), 2);
//! # Ok::<(), spatio_cluster::ClusterError>(())
//! ```

pub mod aggregate;
pub mod builder;
pub mod cluster;
pub mod compute;
pub mod config;
pub mod error;
pub mod observer;

pub use aggregate::{Aggregator, MapReduce, NoAggregation};
pub use builder::ClusterBuilder;
pub use cluster::{ClusterId, Supercluster, Tile, TileFeature};
pub use config::Config;
pub use error::{ClusterError, Result};
pub use observer::{LoadObserver, LogObserver};

pub use compute::projection::{Projection, lat_y, lng_x, x_lng, y_lat};

pub use geo::Point;
pub use geojson::{Feature, JsonObject};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{ClusterBuilder, ClusterError, Config, Projection, Result, Supercluster};

    pub use crate::{Aggregator, MapReduce};

    pub use crate::{ClusterId, Tile, TileFeature};

    pub use geo::Point;

    pub use geojson::{Feature, JsonObject};
}
