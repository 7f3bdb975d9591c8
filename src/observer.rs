//! Load progress callbacks.
//!
//! The engine never prints on its own. An observer receives timing for each
//! stage of [`Supercluster::load`](crate::Supercluster::load); none is
//! installed unless the builder is given one or `Config::log` is set.

use std::time::Duration;

/// Receives timing information while a hierarchy is built.
pub trait LoadObserver: Send + Sync {
    /// Input features were projected into point records.
    fn on_prepare(&self, _points: usize, _elapsed: Duration) {}

    /// Level `zoom` was clustered into `clusters` records.
    fn on_zoom(&self, _zoom: u8, _clusters: usize, _elapsed: Duration) {}

    /// The whole hierarchy is ready.
    fn on_complete(&self, _elapsed: Duration) {}
}

/// Reports load timings through `log::info!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl LoadObserver for LogObserver {
    fn on_prepare(&self, points: usize, elapsed: Duration) {
        log::info!("prepare {} points: {:?}", points, elapsed);
    }

    fn on_zoom(&self, zoom: u8, clusters: usize, elapsed: Duration) {
        log::info!("z{}: {} clusters in {:?}", zoom, clusters, elapsed);
    }

    fn on_complete(&self, elapsed: Duration) {
        log::info!("total time: {:?}", elapsed);
    }
}
