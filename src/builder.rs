//! Index builder for flexible configuration
//!
//! This module provides a builder pattern for creating a [`Supercluster`]
//! with options, a property aggregator and a load observer.

use crate::aggregate::{Aggregator, NoAggregation};
use crate::cluster::Supercluster;
use crate::compute::projection::Projection;
use crate::config::Config;
use crate::error::Result;
use crate::observer::{LoadObserver, LogObserver};

/// Builder for cluster index configuration, aggregation and observation.
pub struct ClusterBuilder<A: Aggregator = NoAggregation> {
    config: Config,
    aggregator: Option<A>,
    observer: Option<Box<dyn LoadObserver>>,
}

impl ClusterBuilder {
    /// Create a new builder with default configuration and no aggregation.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            aggregator: None,
            observer: None,
        }
    }
}

impl<A: Aggregator> ClusterBuilder<A> {
    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn min_zoom(mut self, zoom: u8) -> Self {
        self.config.min_zoom = zoom;
        self
    }

    pub fn max_zoom(mut self, zoom: u8) -> Self {
        self.config.max_zoom = zoom;
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.config.radius = radius;
        self
    }

    pub fn extent(mut self, extent: u32) -> Self {
        self.config.extent = extent;
        self
    }

    pub fn generate_id(mut self, generate_id: bool) -> Self {
        self.config.generate_id = generate_id;
        self
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.config.projection = projection;
        self
    }

    /// Fold point properties into every cluster with `aggregator`.
    pub fn aggregator<B: Aggregator>(self, aggregator: B) -> ClusterBuilder<B> {
        ClusterBuilder {
            config: self.config,
            aggregator: Some(aggregator),
            observer: self.observer,
        }
    }

    /// Receive load timings; takes precedence over `Config::log`.
    pub fn observer(mut self, observer: impl LoadObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Validate the configuration and create an empty index.
    pub fn build(self) -> Result<Supercluster<A>> {
        self.config.validate()?;

        let observer = match self.observer {
            Some(observer) => Some(observer),
            None if self.config.log => Some(Box::new(LogObserver) as Box<dyn LoadObserver>),
            None => None,
        };

        Ok(Supercluster::from_parts(
            self.config,
            self.aggregator,
            observer,
        ))
    }
}

impl Default for ClusterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MapReduce;
    use crate::error::ClusterError;
    use geojson::JsonObject;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct CountingObserver {
        zooms: Arc<AtomicUsize>,
        completed: Arc<AtomicUsize>,
    }

    impl LoadObserver for CountingObserver {
        fn on_zoom(&self, _zoom: u8, _clusters: usize, _elapsed: Duration) {
            self.zooms.fetch_add(1, Ordering::SeqCst);
        }

        fn on_complete(&self, _elapsed: Duration) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_builder_default() {
        let index = ClusterBuilder::new().build().unwrap();
        assert_eq!(index.config(), &Config::default());
        assert!(index.observer.is_none());
        assert!(index.aggregator.is_none());
    }

    #[test]
    fn test_builder_options() {
        let index = ClusterBuilder::new()
            .min_zoom(2)
            .max_zoom(12)
            .radius(60.0)
            .extent(256)
            .generate_id(true)
            .projection(Projection::Planar)
            .build()
            .unwrap();

        let config = index.config();
        assert_eq!(config.min_zoom, 2);
        assert_eq!(config.max_zoom, 12);
        assert_eq!(config.radius, 60.0);
        assert_eq!(config.extent, 256);
        assert!(config.generate_id);
        assert_eq!(config.projection, Projection::Planar);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let err = ClusterBuilder::new().max_zoom(31).build().unwrap_err();
        assert!(matches!(err, ClusterError::InvalidConfig(_)));

        assert!(ClusterBuilder::new().radius(-1.0).build().is_err());
    }

    #[test]
    fn test_log_config_installs_observer() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut index = ClusterBuilder::new()
            .config(Config::default().with_log(true).with_max_zoom(3))
            .build()
            .unwrap();
        assert!(index.observer.is_some());

        index.load_points(vec![(geo::Point::new(1.0, 1.0), None)]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_custom_observer() {
        let observer = CountingObserver::default();
        let mut index = ClusterBuilder::new()
            .min_zoom(1)
            .max_zoom(5)
            .observer(observer.clone())
            .build()
            .unwrap();

        index.load_points(vec![(geo::Point::new(1.0, 1.0), None)]);
        assert_eq!(observer.zooms.load(Ordering::SeqCst), 5);
        assert_eq!(observer.completed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_aggregator_keeps_options() {
        let index = ClusterBuilder::new()
            .max_zoom(7)
            .aggregator(MapReduce::new(
                || 0u32,
                |_: Option<&JsonObject>| 1u32,
                |a: &mut u32, b: &u32| *a += b,
            ))
            .radius(80.0)
            .build()
            .unwrap();

        assert_eq!(index.config().max_zoom, 7);
        assert_eq!(index.config().radius, 80.0);
        assert!(index.aggregator.is_some());
    }
}
