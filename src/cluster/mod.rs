//! Hierarchical greedy clustering of geographic points.
//!
//! [`Supercluster::load`] builds one level per zoom, from `max_zoom` down to
//! `min_zoom`. Each pass walks the records of the finer level in order; a
//! record that has not been claimed yet claims every unclaimed neighbor
//! within the merge radius of that zoom and the group becomes a new cluster
//! at the weighted centroid. A record without neighbors moves to the coarser
//! level unchanged.
//!
//! The partition is greedy and depends on input order: earlier points claim
//! their neighbors first, and a claimed record is never claimed again.
//!
//! # Thread Safety
//!
//! After `load` returns the hierarchy is read-only, so any number of
//! threads may query a shared `&Supercluster`. `load` takes `&mut self`
//! and replaces every level, so it can never race queries or itself.

pub mod id;
mod query;
pub(crate) mod record;
mod tile;

pub use id::ClusterId;
pub use tile::{Tile, TileFeature};

use crate::aggregate::{Aggregator, NoAggregation};
use crate::builder::ClusterBuilder;
use crate::compute::validation::feature_point;
use crate::config::Config;
use crate::error::Result;
use crate::observer::LoadObserver;
use geojson::{Feature, Geometry, JsonObject, Value};
use record::{ClusterRecord, Level};
use std::time::Instant;

/// Multi-resolution point cluster index.
///
/// # Examples
///
/// ```rust
/// use spatio_cluster::{Config, Supercluster};
/// use geo::Point;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut index = Supercluster::new(Config::default().with_max_zoom(10))?;
/// index.load_points(vec![
///     (Point::new(-74.0060, 40.7128), None),
///     (Point::new(-74.0050, 40.7130), None),
///     (Point::new(2.3522, 48.8566), None),
/// ]);
///
/// // At zoom 0 the two New York points collapse into one cluster
/// let world = index.get_clusters([-180.0, -90.0, 180.0, 90.0], 0.0);
/// assert_eq!(world.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct Supercluster<A: Aggregator = NoAggregation> {
    pub(crate) config: Config,
    pub(crate) aggregator: Option<A>,
    pub(crate) observer: Option<Box<dyn LoadObserver>>,
    pub(crate) features: Vec<Feature>,
    /// Indexed by zoom, `max_zoom + 2` entries once loaded.
    pub(crate) levels: Vec<Level<A::Value>>,
}

impl Supercluster {
    /// Create an index without property aggregation.
    pub fn new(config: Config) -> Result<Self> {
        ClusterBuilder::new().config(config).build()
    }

    pub fn builder() -> ClusterBuilder {
        ClusterBuilder::new()
    }
}

impl<A: Aggregator> Supercluster<A> {
    pub(crate) fn from_parts(
        config: Config,
        aggregator: Option<A>,
        observer: Option<Box<dyn LoadObserver>>,
    ) -> Self {
        Self {
            config,
            aggregator,
            observer,
            features: Vec::new(),
            levels: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of points taking part in clustering.
    pub fn len(&self) -> usize {
        self.levels.last().map_or(0, Level::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of records (clusters and lone points) at `zoom`.
    pub fn cluster_count(&self, zoom: u8) -> usize {
        self.level(self.limit_zoom(zoom as f64))
            .map_or(0, Level::len)
    }

    /// Build the cluster hierarchy for `features`, replacing any previous load.
    ///
    /// Features without a point geometry, with non-finite coordinates, or
    /// (under [`Projection::Mercator`](crate::Projection)) outside the valid
    /// longitude/latitude range, are logged and left out of the hierarchy. They keep their slot in the retained feature list.
    pub fn load(&mut self, features: Vec<Feature>) -> &mut Self {
        let total = Instant::now();
        let prepare = Instant::now();

        let projection = self.config.projection;
        let mut records = Vec::with_capacity(features.len());
        for (i, feature) in features.iter().enumerate() {
            match feature_point(feature, projection) {
                Ok(point) => {
                    let (x, y) = projection.project(point.x(), point.y());
                    let aggregate = self
                        .aggregator
                        .as_ref()
                        .map(|agg| agg.map(feature.properties.as_ref()));
                    records.push(ClusterRecord::point(x, y, i, aggregate));
                }
                Err(e) => log::warn!("skipping feature {}: {}", i, e),
            }
        }
        self.features = features;

        if let Some(observer) = &self.observer {
            observer.on_prepare(records.len(), prepare.elapsed());
        }

        let (min_zoom, max_zoom) = (self.config.min_zoom, self.config.max_zoom);
        let mut levels: Vec<Level<A::Value>> =
            (0..=max_zoom as usize + 1).map(|_| Level::default()).collect();
        levels[max_zoom as usize + 1] = Level::new(records);

        for zoom in (min_zoom..=max_zoom).rev() {
            let now = Instant::now();

            let clusters = self.cluster_level(&mut levels[zoom as usize + 1], zoom);
            levels[zoom as usize] = Level::new(clusters);

            let count = levels[zoom as usize].len();
            log::debug!("z{}: {} clusters", zoom, count);
            if let Some(observer) = &self.observer {
                observer.on_zoom(zoom, count, now.elapsed());
            }
        }

        self.levels = levels;

        if let Some(observer) = &self.observer {
            observer.on_complete(total.elapsed());
        }
        self
    }

    /// Wrap bare points into features and load them.
    pub fn load_points<I>(&mut self, points: I) -> &mut Self
    where
        I: IntoIterator<Item = (geo::Point, Option<JsonObject>)>,
    {
        let features = points
            .into_iter()
            .map(|(point, properties)| Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![point.x(), point.y()]))),
                id: None,
                properties,
                foreign_members: None,
            })
            .collect();
        self.load(features)
    }

    /// Cluster the records of the level one finer than `zoom`.
    ///
    /// Marks absorbed records in `finer` and returns the records for `zoom`.
    fn cluster_level(
        &self,
        finer: &mut Level<A::Value>,
        zoom: u8,
    ) -> Vec<ClusterRecord<A::Value>> {
        let radius = self.config.zoom_radius(zoom);
        let Level { records, index } = finer;
        let mut clusters = Vec::new();

        for i in 0..records.len() {
            if records[i].zoom <= zoom {
                continue;
            }
            records[i].zoom = zoom;

            let (x, y) = (records[i].x, records[i].y);
            let mut num_points = records[i].num_points;
            let mut wx = x * num_points as f64;
            let mut wy = y * num_points as f64;

            let id = ClusterId::new(i, zoom);
            let mut aggregate = self.aggregator.as_ref().map(|agg| {
                let mut acc = agg.initial();
                if let Some(value) = &records[i].aggregate {
                    agg.reduce(&mut acc, value);
                }
                acc
            });

            let mut merged = false;
            for n in index.within(x, y, radius) {
                let neighbor = &mut records[n];
                if neighbor.zoom <= zoom {
                    continue;
                }
                neighbor.zoom = zoom;
                neighbor.parent_id = Some(id);
                merged = true;

                let weight = neighbor.num_points as f64;
                wx += neighbor.x * weight;
                wy += neighbor.y * weight;
                num_points += neighbor.num_points;

                if let (Some(agg), Some(acc), Some(value)) = (
                    self.aggregator.as_ref(),
                    aggregate.as_mut(),
                    neighbor.aggregate.as_ref(),
                ) {
                    agg.reduce(acc, value);
                }
            }

            if merged {
                records[i].parent_id = Some(id);
                clusters.push(ClusterRecord::cluster(
                    wx / num_points as f64,
                    wy / num_points as f64,
                    id,
                    num_points,
                    aggregate,
                ));
            } else {
                clusters.push(records[i].clone());
            }
        }

        clusters
    }

    pub(crate) fn level(&self, zoom: u8) -> Option<&Level<A::Value>> {
        self.levels.get(zoom as usize)
    }

    /// Floor `zoom` and clamp it to `[min_zoom, max_zoom + 1]`.
    pub(crate) fn limit_zoom(&self, zoom: f64) -> u8 {
        let (min, max) = (self.config.min_zoom, self.config.max_zoom + 1);
        if zoom.is_nan() {
            return min;
        }
        zoom.floor().clamp(min as f64, max as f64) as u8
    }
}

impl<A: Aggregator> std::fmt::Debug for Supercluster<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supercluster")
            .field("config", &self.config)
            .field("aggregation", &self.aggregator.is_some())
            .field("points", &self.len())
            .field("levels", &self.levels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::record::RecordKind;
    use super::*;
    use crate::aggregate::MapReduce;
    use crate::compute::projection::{Projection, lng_x};
    use serde_json::json;

    fn point(lng: f64, lat: f64) -> (geo::Point, Option<JsonObject>) {
        (geo::Point::new(lng, lat), None)
    }

    fn total_points<V>(level: &Level<V>) -> usize {
        level.records.iter().map(|r| r.num_points).sum()
    }

    #[test]
    fn test_empty_load() {
        let mut index = Supercluster::new(Config::default()).unwrap();
        index.load(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.levels.len(), 18);
        assert!(index.levels.iter().all(|l| l.records.is_empty()));
    }

    #[test]
    fn test_coincident_points_collapse() {
        let config = Config::default().with_max_zoom(4).with_radius(1.0);
        let mut index = Supercluster::new(config).unwrap();
        index.load_points(vec![point(10.0, 10.0), point(10.0, 10.0)]);

        let top = &index.levels[4];
        assert_eq!(top.records.len(), 1);
        assert!(top.records[0].is_cluster());
        assert_eq!(top.records[0].num_points, 2);

        let raw = &index.levels[5];
        let id = top.records[0].id();
        assert!(raw.records.iter().all(|r| r.parent_id == id && r.zoom == 4));
    }

    #[test]
    fn test_point_count_preserved_per_level() {
        let points: Vec<_> = (0..200)
            .map(|i| point(-20.0 + (i % 20) as f64 * 2.0, -10.0 + (i / 20) as f64 * 2.0))
            .collect();

        let mut index = Supercluster::new(Config::default().with_max_zoom(8)).unwrap();
        index.load_points(points);

        assert_eq!(index.len(), 200);
        for zoom in 0..=9 {
            assert_eq!(total_points(&index.levels[zoom]), 200, "zoom {zoom}");
        }
        // Coarser levels never hold more records than finer ones
        for zoom in 0..9 {
            assert!(index.levels[zoom].len() <= index.levels[zoom + 1].len());
        }
    }

    #[test]
    fn test_weighted_centroid() {
        let config = Config::default().with_max_zoom(0).with_radius(100.0);
        let mut index = Supercluster::new(config).unwrap();
        index.load_points(vec![point(0.0, 0.0), point(0.0, 0.0), point(3.0, 0.0)]);

        let top = &index.levels[0];
        assert_eq!(top.records.len(), 1);
        let cluster = &top.records[0];
        assert_eq!(cluster.num_points, 3);
        assert!((cluster.x - lng_x(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_lone_record_survives_unchanged() {
        let config = Config::default().with_max_zoom(2);
        let mut index = Supercluster::new(config).unwrap();
        index.load_points(vec![point(-100.0, 40.0), point(100.0, -40.0)]);

        for zoom in 0..=3 {
            assert_eq!(index.levels[zoom].len(), 2);
            assert!(index.levels[zoom].records.iter().all(|r| !r.is_cluster()));
        }
    }

    #[test]
    fn test_min_zoom_leaves_coarser_levels_empty() {
        let config = Config::default().with_min_zoom(3).with_max_zoom(5);
        let mut index = Supercluster::new(config).unwrap();
        index.load_points(vec![point(1.0, 1.0), point(1.0001, 1.0)]);

        assert!(index.levels[0].records.is_empty());
        assert!(index.levels[2].records.is_empty());
        assert_eq!(total_points(&index.levels[3]), 2);
    }

    #[test]
    fn test_invalid_features_skipped() {
        let mut index = Supercluster::new(Config::default()).unwrap();
        let mut features = vec![Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: None,
            foreign_members: None,
        }];
        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![5.0, 5.0]))),
            id: None,
            properties: None,
            foreign_members: None,
        });
        index.load(features);

        assert_eq!(index.len(), 1);
        assert_eq!(index.features.len(), 2);
        assert_eq!(
            index.levels[17].records[0].kind,
            RecordKind::Point { source: 1 }
        );
    }

    #[test]
    fn test_reload_replaces_hierarchy() {
        let mut index = Supercluster::new(Config::default().with_max_zoom(3)).unwrap();
        index.load_points(vec![point(0.0, 0.0), point(50.0, 50.0), point(-50.0, 10.0)]);
        assert_eq!(index.len(), 3);

        index.load_points(vec![point(0.0, 0.0)]);
        assert_eq!(index.len(), 1);
        assert_eq!(total_points(&index.levels[0]), 1);
    }

    #[test]
    fn test_aggregates_fold_through_levels() {
        let count = MapReduce::new(
            || 0u64,
            |props: Option<&JsonObject>| {
                props
                    .and_then(|p| p.get("n"))
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0)
            },
            |acc: &mut u64, v: &u64| *acc += v,
        );
        let mut index = ClusterBuilder::new()
            .config(Config::default().with_max_zoom(5))
            .aggregator(count)
            .build()
            .unwrap();

        let props = |n: u64| json!({ "n": n }).as_object().cloned();
        index.load_points((0..10).map(|i| (geo::Point::new(i as f64 * 0.001, 0.0), props(i))));

        let top = &index.levels[0];
        assert_eq!(top.records.len(), 1);
        assert_eq!(top.records[0].aggregate, Some(45));
    }

    #[test]
    fn test_planar_points_keep_their_units() {
        let config = Config::default()
            .with_projection(Projection::Planar)
            .with_max_zoom(3)
            .with_radius(0.01)
            .with_extent(1);
        let mut index = Supercluster::new(config).unwrap();
        index.load_points(vec![
            point(1000.0, 1000.0),
            point(1000.004, 1000.0),
            point(2000.0, -50.0),
        ]);

        assert_eq!(index.len(), 3);
        let raw = &index.levels[4];
        assert_eq!((raw.records[2].x, raw.records[2].y), (2000.0, -50.0));

        // 0.004 apart: separate while the radius is 0.0025, merged at 0.005
        assert_eq!(index.levels[2].len(), 3);
        let top = &index.levels[1];
        assert_eq!(top.len(), 2);
        let cluster = top.records.iter().find(|r| r.is_cluster()).unwrap();
        assert_eq!(cluster.num_points, 2);
        assert!((cluster.x - 1000.002).abs() < 1e-9);
        assert!((cluster.y - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_limit_zoom() {
        let config = Config::default().with_min_zoom(2).with_max_zoom(10);
        let index = Supercluster::new(config).unwrap();
        assert_eq!(index.limit_zoom(0.0), 2);
        assert_eq!(index.limit_zoom(5.7), 5);
        assert_eq!(index.limit_zoom(40.0), 11);
        assert_eq!(index.limit_zoom(-3.0), 2);
        assert_eq!(index.limit_zoom(f64::NAN), 2);
        assert_eq!(index.limit_zoom(f64::INFINITY), 11);
    }
}
