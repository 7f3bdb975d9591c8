//! Read-only queries over a loaded hierarchy.

use super::Supercluster;
use super::id::ClusterId;
use super::record::{ClusterRecord, RecordKind};
use crate::aggregate::Aggregator;
use crate::compute::projection::{Projection, lat_y, lng_x};
use crate::error::{ClusterError, Result};
use geojson::feature::Id;
use geojson::{Feature, Geometry, JsonObject, Value};
use serde_json::Value as JsonValue;

impl<A: Aggregator> Supercluster<A> {
    /// Clusters and points inside `bbox` (`[west, south, east, north]` in degrees) at `zoom`.
    ///
    /// Longitudes wrap around the globe and latitudes are clamped, so any
    /// box is accepted. A box whose west edge lies east of its east edge
    /// crosses the antimeridian and is queried as two halves. Fractional
    /// zooms are floored and clamped to `[min_zoom, max_zoom + 1]`.
    ///
    /// With [`Projection::Planar`] the box is `[min_x, min_y, max_x, max_y]`
    /// in input units and is used as given, without wrapping or clamping.
    ///
    /// Points come back as the features they were loaded from; clusters as
    /// point features carrying `cluster`, `cluster_id`, `point_count` and
    /// `point_count_abbreviated` properties.
    pub fn get_clusters(&self, bbox: [f64; 4], zoom: f64) -> Vec<Feature> {
        if bbox.iter().any(|v| v.is_nan()) {
            return Vec::new();
        }
        let [west, south, east, north] = bbox;

        if self.config.projection == Projection::Planar {
            return self.features_in_range(west, south, east, north, zoom);
        }

        let mut min_lng = (west + 180.0).rem_euclid(360.0) - 180.0;
        let min_lat = south.clamp(-90.0, 90.0);
        let mut max_lng = if east == 180.0 {
            180.0
        } else {
            (east + 180.0).rem_euclid(360.0) - 180.0
        };
        let max_lat = north.clamp(-90.0, 90.0);

        if east - west >= 360.0 {
            min_lng = -180.0;
            max_lng = 180.0;
        } else if min_lng > max_lng {
            let mut clusters = self.get_clusters([min_lng, min_lat, 180.0, max_lat], zoom);
            clusters.extend(self.get_clusters([-180.0, min_lat, max_lng, max_lat], zoom));
            return clusters;
        }

        self.features_in_range(
            lng_x(min_lng),
            lat_y(max_lat),
            lng_x(max_lng),
            lat_y(min_lat),
            zoom,
        )
    }

    /// Features of the level for `zoom` inside a box of projected coordinates.
    fn features_in_range(
        &self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        zoom: f64,
    ) -> Vec<Feature> {
        let Some(level) = self.level(self.limit_zoom(zoom)) else {
            return Vec::new();
        };

        level
            .index
            .range(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(|i| self.record_feature(&level.records[i]))
            .collect()
    }

    /// Direct children of a cluster, one zoom level finer.
    ///
    /// # Errors
    ///
    /// [`ClusterError::ClusterNotFound`] when `cluster_id` does not name a
    /// cluster of this hierarchy.
    pub fn get_children(&self, cluster_id: ClusterId) -> Result<Vec<Feature>> {
        Ok(self
            .children(cluster_id)?
            .into_iter()
            .map(|child| self.record_feature(child))
            .collect())
    }

    /// Input features inside a cluster, depth first.
    ///
    /// Skips `offset` leaves and returns at most `limit`; whole sub-clusters
    /// before the offset are skipped by their point count without being
    /// visited. Pass `usize::MAX` as `limit` for every leaf.
    pub fn get_leaves(
        &self,
        cluster_id: ClusterId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Feature>> {
        let mut leaves = Vec::new();
        if limit == 0 {
            self.children(cluster_id)?;
            return Ok(leaves);
        }

        self.append_leaves(&mut leaves, cluster_id, limit, offset, 0)?;
        Ok(leaves)
    }

    /// Zoom at which a cluster first splits into more than one child.
    ///
    /// Never exceeds `max_zoom`.
    pub fn get_cluster_expansion_zoom(&self, cluster_id: ClusterId) -> Result<u8> {
        let mut zoom = cluster_id
            .zoom()
            .ok_or(ClusterError::ClusterNotFound(cluster_id))?;
        let mut current = cluster_id;

        loop {
            let children = self.children(current)?;
            if zoom >= self.config.max_zoom {
                break;
            }
            zoom += 1;

            match children.as_slice() {
                [only] => match only.id() {
                    Some(child) => current = child,
                    None => break,
                },
                _ => break,
            }
        }

        Ok(zoom)
    }

    /// Records whose parent is `cluster_id`.
    fn children(&self, cluster_id: ClusterId) -> Result<Vec<&ClusterRecord<A::Value>>> {
        let not_found = || ClusterError::ClusterNotFound(cluster_id);

        let zoom = cluster_id.zoom().ok_or_else(not_found)?;
        let level = self.level(cluster_id.origin_zoom()).ok_or_else(not_found)?;
        let origin = level
            .records
            .get(cluster_id.origin_index())
            .ok_or_else(not_found)?;

        let radius = self.config.zoom_radius(zoom);
        let children: Vec<_> = level
            .index
            .within(origin.x, origin.y, radius)
            .into_iter()
            .map(|i| &level.records[i])
            .filter(|record| record.parent_id == Some(cluster_id))
            .collect();

        if children.is_empty() {
            return Err(not_found());
        }
        Ok(children)
    }

    fn append_leaves(
        &self,
        leaves: &mut Vec<Feature>,
        cluster_id: ClusterId,
        limit: usize,
        offset: usize,
        mut skipped: usize,
    ) -> Result<usize> {
        for child in self.children(cluster_id)? {
            match child.id() {
                Some(_) if skipped + child.num_points <= offset => {
                    skipped += child.num_points;
                }
                Some(id) => {
                    skipped = self.append_leaves(leaves, id, limit, offset, skipped)?;
                }
                None if skipped < offset => skipped += 1,
                None => leaves.push(self.record_feature(child)),
            }

            if leaves.len() == limit {
                break;
            }
        }

        Ok(skipped)
    }

    /// The loaded feature for a point, a synthesized feature for a cluster.
    pub(crate) fn record_feature(&self, record: &ClusterRecord<A::Value>) -> Feature {
        match record.kind {
            RecordKind::Cluster { id } => {
                let (x, y) = self.config.projection.unproject(record.x, record.y);
                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::Point(vec![x, y]))),
                    id: Some(Id::Number(id.raw().into())),
                    properties: Some(self.cluster_properties(record, id)),
                    foreign_members: None,
                }
            }
            RecordKind::Point { source } => self.features[source].clone(),
        }
    }

    pub(crate) fn cluster_properties(
        &self,
        record: &ClusterRecord<A::Value>,
        id: ClusterId,
    ) -> JsonObject {
        let mut properties = match (&self.aggregator, &record.aggregate) {
            (Some(agg), Some(value)) => agg.properties(value),
            _ => JsonObject::new(),
        };

        properties.insert("cluster".to_string(), JsonValue::Bool(true));
        properties.insert("cluster_id".to_string(), id.raw().into());
        properties.insert("point_count".to_string(), record.num_points.into());
        properties.insert(
            "point_count_abbreviated".to_string(),
            abbreviate(record.num_points),
        );
        properties
    }
}

/// Short label for a point count: `"12k"`, `"1.2k"` or the plain number.
pub(crate) fn abbreviate(count: usize) -> JsonValue {
    if count >= 10_000 {
        JsonValue::String(format!("{}k", (count as f64 / 1000.0).round()))
    } else if count >= 1000 {
        JsonValue::String(format!("{}k", (count as f64 / 100.0).round() / 10.0))
    } else {
        count.into()
    }
}
