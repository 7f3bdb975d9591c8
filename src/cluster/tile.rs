//! Vector-tile extraction.
//!
//! A tile lists every cluster and point whose position falls inside the
//! tile, inflated by the cluster radius so markers straddling an edge show
//! up in both neighbors. Geometry is expressed in tile-local pixels
//! (`0..extent`), rounded to the nearest integer.

use super::Supercluster;
use super::record::{ClusterRecord, Level, RecordKind};
use crate::aggregate::Aggregator;
use geojson::JsonObject;
use geojson::feature::Id;
use serde::Serialize;

/// Geometry type tag for point features.
pub const POINT_FEATURE: u8 = 1;

/// Features of a single `(z, x, y)` tile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tile {
    pub features: Vec<TileFeature>,
}

/// A point or cluster in tile-local pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileFeature {
    #[serde(rename = "type")]
    pub kind: u8,
    /// A single `[x, y]` pixel position.
    pub geometry: Vec<[i64; 2]>,
    /// Cluster properties, or the properties of the input feature.
    pub tags: Option<JsonObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
}

impl<A: Aggregator> Supercluster<A> {
    /// Clusters and points of tile `(z, x, y)`, or `None` when it is empty.
    ///
    /// Tiles in the first and last column also pick up features just across
    /// the antimeridian, shifted by one tile width.
    ///
    /// Tile numbering covers the unit square, so planar input is expected
    /// in `[0, 1]` when tiles are requested.
    pub fn get_tile(&self, z: u8, x: u32, y: u32) -> Option<Tile> {
        let level = self.level(self.limit_zoom(z as f64))?;

        let z2 = 2f64.powi(z as i32);
        let p = self.config.radius / self.config.extent as f64;
        let (tx, ty) = (x as f64, y as f64);
        let top = (ty - p) / z2;
        let bottom = (ty + 1.0 + p) / z2;

        let mut tile = Tile::default();

        let ids = level.index.range((tx - p) / z2, top, (tx + 1.0 + p) / z2, bottom);
        self.add_tile_features(&mut tile, level, ids, tx, ty, z2);

        if x == 0 {
            let ids = level.index.range(1.0 - p / z2, top, 1.0, bottom);
            self.add_tile_features(&mut tile, level, ids, z2, ty, z2);
        }
        if tx == z2 - 1.0 {
            let ids = level.index.range(0.0, top, p / z2, bottom);
            self.add_tile_features(&mut tile, level, ids, -1.0, ty, z2);
        }

        if tile.features.is_empty() {
            None
        } else {
            Some(tile)
        }
    }

    fn add_tile_features(
        &self,
        tile: &mut Tile,
        level: &Level<A::Value>,
        ids: Vec<usize>,
        x: f64,
        y: f64,
        z2: f64,
    ) {
        let extent = self.config.extent as f64;

        for i in ids {
            let record = &level.records[i];
            let (tags, id) = self.tile_tags(record);
            tile.features.push(TileFeature {
                kind: POINT_FEATURE,
                geometry: vec![[
                    (extent * (record.x * z2 - x)).round() as i64,
                    (extent * (record.y * z2 - y)).round() as i64,
                ]],
                tags,
                id,
            });
        }
    }

    fn tile_tags(&self, record: &ClusterRecord<A::Value>) -> (Option<JsonObject>, Option<Id>) {
        match record.kind {
            RecordKind::Cluster { id } => (
                Some(self.cluster_properties(record, id)),
                Some(Id::Number(id.raw().into())),
            ),
            RecordKind::Point { source } => {
                let feature = &self.features[source];
                let id = if self.config.generate_id {
                    Some(Id::Number((source as u64).into()))
                } else {
                    feature.id.clone()
                };
                (feature.properties.clone(), id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use geojson::{Feature, Geometry, Value};
    use serde_json::json;

    fn feature(lng: f64, lat: f64, id: Option<&str>) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![lng, lat]))),
            id: id.map(|s| Id::String(s.to_string())),
            properties: json!({ "lng": lng }).as_object().cloned(),
            foreign_members: None,
        }
    }

    #[test]
    fn test_empty_tile_is_none() {
        let mut index = Supercluster::new(Config::default()).unwrap();
        assert!(index.get_tile(0, 0, 0).is_none());

        index.load(vec![feature(10.0, 10.0, None)]);
        // Bottom-left tile at z2, far from the point
        assert!(index.get_tile(2, 0, 3).is_none());
    }

    #[test]
    fn test_pixel_coordinates() {
        let mut index = Supercluster::new(Config::default()).unwrap();
        index.load(vec![feature(0.0, 0.0, None)]);

        let tile = index.get_tile(0, 0, 0).unwrap();
        assert_eq!(tile.features.len(), 1);
        assert_eq!(tile.features[0].geometry, vec![[256, 256]]);
        assert_eq!(tile.features[0].kind, POINT_FEATURE);

        // Same point is the top-left corner of tile (1, 1, 1)
        let tile = index.get_tile(1, 1, 1).unwrap();
        assert_eq!(tile.features[0].geometry, vec![[0, 0]]);
    }

    #[test]
    fn test_point_ids() {
        let features = vec![feature(-60.0, 10.0, Some("a")), feature(60.0, 10.0, None)];

        let mut index = Supercluster::new(Config::default()).unwrap();
        index.load(features.clone());
        let tile = index.get_tile(0, 0, 0).unwrap();
        let mut ids: Vec<_> = tile.features.iter().map(|f| f.id.clone()).collect();
        ids.sort_by_key(|id| id.is_none());
        assert_eq!(ids, vec![Some(Id::String("a".to_string())), None]);

        let config = Config::default().with_generate_id(true);
        let mut index = Supercluster::new(config).unwrap();
        index.load(features);
        let tile = index.get_tile(0, 0, 0).unwrap();
        for f in &tile.features {
            let lng = f.tags.as_ref().and_then(|t| t.get("lng")).and_then(|v| v.as_f64());
            let expected = if lng == Some(-60.0) { 0u64 } else { 1u64 };
            assert_eq!(f.id, Some(Id::Number(expected.into())));
        }
    }

    #[test]
    fn test_cluster_tags() {
        let mut index = Supercluster::new(Config::default()).unwrap();
        index.load(vec![
            feature(20.0, 20.0, None),
            feature(20.5, 20.5, None),
            feature(21.0, 20.0, None),
        ]);

        let tile = index.get_tile(0, 0, 0).unwrap();
        assert_eq!(tile.features.len(), 1);
        let tags = tile.features[0].tags.as_ref().unwrap();
        assert_eq!(tags.get("cluster"), Some(&json!(true)));
        assert_eq!(tags.get("point_count"), Some(&json!(3)));
        assert_eq!(
            tile.features[0].id,
            tags.get("cluster_id")
                .and_then(|v| v.as_u64())
                .map(|raw| Id::Number(raw.into()))
        );
    }

    #[test]
    fn test_antimeridian_wrap() {
        let mut index = Supercluster::new(Config::default()).unwrap();
        index.load(vec![feature(179.9, 0.0, None)]);

        // Eastern edge point shows up, shifted left, in the western edge tile
        let west = index.get_tile(2, 0, 1).unwrap();
        assert_eq!(west.features.len(), 1);
        assert!(west.features[0].geometry[0][0] < 0);

        let east = index.get_tile(2, 3, 1).unwrap();
        assert_eq!(east.features.len(), 1);
        assert!(east.features[0].geometry[0][0] > 500);
    }

    #[test]
    fn test_serializes_like_geojson_vt() {
        let mut index = Supercluster::new(Config::default()).unwrap();
        index.load(vec![feature(0.0, 0.0, Some("p"))]);

        let tile = index.get_tile(0, 0, 0).unwrap();
        let value = serde_json::to_value(&tile).unwrap();
        assert_eq!(
            value,
            json!({
                "features": [{
                    "type": 1,
                    "geometry": [[256, 256]],
                    "tags": { "lng": 0.0 },
                    "id": "p"
                }]
            })
        );
    }
}
