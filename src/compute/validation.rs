//! Validation of input features before they enter the cluster hierarchy.

use crate::compute::projection::Projection;
use crate::error::{ClusterError, Result};
use geo::Point;
use geojson::{Feature, Value};

/// Checks that `point` can be placed on the plane of `projection`.
///
/// Both modes need finite coordinates. Mercator input must also be a
/// longitude in `[-180, 180]` and a latitude in `[-90, 90]`.
///
/// # Examples
///
/// ```
/// use spatio_cluster::Projection;
/// use spatio_cluster::compute::validation::check_position;
/// use geo::Point;
///
/// assert!(check_position(&Point::new(-74.0060, 40.7128), Projection::Mercator).is_ok());
/// assert!(check_position(&Point::new(200.0, 40.0), Projection::Mercator).is_err());
/// assert!(check_position(&Point::new(200.0, 40.0), Projection::Planar).is_ok());
/// assert!(check_position(&Point::new(-74.0, f64::NAN), Projection::Planar).is_err());
/// ```
pub fn check_position(point: &Point, projection: Projection) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() || !y.is_finite() {
        return Err(ClusterError::InvalidInput(format!(
            "position ({}, {}) is not finite",
            x, y
        )));
    }

    if projection == Projection::Mercator {
        if x.abs() > 180.0 {
            return Err(ClusterError::InvalidInput(format!(
                "longitude {} is past the antimeridian",
                x
            )));
        }
        if y.abs() > 90.0 {
            return Err(ClusterError::InvalidInput(format!(
                "latitude {} is past the pole",
                y
            )));
        }
    }

    Ok(())
}

/// Extracts the clusterable position of a feature.
///
/// Only `Point` geometries take part in clustering.
pub fn feature_point(feature: &Feature, projection: Projection) -> Result<Point> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| ClusterError::InvalidInput("feature has no geometry".to_string()))?;

    let point = match &geometry.value {
        Value::Point(position) if position.len() >= 2 => Point::new(position[0], position[1]),
        Value::Point(position) => {
            return Err(ClusterError::InvalidInput(format!(
                "point position needs two coordinates, got {}",
                position.len()
            )));
        }
        other => {
            return Err(ClusterError::InvalidInput(format!(
                "expected a Point geometry, got {}",
                geometry_name(other)
            )));
        }
    };

    check_position(&point, projection)?;
    Ok(point)
}

fn geometry_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
