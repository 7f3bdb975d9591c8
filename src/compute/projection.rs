//! Spherical Mercator projection onto the unit square.
//!
//! Longitude maps to `x` in `[0, 1]` west to east and latitude maps to `y`
//! in `[0, 1]` north to south, which lines up with slippy-map tile numbering:
//! tile `(z, x, y)` covers `[x / 2^z, (x + 1) / 2^z]` horizontally.
//!
//! [`Projection::Planar`] skips the projection for points that are already
//! planar; the caller picks units such that `radius / extent` is meaningful.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How input coordinates map onto the plane the hierarchy is built in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Longitude/latitude in degrees, projected with spherical Mercator.
    #[default]
    Mercator,
    /// Coordinates used as given.
    Planar,
}

impl Projection {
    pub fn project(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Projection::Mercator => (lng_x(x), lat_y(y)),
            Projection::Planar => (x, y),
        }
    }

    pub fn unproject(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Projection::Mercator => (x_lng(x), y_lat(y)),
            Projection::Planar => (x, y),
        }
    }
}

/// Longitude in degrees to projected `x`.
#[inline]
pub fn lng_x(lng: f64) -> f64 {
    lng / 360.0 + 0.5
}

/// Latitude in degrees to projected `y`, saturating at the poles.
///
/// Latitudes beyond the Mercator limit (about ±85.0511°) clamp to `0` or `1`.
#[inline]
pub fn lat_y(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    y.clamp(0.0, 1.0)
}

/// Projected `x` back to longitude in degrees.
#[inline]
pub fn x_lng(x: f64) -> f64 {
    (x - 0.5) * 360.0
}

/// Projected `y` back to latitude in degrees.
#[inline]
pub fn y_lat(y: f64) -> f64 {
    let y2 = (180.0 - y * 360.0) * PI / 180.0;
    360.0 * y2.exp().atan() / PI - 90.0
}
