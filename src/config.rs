//! Clustering configuration.
//!
//! This module provides the serializable options that control how points
//! collapse into clusters across zoom levels.

use crate::cluster::id::MAX_ZOOM;
use crate::compute::projection::Projection;
use crate::error::{ClusterError, Result};
use serde::{Deserialize, Serialize};

/// Clustering configuration
///
/// Every field has a documented default, so a partial JSON or TOML document
/// is enough to override just the options you care about.
///
/// # Example
///
/// ```rust
/// use spatio_cluster::Config;
///
/// // Create default config
/// let config = Config::default();
/// assert_eq!(config.max_zoom, 16);
///
/// // Load from JSON
/// let json = r#"{
///     "max_zoom": 14,
///     "radius": 60.0,
///     "extent": 256
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.extent, 256);
/// assert_eq!(config.min_zoom, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Lowest zoom level clusters are generated on
    #[serde(default)]
    pub min_zoom: u8,

    /// Highest zoom level points are clustered on (at most 30)
    #[serde(default = "Config::default_max_zoom")]
    pub max_zoom: u8,

    /// Cluster radius in pixels, relative to `extent`
    #[serde(default = "Config::default_radius")]
    pub radius: f64,

    /// Tile extent in pixels the radius is measured against
    #[serde(default = "Config::default_extent")]
    pub extent: u32,

    /// Give tile point features their input position as id
    #[serde(default)]
    pub generate_id: bool,

    /// Report load timings through the `log` facade
    #[serde(default)]
    pub log: bool,

    /// `"mercator"` for longitude/latitude input, `"planar"` for plane coordinates
    #[serde(default)]
    pub projection: Projection,
}

impl Config {
    const fn default_max_zoom() -> u8 {
        16
    }

    const fn default_radius() -> f64 {
        40.0
    }

    const fn default_extent() -> u32 {
        512
    }

    pub fn with_min_zoom(mut self, zoom: u8) -> Self {
        self.min_zoom = zoom;
        self
    }

    pub fn with_max_zoom(mut self, zoom: u8) -> Self {
        self.max_zoom = zoom;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_extent(mut self, extent: u32) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_generate_id(mut self, generate_id: bool) -> Self {
        self.generate_id = generate_id;
        self
    }

    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Check the options against the limits of the engine.
    ///
    /// `max_zoom` is capped by the bits reserved for the zoom in a
    /// [`ClusterId`](crate::ClusterId); exceeding it is an error rather than a clamp.
    pub fn validate(&self) -> Result<()> {
        if self.max_zoom > MAX_ZOOM {
            return Err(ClusterError::InvalidConfig(format!(
                "max_zoom ({}) exceeds the supported maximum of {}",
                self.max_zoom, MAX_ZOOM
            )));
        }

        if self.min_zoom > self.max_zoom {
            return Err(ClusterError::InvalidConfig(format!(
                "min_zoom ({}) must be <= max_zoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }

        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ClusterError::InvalidConfig(format!(
                "radius must be finite and positive, got: {}",
                self.radius
            )));
        }

        if self.extent == 0 {
            return Err(ClusterError::InvalidConfig(
                "extent must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Merge radius in projected units at `zoom`.
    pub(crate) fn zoom_radius(&self, zoom: u8) -> f64 {
        self.radius / (self.extent as f64 * 2f64.powi(zoom as i32))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_zoom: 0,
            max_zoom: Self::default_max_zoom(),
            radius: Self::default_radius(),
            extent: Self::default_extent(),
            generate_id: false,
            log: false,
            projection: Projection::Mercator,
        }
    }
}
