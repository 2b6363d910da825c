//! Configuration and result types for geoscan

use crate::error::{GeoScanError, Result};
use crate::precision::MAX_PRECISION_BITS;
use crate::spatial::{DistanceMetric, Point};
use serde::{Deserialize, Serialize};

/// Geohash length used when keying stored records.
pub const DEFAULT_GEOHASH_PRECISION: usize = 10;

/// Longest geohash the encoder produces.
pub const MAX_GEOHASH_PRECISION: usize = 12;

/// Search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cap on geohash bits per dimension when sizing query cells
    pub max_precision_bits: u32,

    /// Number of geohash characters in a stored record's key
    pub record_geohash_precision: usize,

    /// Factor applied to the radius when planning ranges (never when filtering)
    pub radius_margin: f64,

    /// Metric used to compare records against the radius
    pub distance_metric: DistanceMetric,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_precision_bits: MAX_PRECISION_BITS,
            record_geohash_precision: DEFAULT_GEOHASH_PRECISION,
            radius_margin: 1.01,
            distance_metric: DistanceMetric::default(),
        }
    }
}

impl Config {
    /// Default configuration with a custom record geohash precision.
    pub fn with_geohash_precision(precision: usize) -> Self {
        Self {
            record_geohash_precision: precision,
            ..Self::default()
        }
    }

    pub fn with_max_precision_bits(mut self, bits: u32) -> Self {
        self.max_precision_bits = bits;
        self
    }

    pub fn with_radius_margin(mut self, margin: f64) -> Self {
        self.radius_margin = margin;
        self
    }

    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    /// Reject settings that would produce empty or non-covering plans.
    pub fn validate(&self) -> Result<()> {
        if self.max_precision_bits == 0 {
            return Err(GeoScanError::InvalidConfig(
                "max_precision_bits must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_GEOHASH_PRECISION).contains(&self.record_geohash_precision) {
            return Err(GeoScanError::InvalidConfig(format!(
                "record_geohash_precision must be between 1 and {MAX_GEOHASH_PRECISION}, got {}",
                self.record_geohash_precision
            )));
        }
        if !self.radius_margin.is_finite() || self.radius_margin < 1.0 {
            return Err(GeoScanError::InvalidConfig(format!(
                "radius_margin must be a finite value >= 1, got {}",
                self.radius_margin
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geoscan::{Config, DistanceMetric};
    ///
    /// let config = Config::from_json_str(r#"{"distance_metric": "geodesic"}"#)?;
    /// assert_eq!(config.distance_metric, DistanceMetric::Geodesic);
    /// assert_eq!(config.max_precision_bits, 22);
    /// # Ok::<(), geoscan::GeoScanError>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML configuration. Missing fields take defaults.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}

/// A record that passed the radius filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<R> {
    /// Sort key of the record in the source
    pub key: String,
    /// Location of the record
    pub point: Point,
    /// Distance from the query center in meters
    pub distance: f64,
    /// The record itself
    pub record: R,
}
