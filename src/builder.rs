//! Search builder for flexible configuration
//!
//! This module provides a builder pattern for creating a [`GeoSearch`],
//! optionally loading its configuration from a JSON or TOML file.

use crate::error::{GeoScanError, Result};
use crate::search::GeoSearch;
use crate::spatial::DistanceMetric;
use crate::types::Config;
use std::path::{Path, PathBuf};

/// Builder for creating search instances with custom configuration.
///
/// Settings are applied in order: the base configuration (the default, one
/// passed to [`GeoSearchBuilder::config`], or one read from
/// [`GeoSearchBuilder::config_path`]), then any individual overrides. The
/// result is validated by [`GeoSearchBuilder::build`].
///
/// # Examples
///
/// ```rust
/// use geoscan::{DistanceMetric, GeoSearchBuilder};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let search = GeoSearchBuilder::new()
///     .max_precision_bits(18)
///     .distance_metric(DistanceMetric::Geodesic)
///     .build()?;
///
/// assert_eq!(search.config().max_precision_bits, 18);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct GeoSearchBuilder {
    config: Config,
    config_path: Option<PathBuf>,
    max_precision_bits: Option<u32>,
    radius_margin: Option<f64>,
    distance_metric: Option<DistanceMetric>,
}

impl GeoSearchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` as the base configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self.config_path = None;
        self
    }

    /// Read the base configuration from a file when building.
    ///
    /// Files ending in `.toml` need the `toml` feature; anything else is
    /// parsed as JSON.
    pub fn config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn max_precision_bits(mut self, bits: u32) -> Self {
        self.max_precision_bits = Some(bits);
        self
    }

    pub fn radius_margin(mut self, margin: f64) -> Self {
        self.radius_margin = Some(margin);
        self
    }

    pub fn distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = Some(metric);
        self
    }

    pub fn build(self) -> Result<GeoSearch> {
        let mut config = match &self.config_path {
            Some(path) => load_config(path)?,
            None => self.config,
        };

        if let Some(bits) = self.max_precision_bits {
            config.max_precision_bits = bits;
        }
        if let Some(margin) = self.radius_margin {
            config.radius_margin = margin;
        }
        if let Some(metric) = self.distance_metric {
            config.distance_metric = metric;
        }

        log::debug!("building search with {config:?}");
        GeoSearch::with_config(config)
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        GeoScanError::InvalidConfig(format!("cannot read {}: {err}", path.display()))
    })?;

    if path.extension().is_some_and(|ext| ext == "toml") {
        return parse_toml(&contents, path);
    }
    Config::from_json_str(&contents)
}

#[cfg(feature = "toml")]
fn parse_toml(contents: &str, _path: &Path) -> Result<Config> {
    Config::from_toml_str(contents)
}

#[cfg(not(feature = "toml"))]
fn parse_toml(_contents: &str, path: &Path) -> Result<Config> {
    Err(GeoScanError::InvalidConfig(format!(
        "{} is TOML but the `toml` feature is disabled",
        path.display()
    )))
}
