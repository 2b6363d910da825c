//! Geographic points and distances.
//!
//! This module provides the coordinate type used throughout the crate and the
//! distance metrics applied when filtering records against a search radius.

use crate::error::{GeoScanError, Result};
use geo::{Distance, Geodesic, Haversine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic point representing a location on Earth's surface.
///
/// `Point` stores latitude and longitude in decimal degrees using the WGS84
/// coordinate reference system (EPSG:4326).
///
/// # Examples
///
/// ```rust
/// use geoscan::Point;
///
/// let new_york = Point::new(40.7128, -74.0060);
/// let london = Point::new(51.5074, -0.1278);
///
/// let distance_km = new_york.distance_to(&london) / 1000.0;
/// assert!(distance_km > 5_500.0 && distance_km < 5_600.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in decimal degrees (-90.0 to +90.0)
    pub lat: f64,
    /// Longitude in decimal degrees (-180.0 to +180.0)
    pub lon: f64,
}

impl Point {
    /// Creates a new point from latitude and longitude coordinates.
    ///
    /// No range checking happens here; see [`Point::validate`].
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check that both coordinates are finite and inside the WGS84 range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geoscan::Point;
    ///
    /// assert!(Point::new(90.0, -180.0).validate().is_ok());
    /// assert!(Point::new(90.5, 0.0).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let valid = self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon);
        if valid {
            Ok(())
        } else {
            Err(GeoScanError::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }

    /// Great-circle distance in meters using the Haversine formula.
    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_with(other, DistanceMetric::Haversine)
    }

    /// Distance in meters using the given metric.
    pub fn distance_with(&self, other: &Point, metric: DistanceMetric) -> f64 {
        metric.distance(self, other)
    }

    /// Check if this point lies within `radius_meters` of `center`.
    pub fn within_distance(&self, center: &Point, radius_meters: f64, metric: DistanceMetric) -> bool {
        metric.distance(center, self) <= radius_meters
    }

    /// Generate a geohash string for this point.
    ///
    /// # Arguments
    ///
    /// * `precision` - Number of characters in the geohash (1-12)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geoscan::Point;
    ///
    /// let point = Point::new(53.579461, -1.795476);
    /// assert_eq!(point.to_geohash(10)?, "gcw8z1udfr");
    /// assert_eq!(point.to_geohash(3)?, "gcw");
    /// # Ok::<(), geoscan::GeoScanError>(())
    /// ```
    pub fn to_geohash(&self, precision: usize) -> Result<String> {
        Ok(geohash::encode(
            geo::Coord {
                x: self.lon,
                y: self.lat,
            },
            precision,
        )?)
    }
}

impl From<Point> for geo::Point {
    fn from(point: Point) -> Self {
        geo::Point::new(point.lon, point.lat)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Distance metric used to compare records against the search radius.
///
/// - **Haversine**: spherical distance on the mean Earth radius, fast
/// - **Geodesic**: ellipsoidal WGS84 distance (Karney 2013), slower and exact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    #[default]
    Haversine,
    Geodesic,
}

impl DistanceMetric {
    /// Distance between two points in meters.
    pub fn distance(self, a: &Point, b: &Point) -> f64 {
        let (a, b) = (geo::Point::from(*a), geo::Point::from(*b));
        match self {
            DistanceMetric::Haversine => Haversine.distance(a, b),
            DistanceMetric::Geodesic => Geodesic.distance(a, b),
        }
    }
}

/// Fold a longitude back into `[-180, 180]`.
///
/// Longitudes that are already in range are returned untouched, so both
/// `-180` and `180` survive as given.
///
/// # Examples
///
/// ```rust
/// use geoscan::spatial::wrap_longitude;
///
/// assert_eq!(wrap_longitude(190.0), -170.0);
/// assert_eq!(wrap_longitude(-190.0), 170.0);
/// assert_eq!(wrap_longitude(180.0), 180.0);
/// ```
pub fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        return longitude;
    }
    let adjusted = longitude + 180.0;
    if adjusted > 0.0 {
        adjusted % 360.0 - 180.0
    } else {
        180.0 - (-adjusted % 360.0)
    }
}
