//! Geohash bit precision for a search radius.
//!
//! A geohash of `b` bits interleaves `ceil(b / 2)` longitude bits with
//! `floor(b / 2)` latitude bits, longitude first. The precision chosen for a
//! query is the largest `b` whose cells are at least as large as the search
//! disc's footprint in both dimensions, so the disc touches at most a 3x3
//! neighbourhood of cells.

use crate::spatial::Point;

/// Length of a degree of latitude at the equator, in meters.
pub const METERS_PER_DEGREE_LATITUDE: f64 = 110_574.0;

/// Meridional circumference of the Earth, in meters.
pub const EARTH_MERIDIONAL_CIRCUMFERENCE: f64 = 40_007_860.0;

/// Equatorial radius of the Earth (WGS84), in meters.
pub const EARTH_EQ_RADIUS: f64 = 6_378_137.0;

/// First eccentricity squared of the WGS84 ellipsoid, `(a² - b²) / a²`.
pub const EARTH_E2: f64 = 0.006_694_478_197_99;

/// Default cap on bits per dimension.
pub const MAX_PRECISION_BITS: u32 = 22;

const EPSILON: f64 = 1e-12;

/// Latitude/longitude extent of a search disc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBounds {
    /// Northern edge, clamped to 90
    pub north: f64,
    /// Southern edge, clamped to -90
    pub south: f64,
    /// Longitude half-width, the wider of the north and south edges, at most 180
    pub longitude_delta: f64,
}

impl SearchBounds {
    /// Compute the bounds of the disc of `radius` meters around `center`.
    pub fn around(center: &Point, radius: f64) -> Self {
        let latitude_delta = distance_to_latitude_degrees(radius);
        let north = (center.lat + latitude_delta).min(90.0);
        let south = (center.lat - latitude_delta).max(-90.0);
        let longitude_delta = distance_to_longitude_degrees(radius, north)
            .max(distance_to_longitude_degrees(radius, south))
            .min(180.0);
        Self {
            north,
            south,
            longitude_delta,
        }
    }
}

/// Degrees of latitude spanned by `distance` meters.
pub fn distance_to_latitude_degrees(distance: f64) -> f64 {
    distance / METERS_PER_DEGREE_LATITUDE
}

/// Degrees of longitude spanned by `distance` meters along the parallel at
/// `latitude`, capped at 360.
///
/// At the poles a parallel has no length; any positive distance then wraps
/// the whole globe, and a zero distance stays zero.
pub fn distance_to_longitude_degrees(distance: f64, latitude: f64) -> f64 {
    let radians = latitude.to_radians();
    let numerator = radians.cos() * EARTH_EQ_RADIUS * std::f64::consts::PI / 180.0;
    let denominator = 1.0 / (1.0 - EARTH_E2 * radians.sin() * radians.sin()).sqrt();
    let meters_per_degree = numerator * denominator;
    if meters_per_degree < EPSILON {
        if distance > 0.0 { 360.0 } else { distance }
    } else {
        (distance / meters_per_degree).min(360.0)
    }
}

/// Latitude bits whose cells are at least `resolution` meters tall.
///
/// Also capped so that one cell spans the `resolution / 110574` degree offset
/// used to place the north and south neighbour samples.
pub fn bits_latitude(resolution: f64, max_bits: u32) -> f64 {
    let by_circumference = (EARTH_MERIDIONAL_CIRCUMFERENCE / 2.0 / resolution).log2();
    let by_offset = (180.0 / distance_to_latitude_degrees(resolution)).log2();
    by_circumference.min(by_offset).min(f64::from(max_bits))
}

/// Longitude bits whose cells are at least `resolution` meters wide at
/// `latitude`, never less than 1.
pub fn bits_longitude(resolution: f64, latitude: f64) -> f64 {
    let degrees = distance_to_longitude_degrees(resolution, latitude);
    if degrees.abs() > 0.0 {
        (360.0 / degrees).log2().max(1.0)
    } else {
        1.0
    }
}

/// Number of significant geohash bits for a disc of `radius` meters around
/// `center`.
///
/// The result is at least 1 and at most `2 * max_bits`.
///
/// # Examples
///
/// ```rust
/// use geoscan::Point;
/// use geoscan::precision::{bits_for_bounding_box, MAX_PRECISION_BITS};
///
/// let equator = Point::new(0.0, 0.0);
/// assert_eq!(bits_for_bounding_box(&equator, 1_000.0, MAX_PRECISION_BITS), 28);
/// assert_eq!(bits_for_bounding_box(&equator, 0.0, MAX_PRECISION_BITS), 1);
/// ```
pub fn bits_for_bounding_box(center: &Point, radius: f64, max_bits: u32) -> u32 {
    let bounds = SearchBounds::around(center, radius);
    let latitude = bits_latitude(radius, max_bits).floor() * 2.0;
    let longitude_north = bits_longitude(radius, bounds.north).floor() * 2.0 - 1.0;
    let longitude_south = bits_longitude(radius, bounds.south).floor() * 2.0 - 1.0;
    let bits = latitude
        .min(longitude_north)
        .min(longitude_south)
        .max(1.0);
    bits as u32
}
