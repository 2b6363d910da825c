//! Query planning: from a center and radius to the key ranges to scan.
//!
//! The plan samples the disc's center and its eight compass neighbours at
//! the chosen bit precision, turns each sample into the key range of its
//! cell, and merges the cells into a disjoint cover. The cover is a superset
//! of the disc; exact membership is decided later by distance.

use crate::base32::BITS_PER_CHAR;
use crate::error::{GeoScanError, Result};
use crate::merge::merge_ranges;
use crate::precision::{SearchBounds, bits_for_bounding_box};
use crate::range::KeyRange;
use crate::spatial::{Point, wrap_longitude};
use crate::types::Config;
use smallvec::SmallVec;

/// Up to nine cell ranges: the center and its compass neighbours.
pub type CandidateCells = SmallVec<[KeyRange; 9]>;

/// Key ranges covering a search disc.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Significant geohash bits of each cell
    pub bits: u32,
    /// Number of distinct cells before merging
    pub candidate_count: usize,
    /// Disjoint ranges sorted by start key
    pub ranges: Vec<KeyRange>,
}

/// Reject a center or radius that cannot describe a disc on the globe.
pub fn validate_query(center: &Point, radius_meters: f64) -> Result<()> {
    center.validate()?;
    if !radius_meters.is_finite() || radius_meters < 0.0 {
        return Err(GeoScanError::InvalidRadius(radius_meters));
    }
    Ok(())
}

/// Compute the distinct cell ranges around `center` at `bits` precision.
///
/// Neighbours are sampled at the north and south edges of `bounds` and at
/// the center latitude, each combined with the center longitude and the
/// longitudes `bounds.longitude_delta` to the west and east.
pub fn candidate_cells(center: &Point, bounds: &SearchBounds, bits: u32) -> Result<CandidateCells> {
    let precision = bits.div_ceil(BITS_PER_CHAR) as usize;
    let west = wrap_longitude(center.lon - bounds.longitude_delta);
    let east = wrap_longitude(center.lon + bounds.longitude_delta);

    let mut cells = CandidateCells::new();
    for lat in [center.lat, bounds.north, bounds.south] {
        for lon in [center.lon, west, east] {
            let geohash = Point::new(lat, lon).to_geohash(precision)?;
            let cell = KeyRange::for_geohash(&geohash, bits)?;
            if !cells.contains(&cell) {
                cells.push(cell);
            }
        }
    }
    Ok(cells)
}

/// Plan the key ranges for a disc of `radius_meters` around `center`.
///
/// # Examples
///
/// ```rust
/// use geoscan::{Config, KeyRange, Point};
/// use geoscan::planner::plan;
///
/// let center = Point::new(53.757343, -2.018040);
/// let plan = plan(&center, 100_000.0, &Config::default())?;
/// assert_eq!(plan.bits, 13);
/// assert_eq!(plan.ranges, vec![KeyRange::new("gch", "gc~")]);
/// # Ok::<(), geoscan::GeoScanError>(())
/// ```
pub fn plan(center: &Point, radius_meters: f64, config: &Config) -> Result<QueryPlan> {
    validate_query(center, radius_meters)?;

    let planning_radius = radius_meters * config.radius_margin;
    let bounds = SearchBounds::around(center, planning_radius);
    let bits = bits_for_bounding_box(center, planning_radius, config.max_precision_bits);
    let cells = candidate_cells(center, &bounds, bits)?;
    let candidate_count = cells.len();
    let ranges = merge_ranges(cells);

    log::debug!(
        "planned {} range(s) from {} cell(s) at {} bits for {:.1}m around {}",
        ranges.len(),
        candidate_count,
        bits,
        radius_meters,
        center
    );

    Ok(QueryPlan {
        bits,
        candidate_count,
        ranges,
    })
}
