//! The search facade: plan ranges for a disc, then scan or rank a source.

use crate::builder::GeoSearchBuilder;
use crate::error::Result;
use crate::nearest::{self, RadiusScan};
use crate::planner::{self, QueryPlan};
use crate::range::KeyRange;
use crate::spatial::Point;
use crate::storage::{MemorySource, RangedRecordSource};
use crate::types::{Config, SearchResult};

/// Radius and k-nearest search over any [`RangedRecordSource`].
///
/// `GeoSearch` holds no record state. Each call plans the key ranges for the
/// requested disc and opens one stream per range on the source it is given.
///
/// # Examples
///
/// ```rust
/// use geoscan::{GeoRecord, GeoSearch, MemorySource, Point};
///
/// let mut cities = MemorySource::new();
/// cities.insert(Point::new(51.5074, -0.1278), "London")?;
/// cities.insert(Point::new(48.8566, 2.3522), "Paris")?;
/// cities.insert(Point::new(52.4862, -1.8904), "Birmingham")?;
///
/// let search = GeoSearch::new();
/// let found = search.nearest(&cities, &Point::new(51.75, -0.5), 200_000.0, 2, GeoRecord::location)?;
/// let names: Vec<_> = found.iter().map(|r| r.record.payload).collect();
/// assert_eq!(names, ["London", "Birmingham"]);
/// # Ok::<(), geoscan::GeoScanError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeoSearch {
    config: Config,
}

impl GeoSearch {
    /// Search with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Search with a validated configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn builder() -> GeoSearchBuilder {
        GeoSearchBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// An empty in-memory source keyed at the configured record precision.
    pub fn source<T>(&self) -> MemorySource<T> {
        MemorySource::from_config(&self.config)
    }

    /// Plan the key ranges for a disc, with the precision used.
    pub fn plan(&self, center: &Point, radius_meters: f64) -> Result<QueryPlan> {
        planner::plan(center, radius_meters, &self.config)
    }

    /// Disjoint key ranges that together cover the disc.
    pub fn plan_ranges(&self, center: &Point, radius_meters: f64) -> Result<Vec<KeyRange>> {
        Ok(self.plan(center, radius_meters)?.ranges)
    }

    /// Stream every record of `source` within `radius_meters` of `center`.
    ///
    /// Records come out in key order within a range, not by distance.
    /// Dropping the scan closes any streams it still holds.
    pub fn within<Src, F>(
        &self,
        source: &Src,
        center: &Point,
        radius_meters: f64,
        projection: F,
    ) -> Result<RadiusScan<Src::Stream, F>>
    where
        Src: RangedRecordSource,
        F: FnMut(&Src::Record) -> Result<Point>,
    {
        let ranges = self.plan_ranges(center, radius_meters)?;
        RadiusScan::open(
            source,
            &ranges,
            *center,
            radius_meters,
            self.config.distance_metric,
            projection,
        )
    }

    /// The `k` records of `source` nearest to `center` within
    /// `radius_meters`, in ascending distance.
    ///
    /// Input is validated before any stream is opened. A source error
    /// closes every stream of the query and is returned as is.
    pub fn nearest<Src, F>(
        &self,
        source: &Src,
        center: &Point,
        radius_meters: f64,
        k: usize,
        projection: F,
    ) -> Result<Vec<SearchResult<Src::Record>>>
    where
        Src: RangedRecordSource,
        F: FnMut(&Src::Record) -> Result<Point>,
    {
        let ranges = self.plan_ranges(center, radius_meters)?;
        nearest::nearest(
            source,
            &ranges,
            *center,
            radius_meters,
            k,
            self.config.distance_metric,
            projection,
        )
    }
}
