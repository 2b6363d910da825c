//! # geoscan - Geohash range planning and streaming nearest search
//!
//! geoscan answers "which stored points lie within R meters of here, nearest
//! first" against any store that can scan string keys in order. Records are
//! keyed by geohash; a query is turned into a small set of disjoint key
//! ranges whose union covers the search disc, each range is scanned once,
//! and the records are filtered by true distance and ranked.
//!
//! ## Features
//!
//! - **Bit-precision planning**: cell size follows the radius bit by bit, not
//!   character by character
//! - **Minimal scans**: up to nine neighbouring cells merged into disjoint ranges
//! - **Pole and antimeridian aware**: discs crossing either are still covered
//! - **Streaming**: one forward stream per range, always closed, even on error
//!   or when a scan is abandoned
//! - **Bring your own store**: implement [`RangedRecordSource`] and
//!   [`RecordStream`]; [`MemorySource`] ships for in-memory data and tests
//!
//! ## Quick Start
//!
//! ```rust
//! use geoscan::{GeoRecord, GeoSearch, MemorySource, Point};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut towns = MemorySource::new();
//! towns.insert(Point::new(53.579461, -1.795476), "Holmfirth")?;
//! towns.insert(Point::new(53.312827, -1.261199), "Dronfield")?;
//! towns.insert(Point::new(53.579461, -1.86532), "Marsden")?;
//! towns.insert(Point::new(53.533778, -1.428852), "Barnsley")?;
//!
//! let search = GeoSearch::new();
//! let center = Point::new(53.757343, -2.018040);
//!
//! // The key ranges a store would be asked to scan
//! let ranges = search.plan_ranges(&center, 100_000.0)?;
//! assert!(!ranges.is_empty());
//!
//! let nearest = search.nearest(&towns, &center, 100_000.0, 3, GeoRecord::location)?;
//! let names: Vec<_> = nearest.iter().map(|r| r.record.payload).collect();
//! assert_eq!(names, ["Marsden", "Holmfirth", "Barnsley"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Streaming every match
//!
//! ```rust
//! use geoscan::{GeoRecord, GeoSearch, MemorySource, Point};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut stops = MemorySource::new();
//! stops.insert(Point::new(40.7589, -73.9851), "Times Sq")?;
//! stops.insert(Point::new(40.6892, -74.0445), "Liberty Island")?;
//! stops.insert(Point::new(34.0522, -118.2437), "Los Angeles")?;
//!
//! let search = GeoSearch::new();
//! let center = Point::new(40.7128, -74.0060);
//! for result in search.within(&stops, &center, 20_000.0, GeoRecord::location)? {
//!     let result = result?;
//!     println!("{} is {:.0}m away", result.record.payload, result.distance);
//! }
//! # Ok(())
//! # }
//! ```

pub mod base32;
pub mod builder;
pub mod error;
pub mod merge;
pub mod nearest;
pub mod planner;
pub mod precision;
pub mod range;
pub mod search;
pub mod spatial;
pub mod storage;

pub mod types;

// Re-export the search facade
pub use builder::GeoSearchBuilder;
pub use search::GeoSearch;

pub use error::{GeoScanError, Result};

// Re-export planning types
pub use merge::merge_ranges;
pub use planner::QueryPlan;
pub use range::KeyRange;
pub use spatial::{DistanceMetric, Point};

// Re-export streaming and storage types
pub use nearest::{RadiusScan, RankedResults};
pub use storage::{GeoRecord, MemorySource, MemoryStream, RangedRecordSource, RecordStream, SourceStats};

pub use types::{Config, SearchResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        Config, GeoRecord, GeoScanError, GeoSearch, KeyRange, MemorySource, Point,
        RangedRecordSource, RecordStream, Result, SearchResult,
    };
}
