//! Record source abstraction for geoscan
//!
//! The search engine never talks to a store directly. It opens one ordered
//! scan per planned key range through [`RangedRecordSource`] and pulls
//! records from the returned [`RecordStream`]s. [`MemorySource`] is an
//! in-memory implementation backed by a `BTreeMap`.

use crate::error::{GeoScanError, Result};
use crate::range::KeyRange;
use crate::spatial::Point;
use crate::types::{Config, DEFAULT_GEOHASH_PRECISION};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An ordered forward scan over one key range.
///
/// The consumer owns the stream and is responsible for closing it.
pub trait RecordStream {
    type Record;

    /// Pull the next record and its sort key, or `None` at the end of the range.
    fn next_record(&mut self) -> Result<Option<(String, Self::Record)>>;

    /// Release the scan. Calling it again has no effect.
    fn close(&mut self) -> Result<()>;
}

/// A store that can scan records in key order over half-open key ranges.
pub trait RangedRecordSource {
    type Record;
    type Stream: RecordStream<Record = Self::Record>;

    /// Open a scan over every record with a key in `[range.start, range.end)`.
    fn open(&self, range: &KeyRange) -> Result<Self::Stream>;
}

/// A payload stored together with its location and geohash key.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord<T> {
    pub point: Point,
    pub geohash: String,
    pub payload: T,
}

impl<T> GeoRecord<T> {
    /// Key `payload` by the geohash of `point` at `precision` characters.
    pub fn new(point: Point, payload: T, precision: usize) -> Result<Self> {
        point.validate()?;
        let geohash = point.to_geohash(precision)?;
        Ok(Self {
            point,
            geohash,
            payload,
        })
    }

    /// Projection handed to the search when scanning `GeoRecord`s.
    pub fn location(&self) -> Result<Point> {
        Ok(self.point)
    }
}

/// Stream accounting for a [`MemorySource`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    /// Number of records stored
    pub record_count: usize,
    /// Streams opened so far
    pub streams_opened: usize,
    /// Streams closed so far
    pub streams_closed: usize,
}

impl SourceStats {
    /// Streams opened but not yet closed.
    pub fn open_streams(&self) -> usize {
        self.streams_opened.saturating_sub(self.streams_closed)
    }
}

#[derive(Debug, Default)]
struct StreamCounters {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// In-memory record source keyed by geohash
///
/// Records sharing a geohash are kept in insertion order.
#[derive(Debug)]
pub struct MemorySource<T> {
    data: BTreeMap<String, Vec<GeoRecord<T>>>,
    precision: usize,
    record_count: usize,
    counters: Arc<StreamCounters>,
}

impl<T> MemorySource<T> {
    /// Create an empty source keying records at the default precision.
    pub fn new() -> Self {
        Self::with_precision(DEFAULT_GEOHASH_PRECISION)
    }

    /// Create an empty source keying records at `precision` characters.
    pub fn with_precision(precision: usize) -> Self {
        Self {
            data: BTreeMap::new(),
            precision,
            record_count: 0,
            counters: Arc::new(StreamCounters::default()),
        }
    }

    /// Create an empty source keying records at
    /// `config.record_geohash_precision` characters.
    pub fn from_config(config: &Config) -> Self {
        Self::with_precision(config.record_geohash_precision)
    }

    /// Characters in the geohash key of each stored record.
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Store `payload` at `point` and return its key.
    pub fn insert(&mut self, point: Point, payload: T) -> Result<String> {
        let record = GeoRecord::new(point, payload, self.precision)?;
        let key = record.geohash.clone();
        self.data.entry(key.clone()).or_default().push(record);
        self.record_count += 1;
        Ok(key)
    }

    pub fn len(&self) -> usize {
        self.record_count
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            record_count: self.record_count,
            streams_opened: self.counters.opened.load(Ordering::SeqCst),
            streams_closed: self.counters.closed.load(Ordering::SeqCst),
        }
    }
}

impl<T> Default for MemorySource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> RangedRecordSource for MemorySource<T> {
    type Record = GeoRecord<T>;
    type Stream = MemoryStream<T>;

    fn open(&self, range: &KeyRange) -> Result<Self::Stream> {
        let mut entries = Vec::new();
        // BTreeMap::range panics on inverted bounds
        if !range.is_empty() {
            let bounds = (
                Bound::Included(range.start()),
                Bound::Excluded(range.end()),
            );
            for (key, records) in self.data.range::<str, _>(bounds) {
                for record in records {
                    entries.push((key.clone(), record.clone()));
                }
            }
        }

        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryStream {
            entries: entries.into_iter(),
            closed: false,
            counters: Arc::clone(&self.counters),
        })
    }
}

/// Stream over a snapshot of one key range of a [`MemorySource`]
#[derive(Debug)]
pub struct MemoryStream<T> {
    entries: std::vec::IntoIter<(String, GeoRecord<T>)>,
    closed: bool,
    counters: Arc<StreamCounters>,
}

impl<T> RecordStream for MemoryStream<T> {
    type Record = GeoRecord<T>;

    fn next_record(&mut self) -> Result<Option<(String, GeoRecord<T>)>> {
        if self.closed {
            return Err(GeoScanError::StreamClosed);
        }
        Ok(self.entries.next())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
