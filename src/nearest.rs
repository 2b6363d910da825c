//! Streaming radius filter and bounded k-nearest ranking.
//!
//! [`RadiusScan`] owns one stream per planned range and drains them one at a
//! time, yielding only records inside the search radius. [`nearest`] feeds
//! the scan into [`RankedResults`], which keeps the `k` closest records.

use crate::error::{GeoScanError, Result};
use crate::planner::validate_query;
use crate::range::KeyRange;
use crate::spatial::{DistanceMetric, Point};
use crate::storage::{RangedRecordSource, RecordStream};
use crate::types::SearchResult;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::iter::FusedIterator;

/// Pull iterator over every in-radius record of a set of key ranges.
///
/// All streams are opened up front. A stream is closed as soon as it is
/// exhausted; the remaining ones are closed when an error is hit, when
/// [`RadiusScan::close`] is called, or when the scan is dropped. After an
/// error the iterator is fused.
pub struct RadiusScan<S, F>
where
    S: RecordStream,
{
    streams: VecDeque<S>,
    center: Point,
    radius_meters: f64,
    metric: DistanceMetric,
    projection: F,
}

impl<S, F> RadiusScan<S, F>
where
    S: RecordStream,
    F: FnMut(&S::Record) -> Result<Point>,
{
    /// Open one stream per range on `source`.
    ///
    /// `center` and `radius_meters` are validated before anything is opened.
    /// If any open fails, the streams already opened are closed before the
    /// error is returned.
    pub fn open<Src>(
        source: &Src,
        ranges: &[KeyRange],
        center: Point,
        radius_meters: f64,
        metric: DistanceMetric,
        projection: F,
    ) -> Result<Self>
    where
        Src: RangedRecordSource<Record = S::Record, Stream = S>,
    {
        validate_query(&center, radius_meters)?;
        let mut streams = VecDeque::with_capacity(ranges.len());
        for range in ranges {
            match source.open(range) {
                Ok(stream) => streams.push_back(stream),
                Err(err) => {
                    close_all(&mut streams);
                    return Err(err);
                }
            }
        }
        log::debug!(
            "opened {} stream(s) for {:.1}m around {}",
            streams.len(),
            radius_meters,
            center
        );

        Ok(Self {
            streams,
            center,
            radius_meters,
            metric,
            projection,
        })
    }

    /// Streams not yet exhausted or closed.
    pub fn open_streams(&self) -> usize {
        self.streams.len()
    }

    /// Close every remaining stream, returning the first close failure.
    pub fn close(&mut self) -> Result<()> {
        let mut first_error = None;
        while let Some(mut stream) = self.streams.pop_front() {
            if let Err(err) = stream.close() {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn abort(&mut self, err: GeoScanError) -> GeoScanError {
        close_all(&mut self.streams);
        err
    }

    fn accept(&mut self, key: String, record: S::Record) -> Result<Option<SearchResult<S::Record>>> {
        let point = (self.projection)(&record)?;
        point.validate()?;
        let distance = self.metric.distance(&self.center, &point);
        if distance > self.radius_meters {
            log::trace!("discarding {key} at {distance:.1}m");
            return Ok(None);
        }
        Ok(Some(SearchResult {
            key,
            point,
            distance,
            record,
        }))
    }
}

impl<S, F> Iterator for RadiusScan<S, F>
where
    S: RecordStream,
    F: FnMut(&S::Record) -> Result<Point>,
{
    type Item = Result<SearchResult<S::Record>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pulled = self.streams.front_mut()?.next_record();
            match pulled {
                Ok(Some((key, record))) => match self.accept(key, record) {
                    Ok(Some(result)) => return Some(Ok(result)),
                    Ok(None) => continue,
                    Err(err) => return Some(Err(self.abort(err))),
                },
                Ok(None) => {
                    let Some(mut stream) = self.streams.pop_front() else {
                        return None;
                    };
                    log::debug!("stream exhausted, {} left", self.streams.len());
                    if let Err(err) = stream.close() {
                        return Some(Err(self.abort(err)));
                    }
                }
                Err(err) => return Some(Err(self.abort(err))),
            }
        }
    }
}

impl<S, F> FusedIterator for RadiusScan<S, F>
where
    S: RecordStream,
    F: FnMut(&S::Record) -> Result<Point>,
{
}

impl<S: RecordStream, F> Drop for RadiusScan<S, F> {
    fn drop(&mut self) {
        close_all(&mut self.streams);
    }
}

fn close_all<S: RecordStream>(streams: &mut VecDeque<S>) {
    while let Some(mut stream) = streams.pop_front() {
        if let Err(err) = stream.close() {
            log::warn!("failed to close record stream: {err}");
        }
    }
}

struct Ranked<R>(SearchResult<R>);

impl<R> PartialEq for Ranked<R> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<R> Eq for Ranked<R> {}

impl<R> PartialOrd for Ranked<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> Ord for Ranked<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .distance
            .total_cmp(&other.0.distance)
            .then_with(|| self.0.key.cmp(&other.0.key))
    }
}

/// The `k` closest results seen so far.
///
/// Backed by a max-heap on distance, so the current worst result is replaced
/// in `O(log k)` when something strictly closer arrives.
///
/// # Examples
///
/// ```rust
/// use geoscan::{Point, RankedResults, SearchResult};
///
/// let mut ranked = RankedResults::new(2);
/// for (key, distance) in [("c", 30.0), ("a", 10.0), ("b", 20.0)] {
///     ranked.push(SearchResult {
///         key: key.to_string(),
///         point: Point::new(0.0, 0.0),
///         distance,
///         record: (),
///     });
/// }
/// let keys: Vec<_> = ranked.into_sorted_vec().into_iter().map(|r| r.key).collect();
/// assert_eq!(keys, ["a", "b"]);
/// ```
pub struct RankedResults<R> {
    capacity: usize,
    heap: BinaryHeap<Ranked<R>>,
}

impl<R> RankedResults<R> {
    pub fn new(k: usize) -> Self {
        Self {
            capacity: k,
            heap: BinaryHeap::with_capacity(k),
        }
    }

    /// Offer a result. Returns whether it was kept.
    pub fn push(&mut self, result: SearchResult<R>) -> bool {
        if self.heap.len() < self.capacity {
            self.heap.push(Ranked(result));
            return true;
        }
        match self.heap.peek_mut() {
            Some(mut worst) if result.distance < worst.0.distance => {
                *worst = Ranked(result);
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Distance of the farthest kept result.
    pub fn worst_distance(&self) -> Option<f64> {
        self.heap.peek().map(|worst| worst.0.distance)
    }

    /// Kept results in ascending distance.
    pub fn into_sorted_vec(self) -> Vec<SearchResult<R>> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|ranked| ranked.0)
            .collect()
    }
}

/// The `k` records closest to `center` within `radius_meters`, nearest first.
///
/// Scans every range in `ranges`. Any stream or projection failure aborts the
/// search: the streams are closed and the error is returned without partial
/// results. A `k` of zero returns once the input is validated, without
/// opening streams.
pub fn nearest<Src, F>(
    source: &Src,
    ranges: &[KeyRange],
    center: Point,
    radius_meters: f64,
    k: usize,
    metric: DistanceMetric,
    projection: F,
) -> Result<Vec<SearchResult<Src::Record>>>
where
    Src: RangedRecordSource,
    F: FnMut(&Src::Record) -> Result<Point>,
{
    validate_query(&center, radius_meters)?;
    if k == 0 {
        return Ok(Vec::new());
    }

    let scan = RadiusScan::open(source, ranges, center, radius_meters, metric, projection)?;
    let mut ranked = RankedResults::new(k);
    for result in scan {
        ranked.push(result?);
    }
    log::debug!("kept {} of at most {} nearest", ranked.len(), k);
    Ok(ranked.into_sorted_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{GeoRecord, MemorySource};
    use std::cell::Cell;
    use std::rc::Rc;

    fn result(key: &str, distance: f64) -> SearchResult<()> {
        SearchResult {
            key: key.to_string(),
            point: Point::new(0.0, 0.0),
            distance,
            record: (),
        }
    }

    fn keys<R>(results: &[SearchResult<R>]) -> Vec<&str> {
        results.iter().map(|r| r.key.as_str()).collect()
    }

    fn everything() -> Vec<KeyRange> {
        vec![KeyRange::new("0", "~")]
    }

    fn huddersfield() -> Point {
        Point::new(53.75734328397976, -2.0180395172300716)
    }

    fn yorkshire() -> MemorySource<&'static str> {
        let mut source = MemorySource::new();
        source.insert(Point::new(53.579461, -1.795476), "a").unwrap();
        source.insert(Point::new(53.312827, -1.261199), "b").unwrap();
        source.insert(Point::new(53.579461, -1.86532), "c").unwrap();
        source.insert(Point::new(53.533778, -1.428852), "d").unwrap();
        source
    }

    #[test]
    fn test_ranked_keeps_k_smallest() {
        let mut ranked = RankedResults::new(3);
        for (key, distance) in [("e", 50.0), ("a", 10.0), ("d", 40.0), ("b", 20.0), ("c", 30.0)] {
            ranked.push(result(key, distance));
        }
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked.worst_distance(), Some(30.0));
        assert_eq!(keys(&ranked.into_sorted_vec()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ranked_requires_strictly_closer() {
        let mut ranked = RankedResults::new(1);
        assert!(ranked.push(result("first", 10.0)));
        assert!(!ranked.push(result("tie", 10.0)));
        assert!(!ranked.push(result("far", 11.0)));
        assert!(ranked.push(result("near", 9.0)));
        assert_eq!(keys(&ranked.into_sorted_vec()), vec!["near"]);
    }

    #[test]
    fn test_ranked_zero_capacity() {
        let mut ranked = RankedResults::new(0);
        assert!(!ranked.push(result("a", 1.0)));
        assert!(ranked.is_empty());
        assert_eq!(ranked.worst_distance(), None);
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let source = yorkshire();
        let results = nearest(
            &source,
            &everything(),
            huddersfield(),
            100_000.0,
            4,
            DistanceMetric::Haversine,
            GeoRecord::location,
        )
        .unwrap();

        let payloads: Vec<_> = results.iter().map(|r| r.record.payload).collect();
        assert_eq!(payloads, vec!["c", "a", "d", "b"]);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!((results[0].distance - 22_191.0).abs() < 100.0);
        assert_eq!(source.stats().open_streams(), 0);
    }

    #[test]
    fn test_nearest_truncates_and_filters() {
        let source = yorkshire();
        let top = nearest(
            &source,
            &everything(),
            huddersfield(),
            100_000.0,
            3,
            DistanceMetric::Haversine,
            GeoRecord::location,
        )
        .unwrap();
        assert_eq!(keys(&top), vec!["gcw8v9cdyz", "gcw8z1udfr", "gcwbx3x8c7"]);

        let within = nearest(
            &source,
            &everything(),
            huddersfield(),
            50_000.0,
            10,
            DistanceMetric::Haversine,
            GeoRecord::location,
        )
        .unwrap();
        assert_eq!(within.len(), 3);
        assert!(within.iter().all(|r| r.distance <= 50_000.0));
    }

    #[test]
    fn test_nearest_zero_k_opens_nothing() {
        let source = yorkshire();
        let results = nearest(
            &source,
            &everything(),
            huddersfield(),
            100_000.0,
            0,
            DistanceMetric::Haversine,
            GeoRecord::location,
        )
        .unwrap();
        assert!(results.is_empty());
        assert_eq!(source.stats().streams_opened, 0);
    }

    #[test]
    fn test_scan_rejects_invalid_query_before_opening() {
        let source = yorkshire();
        for (center, radius) in [
            (huddersfield(), f64::NAN),
            (huddersfield(), -1.0),
            (Point::new(95.0, 0.0), 1e7),
        ] {
            let opened = RadiusScan::open(
                &source,
                &everything(),
                center,
                radius,
                DistanceMetric::Haversine,
                GeoRecord::location,
            );
            assert!(opened.is_err(), "{center} r={radius}");
        }
        assert_eq!(source.stats().streams_opened, 0);
    }

    #[test]
    fn test_nearest_rejects_invalid_query_before_opening() {
        let source = yorkshire();
        for k in [0, 3] {
            let err = nearest(
                &source,
                &everything(),
                huddersfield(),
                f64::NAN,
                k,
                DistanceMetric::Haversine,
                GeoRecord::location,
            )
            .unwrap_err();
            assert!(matches!(err, GeoScanError::InvalidRadius(_)));

            let err = nearest(
                &source,
                &everything(),
                huddersfield(),
                -1.0,
                k,
                DistanceMetric::Haversine,
                GeoRecord::location,
            )
            .unwrap_err();
            assert!(matches!(err, GeoScanError::InvalidRadius(_)));

            let err = nearest(
                &source,
                &everything(),
                Point::new(95.0, 0.0),
                1e7,
                k,
                DistanceMetric::Haversine,
                GeoRecord::location,
            )
            .unwrap_err();
            assert!(matches!(err, GeoScanError::InvalidCoordinate { .. }));
        }
        assert_eq!(source.stats().streams_opened, 0);
    }

    #[test]
    fn test_scan_closes_exhausted_streams() {
        let source = yorkshire();
        let ranges = vec![KeyRange::new("gcr", "gcs"), KeyRange::new("gcw", "gcx")];
        let mut scan = RadiusScan::open(
            &source,
            &ranges,
            huddersfield(),
            100_000.0,
            DistanceMetric::Haversine,
            GeoRecord::location,
        )
        .unwrap();
        assert_eq!(scan.open_streams(), 2);

        let first = scan.next().unwrap().unwrap();
        assert_eq!(first.record.payload, "b");
        let second = scan.next().unwrap().unwrap();
        assert_eq!(second.record.payload, "c");
        assert_eq!(scan.open_streams(), 1);
        assert_eq!(source.stats().streams_closed, 1);

        assert_eq!(scan.by_ref().count(), 2);
        assert_eq!(scan.open_streams(), 0);
        assert!(scan.next().is_none());
        assert_eq!(source.stats().open_streams(), 0);
    }

    #[test]
    fn test_dropping_scan_closes_streams() {
        let source = yorkshire();
        let ranges = vec![KeyRange::new("gcr", "gcs"), KeyRange::new("gcw", "gcx")];
        let mut scan = RadiusScan::open(
            &source,
            &ranges,
            huddersfield(),
            100_000.0,
            DistanceMetric::Haversine,
            GeoRecord::location,
        )
        .unwrap();
        assert!(scan.next().is_some());
        assert_eq!(source.stats().open_streams(), 2);

        drop(scan);
        assert_eq!(source.stats().open_streams(), 0);
        assert_eq!(source.stats().streams_closed, 2);
    }

    #[test]
    fn test_explicit_close() {
        let source = yorkshire();
        let mut scan = RadiusScan::open(
            &source,
            &everything(),
            huddersfield(),
            100_000.0,
            DistanceMetric::Haversine,
            GeoRecord::location,
        )
        .unwrap();
        scan.close().unwrap();
        assert!(scan.next().is_none());
        assert_eq!(source.stats().open_streams(), 0);
    }

    #[test]
    fn test_projection_error_aborts_scan() {
        let source = yorkshire();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let mut scan = RadiusScan::open(
            &source,
            &[KeyRange::new("gcr", "gcs"), KeyRange::new("gcw", "gcx")],
            huddersfield(),
            100_000.0,
            DistanceMetric::Haversine,
            move |record: &GeoRecord<&str>| {
                seen.set(seen.get() + 1);
                if record.payload == "c" {
                    Ok(Point::new(f64::NAN, 0.0))
                } else {
                    Ok(record.point)
                }
            },
        )
        .unwrap();

        assert!(scan.next().unwrap().is_ok());
        assert!(matches!(
            scan.next(),
            Some(Err(GeoScanError::InvalidCoordinate { .. }))
        ));
        assert!(scan.next().is_none());
        assert_eq!(calls.get(), 2);
        assert_eq!(source.stats().open_streams(), 0);
    }

    #[test]
    fn test_geodesic_metric() {
        let source = yorkshire();
        let results = nearest(
            &source,
            &everything(),
            huddersfield(),
            100_000.0,
            4,
            DistanceMetric::Geodesic,
            GeoRecord::location,
        )
        .unwrap();
        let payloads: Vec<_> = results.iter().map(|r| r.record.payload).collect();
        assert_eq!(payloads, vec!["c", "a", "d", "b"]);
    }
}
