//! Half-open geohash key ranges.

use crate::base32::{self, BITS_PER_CHAR, SENTINEL};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range `[start, end)` of geohash keys.
///
/// Ranges compare by `start`, then `end`, using plain string ordering. An
/// `end` finishing in [`SENTINEL`] covers every key sharing the preceding
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyRange {
    start: String,
    end: String,
}

impl KeyRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Range of every key whose first `bits` significant bits match
    /// `geohash`.
    ///
    /// `bits` does not need to fall on a character boundary: the last
    /// character is masked down to its significant bits. A `bits` of zero is
    /// treated as one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geoscan::KeyRange;
    ///
    /// assert_eq!(KeyRange::for_geohash("64m9yn96mx", 6)?, KeyRange::new("60", "6h"));
    /// assert_eq!(KeyRange::for_geohash("64m9yn96mx", 10)?, KeyRange::new("64", "65"));
    /// // Shorter than the requested precision
    /// assert_eq!(KeyRange::for_geohash("6", 10)?, KeyRange::new("6", "6~"));
    /// # Ok::<(), geoscan::GeoScanError>(())
    /// ```
    pub fn for_geohash(geohash: &str, bits: u32) -> Result<Self> {
        let bits = bits.max(1);
        let precision = bits.div_ceil(BITS_PER_CHAR) as usize;
        let symbols: Vec<char> = geohash.chars().take(precision).collect();
        if symbols.len() < precision {
            return Ok(Self::new(geohash, format!("{geohash}{SENTINEL}")));
        }

        let Some((&last, base)) = symbols.split_last() else {
            return Ok(Self::new(geohash, format!("{geohash}{SENTINEL}")));
        };
        for &symbol in base {
            base32::decode_symbol_checked(geohash, symbol)?;
        }
        let last_value = base32::decode_symbol_checked(geohash, last)?;

        let unused_bits = BITS_PER_CHAR * precision as u32 - bits;
        let start_value = (last_value >> unused_bits) << unused_bits;
        let end_value = start_value + (1 << unused_bits);

        let base: String = base.iter().collect();
        let start = format!("{base}{}", base32::encode_symbol(start_value)?);
        let end = match base32::encode_symbol(end_value) {
            Ok(symbol) => format!("{base}{symbol}"),
            Err(_) => format!("{base}{SENTINEL}"),
        };
        Ok(Self { start, end })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Check whether `key` lies in `[start, end)`.
    pub fn contains(&self, key: &str) -> bool {
        self.start.as_str() <= key && key < self.end.as_str()
    }

    /// True when no key can fall in this range.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// `other` starts strictly before this range and ends inside it, so the
    /// two form one contiguous run.
    pub fn is_prefixed_by(&self, other: &KeyRange) -> bool {
        other.end >= self.start && other.start < self.start && other.end < self.end
    }

    /// `other` spans all of this range.
    pub fn is_covered_by(&self, other: &KeyRange) -> bool {
        other.start <= self.start && other.end >= self.end
    }

    /// Whether the two ranges overlap, touch, or nest.
    pub fn can_join(&self, other: &KeyRange) -> bool {
        self.is_prefixed_by(other)
            || other.is_prefixed_by(self)
            || self.is_covered_by(other)
            || other.is_covered_by(self)
    }

    /// The single range covering exactly the union of both, or `None` when
    /// the ranges are disjoint.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geoscan::KeyRange;
    ///
    /// let joined = KeyRange::new("abcd", "abce").join(&KeyRange::new("abce", "abcf"));
    /// assert_eq!(joined, Some(KeyRange::new("abcd", "abcf")));
    ///
    /// let disjoint = KeyRange::new("abcd", "abce").join(&KeyRange::new("abcg", "abch"));
    /// assert_eq!(disjoint, None);
    /// ```
    pub fn join(&self, other: &KeyRange) -> Option<KeyRange> {
        if other.is_prefixed_by(self) {
            Some(Self::new(self.start.clone(), other.end.clone()))
        } else if self.is_prefixed_by(other) {
            Some(Self::new(other.start.clone(), self.end.clone()))
        } else if self.is_covered_by(other) {
            Some(other.clone())
        } else if other.is_covered_by(self) {
            Some(self.clone())
        } else {
            None
        }
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?})", self.start, self.end)
    }
}
