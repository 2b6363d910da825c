//! Collapse candidate ranges into a minimal disjoint cover.

use crate::range::KeyRange;
use std::collections::BTreeSet;

/// Join ranges until no two of them overlap, touch, or nest.
///
/// The union of the output is exactly the union of the input. Duplicates
/// collapse, and the output is sorted by start key.
///
/// # Examples
///
/// ```rust
/// use geoscan::{KeyRange, merge_ranges};
///
/// let merged = merge_ranges([
///     KeyRange::new("gcw9c8", "gcw9ch"),
///     KeyRange::new("gcw9ch", "gcw9cs"),
///     KeyRange::new("gcw9f0", "gcw9f8"),
///     KeyRange::new("gcw9f0", "gcw9f8"),
/// ]);
/// assert_eq!(
///     merged,
///     vec![KeyRange::new("gcw9c8", "gcw9cs"), KeyRange::new("gcw9f0", "gcw9f8")]
/// );
/// ```
pub fn merge_ranges<I>(ranges: I) -> Vec<KeyRange>
where
    I: IntoIterator<Item = KeyRange>,
{
    let mut ranges: BTreeSet<KeyRange> = ranges.into_iter().collect();
    // Each join replaces two ranges with one, so this runs at most n - 1 times.
    while let Some((a, b, joined)) = find_join(&ranges) {
        log::trace!("joining {a} and {b} into {joined}");
        ranges.remove(&a);
        ranges.remove(&b);
        ranges.insert(joined);
    }
    ranges.into_iter().collect()
}

/// True when no pair of `ranges` can be joined.
pub fn is_fully_merged(ranges: &[KeyRange]) -> bool {
    ranges.iter().enumerate().all(|(i, a)| {
        ranges
            .iter()
            .skip(i + 1)
            .all(|b| !a.can_join(b))
    })
}

fn find_join(ranges: &BTreeSet<KeyRange>) -> Option<(KeyRange, KeyRange, KeyRange)> {
    for (i, a) in ranges.iter().enumerate() {
        for b in ranges.iter().skip(i + 1) {
            if let Some(joined) = a.join(b) {
                return Some((a.clone(), b.clone(), joined));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: &str, end: &str) -> KeyRange {
        KeyRange::new(start, end)
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_ranges(Vec::new()).is_empty());
    }

    #[test]
    fn test_merge_adjacent_chain() {
        let merged = merge_ranges([
            range("abcf", "abcg"),
            range("abcd", "abce"),
            range("abce", "abcf"),
        ]);
        assert_eq!(merged, vec![range("abcd", "abcg")]);
    }

    #[test]
    fn test_merge_nested_and_overlapping() {
        let merged = merge_ranges([
            range("abc", "abd"),
            range("abcd", "abce~"),
            range("abce", "abcf"),
            range("abcz", "abe"),
        ]);
        assert_eq!(merged, vec![range("abc", "abe")]);
    }

    #[test]
    fn test_merge_keeps_disjoint_ranges() {
        let input = vec![range("abcd", "abce"), range("abcg", "abch"), range("dce", "dcf")];
        let merged = merge_ranges(input.clone());
        assert_eq!(merged, input);
        assert!(is_fully_merged(&merged));
    }

    #[test]
    fn test_merge_duplicates_collapse() {
        let merged = merge_ranges(vec![range("gch", "gc~"); 9]);
        assert_eq!(merged, vec![range("gch", "gc~")]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let merged = merge_ranges([
            range("9q8yy4", "9q8yy8"),
            range("9q8yy8", "9q8yyh"),
            range("9q8yyh", "9q8yyn"),
            range("9q8yyp", "9q8yys"),
        ]);
        assert_eq!(merged, vec![range("9q8yy4", "9q8yyn"), range("9q8yyp", "9q8yys")]);
        assert_eq!(merge_ranges(merged.clone()), merged);
    }

    #[test]
    fn test_merge_order_does_not_matter() {
        let ranges = vec![
            range("60", "6h"),
            range("64", "65"),
            range("6h", "6~"),
            range("70", "7h"),
            range("7h", "8"),
        ];
        let forward = merge_ranges(ranges.clone());
        let backward = merge_ranges(ranges.into_iter().rev());
        assert_eq!(forward, backward);
        assert_eq!(forward, vec![range("60", "6~"), range("70", "8")]);
    }

    #[test]
    fn test_is_fully_merged() {
        assert!(is_fully_merged(&[]));
        assert!(is_fully_merged(&[range("a", "b"), range("c", "d")]));
        assert!(!is_fully_merged(&[range("a", "b"), range("b", "c")]));
        assert!(!is_fully_merged(&[range("a", "c"), range("ab", "b")]));
        // A repeated range covers itself
        assert!(!is_fully_merged(&[range("a", "b"), range("a", "b")]));
    }
}
