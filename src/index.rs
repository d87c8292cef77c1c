//! Sorted per-chromosome interval index.
//!
//! Intervals are kept sorted by `(start, end)` together with a running
//! maximum of `end`, which answers overlap and nearest-neighbour queries
//! with binary searches instead of scanning every interval.

use ahash::AHashMap;

use crate::types::Interval;

struct Entry<T> {
    start: i64,
    end: i64,
    value: T,
}

struct ChromIndex<T> {
    entries: Vec<Entry<T>>,
    /// `max_end[i]` is the largest `end` among `entries[..=i]`.
    max_end: Vec<i64>,
}

impl<T> ChromIndex<T> {
    fn new(mut entries: Vec<Entry<T>>) -> Self {
        entries.sort_by_key(|e| (e.start, e.end));
        let mut max_end = Vec::with_capacity(entries.len());
        let mut running = i64::MIN;
        for e in &entries {
            running = running.max(e.end);
            max_end.push(running);
        }
        ChromIndex { entries, max_end }
    }

    /// Number of entries starting at or before `pos`.
    fn starting_before(&self, pos: i64) -> usize {
        self.entries.partition_point(|e| e.start <= pos)
    }
}

/// Index over intervals carrying a payload of type `T`.
pub struct IntervalIndex<T> {
    chroms: AHashMap<String, ChromIndex<T>>,
    len: usize,
}

impl<T> IntervalIndex<T> {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (Interval, T)>,
    {
        let mut grouped: AHashMap<String, Vec<Entry<T>>> = AHashMap::new();
        let mut len = 0;
        for (interval, value) in items {
            len += 1;
            grouped.entry(interval.chrom).or_default().push(Entry {
                start: interval.start,
                end: interval.end,
                value,
            });
        }
        let chroms = grouped
            .into_iter()
            .map(|(chrom, entries)| (chrom, ChromIndex::new(entries)))
            .collect();
        IntervalIndex { chroms, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.chroms.contains_key(chrom)
    }

    /// True when any indexed interval shares a base with `query`.
    pub fn any_overlap(&self, query: &Interval) -> bool {
        let Some(index) = self.chroms.get(&query.chrom) else {
            return false;
        };
        let k = index.starting_before(query.end);
        k > 0 && index.max_end[k - 1] >= query.start
    }

    /// Nearest indexed interval to `query` and its distance.
    ///
    /// Overlapping intervals are at distance 0; otherwise the distance is the
    /// number of bases strictly between the two intervals. Ties are broken by
    /// the lowest `(start, end)`.
    pub fn nearest(&self, query: &Interval) -> Option<(&T, i64)> {
        let index = self.chroms.get(&query.chrom)?;
        let k = index.starting_before(query.end);

        if k > 0 {
            let max_end = index.max_end[k - 1];
            if max_end >= query.start {
                // First entry whose running maximum reaches the query is itself
                // an overlapping entry, and the lowest such in sort order.
                let i = index.max_end[..k].partition_point(|&m| m < query.start);
                return Some((&index.entries[i].value, 0));
            }
        }

        let left = (k > 0).then(|| {
            let max_end = index.max_end[k - 1];
            let i = index.max_end[..k].partition_point(|&m| m < max_end);
            (i, (query.start - max_end - 1).max(0))
        });
        let right = (k < index.entries.len())
            .then(|| (k, (index.entries[k].start - query.end - 1).max(0)));

        let (i, distance) = match (left, right) {
            (Some(l), Some(r)) => {
                // Left entries start before right ones, so they win ties.
                if l.1 <= r.1 {
                    l
                } else {
                    r
                }
            }
            (Some(l), None) => l,
            (None, Some(r)) => r,
            (None, None) => return None,
        };
        Some((&index.entries[i].value, distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(chrom: &str, start: i64, end: i64) -> Interval {
        Interval::new(chrom, start, end).unwrap()
    }

    fn index(items: Vec<(i64, i64, &'static str)>) -> IntervalIndex<&'static str> {
        IntervalIndex::new(items.into_iter().map(|(s, e, v)| (iv("chr1", s, e), v)))
    }

    #[test]
    fn test_any_overlap() {
        let idx = index(vec![(100, 200, "a"), (500, 600, "b")]);
        assert!(idx.any_overlap(&iv("chr1", 200, 250)));
        assert!(idx.any_overlap(&iv("chr1", 450, 500)));
        assert!(!idx.any_overlap(&iv("chr1", 201, 499)));
        assert!(!idx.any_overlap(&iv("chr2", 100, 200)));
    }

    #[test]
    fn test_overlap_hidden_behind_long_interval() {
        // The long interval starts first but reaches past the short one.
        let idx = index(vec![(100, 1000, "long"), (200, 210, "short")]);
        assert!(idx.any_overlap(&iv("chr1", 500, 600)));
        assert_eq!(idx.nearest(&iv("chr1", 500, 600)), Some((&"long", 0)));
    }

    #[test]
    fn test_nearest_left_and_right() {
        let idx = index(vec![(100, 100, "left"), (300, 300, "right")]);
        assert_eq!(idx.nearest(&iv("chr1", 150, 160)), Some((&"left", 49)));
        assert_eq!(idx.nearest(&iv("chr1", 250, 260)), Some((&"right", 39)));
        assert_eq!(idx.nearest(&iv("chr1", 10, 20)), Some((&"left", 79)));
        assert_eq!(idx.nearest(&iv("chr1", 400, 420)), Some((&"right", 99)));
    }

    #[test]
    fn test_nearest_tie_prefers_lowest_coordinate() {
        let idx = index(vec![(300, 300, "right"), (100, 100, "left")]);
        // 101..199 is 99 bases from both sides.
        assert_eq!(idx.nearest(&iv("chr1", 200, 200)), Some((&"left", 99)));

        let idx = index(vec![(150, 160, "b"), (150, 150, "a")]);
        assert_eq!(idx.nearest(&iv("chr1", 100, 200)), Some((&"a", 0)));
    }

    #[test]
    fn test_nearest_missing_chromosome() {
        let idx = index(vec![(100, 100, "a")]);
        assert_eq!(idx.nearest(&iv("chrX", 100, 100)), None);
        assert_eq!(idx.len(), 1);
        assert!(idx.has_chrom("chr1"));
    }
}
