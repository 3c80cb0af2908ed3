//! Half-open integer intervals
//!
//! An [`Interval`] covers `[start, start + length)`. All operations return
//! new intervals; nothing is mutated in place.

use std::fmt;

/// Coordinate type for interval bounds and mapped values
pub type Coord = i64;

/// A half-open range of integers `[start, end)`
///
/// Stored by its bounds so `end` never has to be recomputed. An interval
/// with `length() == 0` is empty and carries no values, but it still has a
/// position and compares structurally like any other interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    start: Coord,
    end: Coord,
}

impl Interval {
    /// Create an interval from a start and a length
    ///
    /// `end` saturates at `Coord::MAX`.
    ///
    /// # Examples
    /// ```
    /// use interval_remap::Interval;
    /// let iv = Interval::new(79, 14);
    /// assert_eq!(iv.end(), 93);
    /// assert_eq!(iv.length(), 14);
    /// ```
    pub fn new(start: Coord, length: u64) -> Self {
        let length = Coord::try_from(length).unwrap_or(Coord::MAX);
        Self {
            start,
            end: start.saturating_add(length),
        }
    }

    /// Create an interval from half-open bounds
    ///
    /// When `end < start` the result is the empty interval at `start`.
    pub fn from_bounds(start: Coord, end: Coord) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Empty interval positioned at `start`
    pub fn empty(start: Coord) -> Self {
        Self { start, end: start }
    }

    #[inline]
    pub fn start(&self) -> Coord {
        self.start
    }

    /// Exclusive end
    #[inline]
    pub fn end(&self) -> Coord {
        self.end
    }

    #[inline]
    pub fn length(&self) -> u64 {
        self.end.abs_diff(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check whether `value` lies in `[start, end)`
    #[inline]
    pub fn contains(&self, value: Coord) -> bool {
        self.start <= value && value < self.end
    }

    /// Check whether `other` lies entirely inside this interval
    pub fn contains_interval(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check whether the two intervals share at least one value
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// Overlapping sub-range of `self` and `other`
    ///
    /// Disjoint inputs produce an empty interval; check [`Interval::is_empty`]
    /// rather than comparing against a sentinel.
    ///
    /// # Examples
    /// ```
    /// use interval_remap::Interval;
    /// let a = Interval::from_bounds(0, 100);
    /// let b = Interval::from_bounds(50, 150);
    /// assert_eq!(a.intersect(&b), Interval::from_bounds(50, 100));
    /// assert!(a.intersect(&Interval::from_bounds(200, 300)).is_empty());
    /// ```
    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval::from_bounds(self.start.max(other.start), self.end.min(other.end))
    }

    /// Parts of `self` that lie outside `other`
    ///
    /// At most two pieces, left remainder first. Empty pieces are never
    /// returned.
    ///
    /// # Examples
    /// ```
    /// use interval_remap::Interval;
    /// let a = Interval::from_bounds(0, 10);
    /// let hole = Interval::from_bounds(3, 5);
    /// assert_eq!(
    ///     a.subtract(&hole),
    ///     vec![Interval::from_bounds(0, 3), Interval::from_bounds(5, 10)]
    /// );
    /// ```
    pub fn subtract(&self, other: &Interval) -> Vec<Interval> {
        let mut remainders = Vec::with_capacity(2);
        if other.is_empty() {
            if !self.is_empty() {
                remainders.push(*self);
            }
            return remainders;
        }

        if other.start > self.start {
            let left = Interval::from_bounds(self.start, other.start.min(self.end));
            if !left.is_empty() {
                remainders.push(left);
            }
        }
        if other.end < self.end {
            let right = Interval::from_bounds(other.end.max(self.start), self.end);
            if !right.is_empty() {
                remainders.push(right);
            }
        }
        remainders
    }

    /// Translate by a signed offset, keeping the length
    ///
    /// Saturates at the coordinate bounds.
    #[inline]
    pub fn shift(&self, offset: Coord) -> Interval {
        Interval::new(self.start.saturating_add(offset), self.length())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl From<std::ops::Range<Coord>> for Interval {
    fn from(range: std::ops::Range<Coord>) -> Self {
        Interval::from_bounds(range.start, range.end)
    }
}

/// Sum of lengths over a collection of intervals
///
/// Working sets may overlap, so the sum can exceed any single length.
pub fn total_length(intervals: &[Interval]) -> u128 {
    intervals.iter().map(|iv| u128::from(iv.length())).sum()
}

/// Lowest start among the non-empty intervals
pub fn lowest_start(intervals: &[Interval]) -> Option<Coord> {
    intervals
        .iter()
        .filter(|iv| !iv.is_empty())
        .map(Interval::start)
        .min()
}

/// Merge overlapping or adjacent intervals
///
/// Sorts by start, drops empty intervals and joins any interval that
/// begins at or before the end of the previous one. The result is sorted
/// and pairwise disjoint with gaps between neighbours.
pub fn coalesce(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.retain(|iv| !iv.is_empty());
    if intervals.len() < 2 {
        return intervals;
    }

    intervals.sort_unstable_by_key(|iv| iv.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(curr) if iv.start <= curr.end => {
                curr.end = curr.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    merged
}
