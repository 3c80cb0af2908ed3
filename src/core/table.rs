//! Translation tables
//!
//! A [`TranslationTable`] is one stage of a pipeline: a sparse,
//! piecewise-linear mapping built from [`TranslationEntry`] rules. Values
//! covered by an entry are shifted by that entry's offset; every other value
//! maps to itself.
//!
//! The range algorithm follows the same shape as a liftover query:
//! 1. Find the first entry overlapping the pending fragment
//! 2. Compute the intersection of the fragment with the entry's source
//! 3. Emit the intersection shifted by the entry offset
//! 4. Push the unresolved remainders back on the work queue
//!
//! Fragments that overlap no entry are emitted unchanged.

use std::collections::VecDeque;

use log::trace;

use crate::core::error::{TableError, TableResult};
use crate::core::interval::{Coord, Interval};

/// One mapping rule: `[source_start, source_start + length)` is moved to
/// `[destination_start, destination_start + length)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TranslationEntry {
    pub source_start: Coord,
    pub destination_start: Coord,
    pub length: u64,
}

impl TranslationEntry {
    pub fn new(source_start: Coord, destination_start: Coord, length: u64) -> Self {
        Self {
            source_start,
            destination_start,
            length,
        }
    }

    /// Build from the conventional `destination source length` order
    ///
    /// # Examples
    /// ```
    /// use interval_remap::TranslationEntry;
    /// let entry = TranslationEntry::from_triple(50, 98, 2);
    /// assert_eq!(entry.source_start, 98);
    /// assert_eq!(entry.offset(), -48);
    /// ```
    pub fn from_triple(destination_start: Coord, source_start: Coord, length: u64) -> Self {
        Self::new(source_start, destination_start, length)
    }

    #[inline]
    pub fn source_interval(&self) -> Interval {
        Interval::new(self.source_start, self.length)
    }

    #[inline]
    pub fn destination_interval(&self) -> Interval {
        Interval::new(self.destination_start, self.length)
    }

    /// Signed distance from source to destination
    #[inline]
    pub fn offset(&self) -> Coord {
        self.destination_start.saturating_sub(self.source_start)
    }

    /// Map a single value if this entry covers it
    #[inline]
    pub fn map_value(&self, value: Coord) -> Option<Coord> {
        if self.source_interval().contains(value) {
            Some(value.saturating_add(self.offset()))
        } else {
            None
        }
    }

    fn check(&self, index: usize) -> TableResult<()> {
        if self.length == 0 {
            return Err(TableError::EmptyEntry {
                index,
                source_start: self.source_start,
            });
        }

        let length = Coord::try_from(self.length).ok();
        let fits = length.is_some_and(|len| {
            self.source_start.checked_add(len).is_some()
                && self.destination_start.checked_add(len).is_some()
                && self.destination_start.checked_sub(self.source_start).is_some()
        });
        if !fits {
            return Err(TableError::Overflow {
                index,
                start: self.source_start,
                length: self.length,
            });
        }
        Ok(())
    }
}

/// A piece of a mapped range: where it came from and where it landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingSegment {
    /// Source values covered by this piece
    pub source: Interval,
    /// Destination values after mapping
    pub target: Interval,
    /// Index into [`TranslationTable::entries`] of the rule that applied,
    /// `None` for the identity fallback
    pub entry: Option<usize>,
}

impl MappingSegment {
    fn identity(source: Interval) -> Self {
        Self {
            source,
            target: source,
            entry: None,
        }
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.entry.is_none()
    }
}

/// A single stage: entries sorted by source start, pairwise disjoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: Vec<TranslationEntry>,
}

impl TranslationTable {
    /// Build a table from entries without validating them
    ///
    /// Entries are sorted by source start. Overlapping entries are a
    /// precondition violation; use [`TranslationTable::try_new`] to reject
    /// them up front.
    pub fn new(mut entries: Vec<TranslationEntry>) -> Self {
        entries.sort_unstable_by_key(|e| e.source_start);
        Self { entries }
    }

    /// Build a table and validate it once
    ///
    /// Rejects zero-length entries, entries whose source or destination does
    /// not fit in [`Coord`], and entries that overlap in source space.
    pub fn try_new(entries: Vec<TranslationEntry>) -> TableResult<Self> {
        for (index, entry) in entries.iter().enumerate() {
            entry.check(index)?;
        }

        let table = Self::new(entries);
        for pair in table.entries.windows(2) {
            let (first, second) = (pair[0].source_interval(), pair[1].source_interval());
            if first.end() > second.start() {
                return Err(TableError::Overlap {
                    first_start: first.start(),
                    first_end: first.end(),
                    second_start: second.start(),
                    second_end: second.end(),
                });
            }
        }
        Ok(table)
    }

    /// A stage with no entries: every value maps to itself
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranslationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map a single value
    ///
    /// Binary-searches the sorted entries for one covering `value`;
    /// uncovered values are returned unchanged.
    ///
    /// # Examples
    /// ```
    /// use interval_remap::{TranslationEntry, TranslationTable};
    /// let table = TranslationTable::new(vec![
    ///     TranslationEntry::from_triple(50, 98, 2),
    ///     TranslationEntry::from_triple(52, 50, 48),
    /// ]);
    /// assert_eq!(table.map_point(79), 81);
    /// assert_eq!(table.map_point(99), 51);
    /// assert_eq!(table.map_point(13), 13);
    /// ```
    pub fn map_point(&self, value: Coord) -> Coord {
        let idx = self.entries.partition_point(|e| e.source_start <= value);
        idx.checked_sub(1)
            .and_then(|i| self.entries[i].map_value(value))
            .unwrap_or(value)
    }

    /// Map a range of values
    ///
    /// Every value of `query` appears in exactly one output interval, either
    /// shifted by the covering entry's offset or unchanged. Output intervals
    /// are not merged.
    pub fn map_range(&self, query: Interval) -> Vec<Interval> {
        let mut out = Vec::new();
        self.map_range_with(query, |seg| out.push(seg.target));
        out
    }

    /// Map a range of values, keeping the source of every output piece
    pub fn map_range_segments(&self, query: Interval) -> Vec<MappingSegment> {
        let mut out = Vec::new();
        self.map_range_with(query, |seg| out.push(*seg));
        out
    }

    /// Map a range of values, handing each resolved piece to `sink`
    ///
    /// The work queue starts with `query`. Each pending fragment is split
    /// against at most one entry per iteration; the intersection is emitted
    /// and the leftovers are queued again. A fragment no entry overlaps is
    /// emitted as identity. Every split strictly shrinks the unresolved
    /// length, so the loop ends after at most one split per entry.
    pub fn map_range_with<F>(&self, query: Interval, mut sink: F)
    where
        F: FnMut(&MappingSegment),
    {
        if query.is_empty() {
            return;
        }

        let mut work = VecDeque::with_capacity(4);
        work.push_back(query);

        while let Some(pending) = work.pop_front() {
            let Some(index) = self.first_overlap(&pending) else {
                sink(&MappingSegment::identity(pending));
                continue;
            };

            let entry = &self.entries[index];
            let hit = entry.source_interval().intersect(&pending);
            let segment = MappingSegment {
                source: hit,
                target: hit.shift(entry.offset()),
                entry: Some(index),
            };
            trace!("{} hit entry {} -> {}", pending, index, segment.target);
            sink(&segment);

            if hit != pending {
                work.extend(pending.subtract(&hit));
            }
        }
    }

    /// Index of the first entry sharing at least one value with `query`
    fn first_overlap(&self, query: &Interval) -> Option<usize> {
        // Entries are disjoint, so source ends are sorted along with starts
        let first = self
            .entries
            .partition_point(|e| e.source_interval().end() <= query.start());

        self.entries[first..]
            .iter()
            .take_while(|e| e.source_start < query.end())
            .position(|e| e.source_interval().overlaps(query))
            .map(|offset| first + offset)
    }
}

impl FromIterator<TranslationEntry> for TranslationTable {
    fn from_iter<I: IntoIterator<Item = TranslationEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
