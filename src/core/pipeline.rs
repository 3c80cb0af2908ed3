//! Multi-stage composition
//!
//! A [`Pipeline`] pushes a working set of intervals through each
//! [`TranslationTable`] in order. Stage `i + 1` sees the complete output of
//! stage `i`; fragments from different initial ranges never interact, which
//! is what makes [`Pipeline::execute_parallel`] safe without locking.

use log::debug;
use rayon::prelude::*;

use crate::core::error::{TableError, TableResult};
use crate::core::interval::{Coord, Interval};
use crate::core::table::{TranslationEntry, TranslationTable};

/// Ordered list of stages, stage 0 applied first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<TranslationTable>,
}

impl Pipeline {
    pub fn new(stages: Vec<TranslationTable>) -> Self {
        Self { stages }
    }

    /// Build from per-stage `(destination, source, length)` triples without
    /// validation
    pub fn from_triples<S>(stages: S) -> Self
    where
        S: IntoIterator,
        S::Item: IntoIterator<Item = (Coord, Coord, u64)>,
    {
        let stages = stages
            .into_iter()
            .map(|triples| {
                triples
                    .into_iter()
                    .map(|(d, s, l)| TranslationEntry::from_triple(d, s, l))
                    .collect::<TranslationTable>()
            })
            .collect();
        Self::new(stages)
    }

    /// Build from per-stage triples, validating every stage
    ///
    /// The first failing stage is reported as [`TableError::Stage`].
    pub fn try_from_triples<S>(stages: S) -> TableResult<Self>
    where
        S: IntoIterator,
        S::Item: IntoIterator<Item = (Coord, Coord, u64)>,
    {
        let stages = stages
            .into_iter()
            .enumerate()
            .map(|(stage, triples)| {
                let entries = triples
                    .into_iter()
                    .map(|(d, s, l)| TranslationEntry::from_triple(d, s, l))
                    .collect();
                TranslationTable::try_new(entries).map_err(|e| TableError::Stage {
                    stage,
                    source: Box::new(e),
                })
            })
            .collect::<TableResult<Vec<_>>>()?;
        Ok(Self::new(stages))
    }

    pub fn stages(&self) -> &[TranslationTable] {
        &self.stages
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Push `initial` through every stage
    ///
    /// Each stage replaces the working set with the concatenation of
    /// `stage.map_range(r)` over every `r`. No merging happens between or
    /// after stages.
    ///
    /// # Examples
    /// ```
    /// use interval_remap::{Interval, Pipeline};
    /// let pipeline = Pipeline::from_triples(vec![
    ///     vec![(110, 10, 10)],
    ///     vec![(0, 115, 3)],
    /// ]);
    /// let out = pipeline.execute(&[Interval::new(10, 10)]);
    /// assert_eq!(out.iter().map(|iv| iv.length()).sum::<u64>(), 10);
    /// ```
    pub fn execute(&self, initial: &[Interval]) -> Vec<Interval> {
        let mut working = initial.to_vec();
        for (i, stage) in self.stages.iter().enumerate() {
            working = apply_stage(stage, &working);
            debug!("Stage {}: {} fragments", i, working.len());
        }
        working
    }

    /// Data-parallel variant of [`Pipeline::execute`]
    ///
    /// One task per initial range on the current rayon pool. Output order
    /// matches [`Pipeline::execute`].
    pub fn execute_parallel(&self, initial: &[Interval]) -> Vec<Interval> {
        initial
            .par_iter()
            .map(|&range| self.run_single(range))
            .flatten_iter()
            .collect()
    }

    fn run_single(&self, range: Interval) -> Vec<Interval> {
        self.stages
            .iter()
            .fold(vec![range], |working, stage| apply_stage(stage, &working))
    }

    /// Map one value through every stage
    pub fn map_point(&self, value: Coord) -> Coord {
        self.stages
            .iter()
            .fold(value, |v, stage| stage.map_point(v))
    }
}

/// Replace a working set with its image under one stage
pub(crate) fn apply_stage(stage: &TranslationTable, working: &[Interval]) -> Vec<Interval> {
    let mut next = Vec::with_capacity(working.len());
    for &range in working {
        stage.map_range_with(range, |seg| next.push(seg.target));
    }
    next
}

impl FromIterator<TranslationTable> for Pipeline {
    fn from_iter<I: IntoIterator<Item = TranslationTable>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interval::{lowest_start, total_length};

    fn iv(start: Coord, end: Coord) -> Interval {
        Interval::from_bounds(start, end)
    }

    fn sorted(mut v: Vec<Interval>) -> Vec<Interval> {
        v.sort();
        v
    }

    /// The seven stages of the reference almanac
    fn reference_pipeline() -> Pipeline {
        Pipeline::from_triples(vec![
            vec![(50, 98, 2), (52, 50, 48)],
            vec![(0, 15, 37), (37, 52, 2), (39, 0, 15)],
            vec![(49, 53, 8), (0, 11, 42), (42, 0, 7), (57, 7, 4)],
            vec![(88, 18, 7), (18, 25, 70)],
            vec![(45, 77, 23), (81, 45, 19), (68, 64, 13)],
            vec![(0, 69, 1), (1, 0, 69)],
            vec![(60, 56, 37), (56, 93, 4)],
        ])
    }

    #[test]
    fn test_two_stage_scenario() {
        let pipeline = Pipeline::from_triples(vec![vec![(110, 10, 10)], vec![(0, 115, 3)]]);
        let out = pipeline.execute(&[iv(10, 20)]);
        assert_eq!(sorted(out.clone()), vec![iv(0, 3), iv(110, 115), iv(118, 120)]);
        assert_eq!(total_length(&out), 10);
    }

    #[test]
    fn test_reference_points() {
        let pipeline = reference_pipeline();
        assert_eq!(pipeline.map_point(79), 82);
        assert_eq!(pipeline.map_point(14), 43);
        assert_eq!(pipeline.map_point(55), 86);
        assert_eq!(pipeline.map_point(13), 35);
    }

    #[test]
    fn test_reference_ranges() {
        let pipeline = reference_pipeline();
        let initial = [Interval::new(79, 14), Interval::new(55, 13)];
        let out = pipeline.execute(&initial);
        assert_eq!(total_length(&out), 27);
        assert_eq!(lowest_start(&out), Some(46));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pipeline = reference_pipeline();
        let initial = [Interval::new(79, 14), Interval::new(55, 13), Interval::new(0, 100)];
        assert_eq!(pipeline.execute(&initial), pipeline.execute_parallel(&initial));
    }

    #[test]
    fn test_empty_inputs() {
        let pipeline = reference_pipeline();
        assert!(pipeline.execute(&[]).is_empty());
        assert!(pipeline.execute_parallel(&[]).is_empty());
    }

    #[test]
    fn test_identity_pipeline() {
        let pipeline: Pipeline = (0..3).map(|_| TranslationTable::identity()).collect();
        let initial = vec![iv(5, 10), iv(0, 3)];
        assert_eq!(pipeline.execute(&initial), initial);
        assert_eq!(pipeline.stage_count(), 3);
    }

    #[test]
    fn test_no_stages() {
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.execute(&[iv(1, 2)]), vec![iv(1, 2)]);
        assert_eq!(pipeline.map_point(7), 7);
    }

    #[test]
    fn test_try_from_triples_reports_stage() {
        let result = Pipeline::try_from_triples(vec![vec![(0, 0, 5)], vec![(0, 0, 5), (10, 3, 5)]]);
        match result {
            Err(TableError::Stage { stage, source }) => {
                assert_eq!(stage, 1);
                assert!(matches!(*source, TableError::Overlap { .. }));
            }
            other => panic!("expected stage error, got {:?}", other),
        }
    }

    #[test]
    fn test_try_from_triples_valid() {
        let pipeline = Pipeline::try_from_triples(vec![vec![(50, 98, 2), (52, 50, 48)]]).unwrap();
        assert_eq!(pipeline.stage_count(), 1);
    }
}
