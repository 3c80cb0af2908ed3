//! Top-level remapping entry point
//!
//! [`Remapper`] owns a [`Pipeline`] and the [`RemapOptions`] that decide
//! how it runs: sequentially or on a rayon pool, and whether the working set
//! is coalesced.

use log::{debug, info};
use rayon::prelude::*;

use crate::core::error::{RemapError, RemapResult};
use crate::core::interval::{coalesce, lowest_start, total_length, Coord, Interval};
use crate::core::pipeline::{apply_stage, Pipeline};

/// When to merge overlapping or adjacent fragments
///
/// Merging never changes which values are covered; it only shrinks the
/// working set. Duplicate values arriving from different initial ranges are
/// collapsed by a merge, so total length is only preserved under `Never`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Keep every fragment as produced
    #[default]
    Never,
    /// Coalesce the working set after every stage
    BetweenStages,
    /// Coalesce once, after the last stage
    Final,
}

/// Options for a [`Remapper`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapOptions {
    pub merge: MergePolicy,
    /// `1` runs on the calling thread, `0` uses the global rayon pool,
    /// anything else builds a dedicated pool of that size
    pub threads: usize,
}

impl Default for RemapOptions {
    fn default() -> Self {
        Self {
            merge: MergePolicy::Never,
            threads: 1,
        }
    }
}

/// Statistics from one remapping run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapStats {
    pub input_ranges: usize,
    pub input_length: u128,
    /// Working set size after each stage (after merging, if enabled)
    pub stage_fragments: Vec<usize>,
    pub output_ranges: usize,
    pub output_length: u128,
}

/// Applies a pipeline to collections of initial ranges
#[derive(Debug, Clone)]
pub struct Remapper {
    pipeline: Pipeline,
    options: RemapOptions,
}

impl Remapper {
    pub fn new(pipeline: Pipeline) -> Self {
        Self::with_options(pipeline, RemapOptions::default())
    }

    pub fn with_options(pipeline: Pipeline, options: RemapOptions) -> Self {
        Self { pipeline, options }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn options(&self) -> RemapOptions {
        self.options
    }

    pub fn set_merge_policy(&mut self, merge: MergePolicy) {
        self.options.merge = merge;
    }

    /// Push `initial` through the pipeline
    pub fn remap(&self, initial: &[Interval]) -> RemapResult<Vec<Interval>> {
        self.remap_with_stats(initial).map(|(out, _)| out)
    }

    /// Lowest start of the final working set
    ///
    /// `None` when nothing reaches the end of the pipeline.
    pub fn lowest(&self, initial: &[Interval]) -> RemapResult<Option<Coord>> {
        let out = self.remap(initial)?;
        Ok(lowest_start(&out))
    }

    /// Push `initial` through the pipeline and report what happened
    pub fn remap_with_stats(&self, initial: &[Interval]) -> RemapResult<(Vec<Interval>, RemapStats)> {
        let mut stats = RemapStats {
            input_ranges: initial.len(),
            input_length: total_length(initial),
            ..Default::default()
        };

        let out = match self.options.threads {
            1 => self.run_sequential(initial, &mut stats),
            0 => self.run_parallel(initial, &mut stats),
            threads => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| RemapError::ThreadPool {
                        threads,
                        message: e.to_string(),
                    })?;
                pool.install(|| self.run_parallel(initial, &mut stats))
            }
        };

        stats.output_ranges = out.len();
        stats.output_length = total_length(&out);
        info!(
            "Remapped {} ranges through {} stages into {} ranges",
            stats.input_ranges,
            self.pipeline.stage_count(),
            stats.output_ranges
        );
        Ok((out, stats))
    }

    fn run_sequential(&self, initial: &[Interval], stats: &mut RemapStats) -> Vec<Interval> {
        let mut working = initial.to_vec();
        for (i, stage) in self.pipeline.stages().iter().enumerate() {
            working = apply_stage(stage, &working);
            if self.options.merge == MergePolicy::BetweenStages {
                working = coalesce(working);
            }
            debug!("Stage {}: {} fragments", i, working.len());
            stats.stage_fragments.push(working.len());
        }
        self.finish(working)
    }

    /// Each stage maps the working set in parallel chunks; stage boundaries
    /// stay sequential so merging and per-stage counts still apply
    fn run_parallel(&self, initial: &[Interval], stats: &mut RemapStats) -> Vec<Interval> {
        let mut working = initial.to_vec();
        for (i, stage) in self.pipeline.stages().iter().enumerate() {
            working = working
                .par_chunks(PARALLEL_CHUNK_SIZE)
                .map(|chunk| apply_stage(stage, chunk))
                .flatten_iter()
                .collect();
            if self.options.merge == MergePolicy::BetweenStages {
                working = coalesce(working);
            }
            debug!("Stage {}: {} fragments", i, working.len());
            stats.stage_fragments.push(working.len());
        }
        self.finish(working)
    }

    fn finish(&self, working: Vec<Interval>) -> Vec<Interval> {
        match self.options.merge {
            MergePolicy::Never => working,
            MergePolicy::BetweenStages | MergePolicy::Final => coalesce(working),
        }
    }
}

/// Fragments per parallel task
const PARALLEL_CHUNK_SIZE: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

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

    fn seeds() -> Vec<Interval> {
        vec![Interval::new(79, 14), Interval::new(55, 13)]
    }

    #[test]
    fn test_default_options() {
        let options = RemapOptions::default();
        assert_eq!(options.merge, MergePolicy::Never);
        assert_eq!(options.threads, 1);
    }

    #[test]
    fn test_remap_matches_pipeline() {
        let remapper = Remapper::new(reference_pipeline());
        let out = remapper.remap(&seeds()).unwrap();
        assert_eq!(out, reference_pipeline().execute(&seeds()));
    }

    #[test]
    fn test_lowest() {
        let remapper = Remapper::new(reference_pipeline());
        assert_eq!(remapper.lowest(&seeds()).unwrap(), Some(46));
        assert_eq!(remapper.lowest(&[]).unwrap(), None);
    }

    #[test]
    fn test_stats_preserve_length() {
        let remapper = Remapper::new(reference_pipeline());
        let (out, stats) = remapper.remap_with_stats(&seeds()).unwrap();
        assert_eq!(stats.input_ranges, 2);
        assert_eq!(stats.input_length, 27);
        assert_eq!(stats.output_length, 27);
        assert_eq!(stats.output_ranges, out.len());
        assert_eq!(stats.stage_fragments.len(), 7);
        assert_eq!(stats.stage_fragments.last().copied(), Some(out.len()));
    }

    #[test]
    fn test_stats_past_u64_range() {
        let full = Interval::from_bounds(Coord::MIN, Coord::MAX);
        let pipeline = Pipeline::from_triples(vec![vec![(100, 0, 10)]]);
        let initial = vec![full, full];

        let (out, stats) = Remapper::new(pipeline.clone()).remap_with_stats(&initial).unwrap();
        let expected = 2 * u128::from(full.length());
        assert!(expected > u128::from(u64::MAX));
        assert_eq!(stats.input_length, expected);
        assert_eq!(stats.output_length, expected);
        assert_eq!(out, pipeline.execute(&initial));

        let options = RemapOptions { merge: MergePolicy::Final, threads: 2 };
        let merged = Remapper::with_options(pipeline, options).remap(&initial).unwrap();
        assert_eq!(merged, vec![full]);
    }

    #[test]
    fn test_merge_policies_agree_on_lowest() {
        for merge in [MergePolicy::Never, MergePolicy::BetweenStages, MergePolicy::Final] {
            let options = RemapOptions { merge, threads: 1 };
            let remapper = Remapper::with_options(reference_pipeline(), options);
            assert_eq!(remapper.lowest(&seeds()).unwrap(), Some(46), "{:?}", merge);
        }
    }

    #[test]
    fn test_merge_produces_disjoint_output() {
        let options = RemapOptions { merge: MergePolicy::Final, threads: 1 };
        let remapper = Remapper::with_options(reference_pipeline(), options);
        let out = remapper.remap(&seeds()).unwrap();
        for pair in out.windows(2) {
            assert!(pair[0].end() < pair[1].start());
        }
    }

    #[test]
    fn test_threaded_matches_sequential() {
        let sequential = Remapper::new(reference_pipeline()).remap(&seeds()).unwrap();
        for threads in [0, 2, 4] {
            let options = RemapOptions { merge: MergePolicy::Never, threads };
            let out = Remapper::with_options(reference_pipeline(), options)
                .remap(&seeds())
                .unwrap();
            assert_eq!(out, sequential, "threads = {}", threads);
        }
    }

    #[test]
    fn test_set_merge_policy() {
        let mut remapper = Remapper::new(reference_pipeline());
        remapper.set_merge_policy(MergePolicy::Final);
        assert_eq!(remapper.options().merge, MergePolicy::Final);
    }
}
