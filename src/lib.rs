//! IntervalRemap - push integer ranges through translation stages
//!
//! Each stage is a sparse, piecewise-linear mapping. Ranges are split
//! wherever a stage only partially covers them, so ranges spanning billions
//! of values are remapped without enumerating a single one.
//!
//! # Features
//!
//! - Half-open interval arithmetic over 64-bit coordinates
//! - Iterative worklist splitting, bounded by the entry count of a stage
//! - Parallel execution across initial ranges with rayon
//! - Almanac text input, plain or compressed (gzip, bzip2)
//!
//! # Example
//!
//! ```
//! use interval_remap::{Interval, Pipeline, Remapper};
//!
//! let pipeline = Pipeline::from_triples(vec![
//!     vec![(50, 98, 2), (52, 50, 48)],
//! ]);
//! let remapper = Remapper::new(pipeline);
//! let lowest = remapper.lowest(&[Interval::new(79, 14)])?;
//! assert_eq!(lowest, Some(81));
//! # Ok::<(), interval_remap::RemapError>(())
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use crate::core::{
    coalesce, lowest_start, total_length, AlmanacParseError, Coord, Interval, IntervalRemapError,
    MappingSegment, MergePolicy, Pipeline, RemapError, RemapOptions, RemapStats, Remapper,
    TableError, TranslationEntry, TranslationTable,
};
pub use formats::almanac::{parse_almanac_file, parse_almanac_str, Almanac, SeedMode};
