//! Core interval remapping functionality
//!
//! This module contains interval arithmetic, translation tables,
//! pipeline composition and the top-level remapper.

mod error;
pub mod interval;
pub mod io;
mod pipeline;
mod remapper;
mod table;

pub use error::{
    AlmanacParseError, AlmanacParseErrorKind, AlmanacResult, IntervalRemapError, RemapError,
    RemapResult, Result, TableError, TableResult,
};
pub use interval::{coalesce, lowest_start, total_length, Coord, Interval};
pub use pipeline::Pipeline;
pub use remapper::{MergePolicy, RemapOptions, RemapStats, Remapper};
pub use table::{MappingSegment, TranslationEntry, TranslationTable};
