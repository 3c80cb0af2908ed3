//! Input format adapters
//!
//! Parsers that turn text inputs into initial ranges and pipeline stages.

pub mod almanac;

pub use almanac::{
    parse_almanac_file, parse_almanac_reader, parse_almanac_str, Almanac, AlmanacStage,
    MapHeader, SeedMode,
};
