//! Almanac text format
//!
//! Parses the textual input that feeds a [`Pipeline`].
//!
//! # Almanac Format
//!
//! ```text
//! seeds: 79 14 55 13
//!
//! seed-to-soil map:
//! 50 98 2
//! 52 50 48
//!
//! soil-to-fertilizer map:
//! 0 15 37
//! ```
//!
//! - The `seeds:` line comes first
//! - Each block starts with a `<from>-to-<to> map:` header
//! - Entry lines contain: destination start, source start, length
//! - Blank lines end a block; lines starting with '#' are comments

use std::io::BufRead;
use std::path::Path;

use log::{debug, warn};
use memchr::memchr;

use crate::core::io::{open_reader, LineIterator};
use crate::core::{
    AlmanacParseError, AlmanacParseErrorKind, AlmanacResult, Coord, Interval, Pipeline,
    TableError, TableResult, TranslationEntry, TranslationTable,
};

/// How the `seeds:` values become initial ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedMode {
    /// Consecutive values are `(start, length)` pairs
    #[default]
    Pairs,
    /// Every value is its own length-1 range
    Points,
}

/// Parsed `<from>-to-<to> map:` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapHeader {
    pub source_category: String,
    pub destination_category: String,
}

impl MapHeader {
    /// Parse a map header line
    ///
    /// Format: `<from>-to-<to> map:`
    pub fn parse(line: &str, line_number: usize) -> AlmanacResult<Self> {
        let invalid = |message: String| {
            AlmanacParseError::syntax(AlmanacParseErrorKind::InvalidHeader, line_number, message)
        };

        let name = line
            .trim_end()
            .strip_suffix(':')
            .and_then(|rest| rest.trim_end().strip_suffix("map"))
            .map(str::trim_end)
            .ok_or_else(|| invalid(format!("Expected '<from>-to-<to> map:', got '{}'", line)))?;

        let (source, destination) = name
            .split_once("-to-")
            .ok_or_else(|| invalid(format!("Map name '{}' has no '-to-' separator", name)))?;

        if source.is_empty() || destination.is_empty() {
            return Err(invalid(format!("Map name '{}' has an empty category", name)));
        }

        Ok(Self {
            source_category: source.to_string(),
            destination_category: destination.to_string(),
        })
    }
}

impl std::fmt::Display for MapHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-to-{}", self.source_category, self.destination_category)
    }
}

/// One map block: its header and its entries in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlmanacStage {
    pub header: MapHeader,
    pub entries: Vec<TranslationEntry>,
}

/// Result of parsing an almanac
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Almanac {
    /// Raw values of the `seeds:` line
    pub seeds: Vec<Coord>,
    /// Map blocks in file order
    pub stages: Vec<AlmanacStage>,
}

impl Almanac {
    /// Initial ranges under the given seed interpretation
    ///
    /// In [`SeedMode::Pairs`] a trailing unpaired value is ignored and a
    /// negative length yields an empty range. Ranges running past
    /// `Coord::MAX` are truncated there, so a point seed of `Coord::MAX`
    /// comes out empty. Each of these cases logs a warning.
    pub fn initial_ranges(&self, mode: SeedMode) -> Vec<Interval> {
        match mode {
            SeedMode::Points => self.seeds.iter().map(|&s| seed_range(s, 1)).collect(),
            SeedMode::Pairs => {
                let pairs = self.seeds.chunks_exact(2);
                if !pairs.remainder().is_empty() {
                    warn!("Ignoring unpaired trailing seed {}", self.seeds[self.seeds.len() - 1]);
                }
                pairs
                    .map(|pair| match u64::try_from(pair[1]) {
                        Ok(length) => seed_range(pair[0], length),
                        Err(_) => {
                            warn!("Seed range {} has negative length {}", pair[0], pair[1]);
                            Interval::empty(pair[0])
                        }
                    })
                    .collect()
            }
        }
    }

    /// Build the pipeline without validating the stages
    pub fn pipeline(&self) -> Pipeline {
        self.stages
            .iter()
            .map(|stage| TranslationTable::new(stage.entries.clone()))
            .collect()
    }

    /// Build the pipeline, rejecting overlapping or degenerate entries
    pub fn try_pipeline(&self) -> TableResult<Pipeline> {
        self.stages
            .iter()
            .enumerate()
            .map(|(stage, s)| {
                TranslationTable::try_new(s.entries.clone()).map_err(|e| TableError::Stage {
                    stage,
                    source: Box::new(e),
                })
            })
            .collect::<TableResult<Vec<_>>>()
            .map(Pipeline::new)
    }

    /// Check that each stage's destination category feeds the next stage
    ///
    /// Returns the index of the first stage that does not follow on from its
    /// predecessor.
    pub fn first_broken_link(&self) -> Option<usize> {
        self.stages
            .windows(2)
            .position(|pair| pair[0].header.destination_category != pair[1].header.source_category)
            .map(|i| i + 1)
    }
}

/// Build a seed range, warning when its end does not fit in a `Coord`
fn seed_range(start: Coord, length: u64) -> Interval {
    let range = Interval::new(start, length);
    if range.length() < length {
        warn!(
            "Seed range {} of length {} truncated to {} (end exceeds {})",
            start,
            length,
            range,
            Coord::MAX
        );
    }
    range
}

fn parse_coord(field: &str, value: &str, line_number: usize) -> AlmanacResult<Coord> {
    value
        .parse::<Coord>()
        .map_err(|_| AlmanacParseError::invalid_number(field, value, line_number))
}

fn parse_seeds(rest: &str, line_number: usize) -> AlmanacResult<Vec<Coord>> {
    rest.split_whitespace()
        .map(|value| parse_coord("seed", value, line_number))
        .collect()
}

/// Parse a `destination source length` line
fn parse_entry(line: &str, line_number: usize) -> AlmanacResult<TranslationEntry> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(AlmanacParseError::syntax(
            AlmanacParseErrorKind::InvalidEntry,
            line_number,
            format!("Expected 3 fields, got {}", fields.len()),
        ));
    }

    let destination_start = parse_coord("destination start", fields[0], line_number)?;
    let source_start = parse_coord("source start", fields[1], line_number)?;
    let length = fields[2].parse::<u64>().map_err(|_| {
        AlmanacParseError::invalid_number("length", fields[2], line_number)
    })?;

    Ok(TranslationEntry::from_triple(destination_start, source_start, length))
}

/// Parse an almanac from a reader
///
/// This function handles the core parsing logic, supporting any `BufRead` source.
pub fn parse_almanac_reader<R: BufRead>(reader: R) -> AlmanacResult<Almanac> {
    let mut seeds: Option<Vec<Coord>> = None;
    let mut stages: Vec<AlmanacStage> = Vec::new();
    let mut in_block = false;
    let mut lines = LineIterator::new(reader).with_comment_prefix('#');

    while let Some(next) = lines.next_line() {
        let (line_number, trimmed) = next?;

        // Empty line marks end of map block
        if trimmed.is_empty() {
            in_block = false;
            continue;
        }

        if let Some(colon) = memchr(b':', trimmed.as_bytes()) {
            let (label, rest) = (&trimmed[..colon], &trimmed[colon + 1..]);
            if label.trim() == "seeds" {
                if seeds.is_some() {
                    return Err(AlmanacParseError::syntax(
                        AlmanacParseErrorKind::InvalidSeeds,
                        line_number,
                        "Duplicate 'seeds:' line",
                    ));
                }
                seeds = Some(parse_seeds(rest, line_number)?);
                continue;
            }

            if !rest.trim().is_empty() {
                return Err(AlmanacParseError::syntax(
                    AlmanacParseErrorKind::InvalidHeader,
                    line_number,
                    format!("Unexpected content after ':' in '{}'", trimmed),
                ));
            }
            let header = MapHeader::parse(trimmed, line_number)?;
            debug!("Line {}: map block {}", line_number, header);
            stages.push(AlmanacStage {
                header,
                entries: Vec::new(),
            });
            in_block = true;
            continue;
        }

        let stage = match stages.last_mut() {
            Some(stage) if in_block => stage,
            _ => {
                return Err(AlmanacParseError::syntax(
                    AlmanacParseErrorKind::UnexpectedEntry,
                    line_number,
                    format!("Entry '{}' outside of a map block", trimmed),
                ));
            }
        };
        stage.entries.push(parse_entry(trimmed, line_number)?);
    }

    let seeds = seeds.ok_or(AlmanacParseError::MissingSeeds)?;
    Ok(Almanac { seeds, stages })
}

/// Parse an almanac held in memory
pub fn parse_almanac_str(input: &str) -> AlmanacResult<Almanac> {
    parse_almanac_reader(input.as_bytes())
}

/// Parse an almanac from a path
///
/// Automatically detects and handles compression:
/// - .gz extension or gzip magic bytes (1f 8b)
/// - .bz2 extension or bzip2 magic bytes (42 5a 68)
/// - Plain text otherwise
pub fn parse_almanac_file<P: AsRef<Path>>(path: P) -> AlmanacResult<Almanac> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AlmanacParseError::FileNotFound(path.to_path_buf()));
    }
    parse_almanac_reader(open_reader(path)?)
}
