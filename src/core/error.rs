//! Error types for IntervalRemap
//!
//! Defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::interval::Coord;

/// Main error type for IntervalRemap operations
#[derive(Debug, Error)]
pub enum IntervalRemapError {
    /// Almanac parsing errors
    #[error("Almanac parse error: {0}")]
    AlmanacParse(#[from] AlmanacParseError),

    /// Translation table validation errors
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Remapping errors
    #[error("Remap error: {0}")]
    Remap(#[from] RemapError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors reported when validating a translation table at construction time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// An entry covers no source values
    #[error("Entry {index} has zero length (source start {source_start})")]
    EmptyEntry { index: usize, source_start: Coord },

    /// Two entries claim the same source values
    #[error(
        "Entries overlap in source space: [{first_start}, {first_end}) and [{second_start}, {second_end})"
    )]
    Overlap {
        first_start: Coord,
        first_end: Coord,
        second_start: Coord,
        second_end: Coord,
    },

    /// Source or destination range does not fit in the coordinate type
    #[error("Entry {index} overflows the coordinate range (start {start}, length {length})")]
    Overflow { index: usize, start: Coord, length: u64 },

    /// Validation failed for a specific stage of a pipeline
    #[error("Stage {stage}: {source}")]
    Stage {
        stage: usize,
        #[source]
        source: Box<TableError>,
    },
}

/// Errors that can occur while running a remapping
#[derive(Debug, Error)]
pub enum RemapError {
    /// The dedicated worker pool could not be created
    #[error("Failed to create thread pool with {threads} threads: {message}")]
    ThreadPool { threads: usize, message: String },
}

/// Specific kinds of almanac parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlmanacParseErrorKind {
    /// Missing or malformed `seeds:` line
    InvalidSeeds,
    /// Malformed `<from>-to-<to> map:` header
    InvalidHeader,
    /// Malformed `destination source length` line
    InvalidEntry,
    /// Failed to parse a numeric value
    InvalidNumber,
    /// Entry found before any map header
    UnexpectedEntry,
}

/// Errors that can occur during almanac parsing
#[derive(Debug, Error)]
pub enum AlmanacParseError {
    /// Malformed line, with the 1-based line number it was found on
    #[error("Line {line}: {message}")]
    Syntax {
        line: usize,
        kind: AlmanacParseErrorKind,
        message: String,
    },

    /// Input contained no `seeds:` line
    #[error("Missing 'seeds:' line")]
    MissingSeeds,

    /// Input file not found
    #[error("Almanac file not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error during parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AlmanacParseError {
    /// Create a syntax error at the given line
    pub fn syntax(kind: AlmanacParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        AlmanacParseError::Syntax {
            line,
            kind,
            message: message.into(),
        }
    }

    /// Create an invalid number error
    pub fn invalid_number(field: &str, value: &str, line: usize) -> Self {
        Self::syntax(
            AlmanacParseErrorKind::InvalidNumber,
            line,
            format!("Invalid {} value '{}': expected an integer", field, value),
        )
    }

    /// Line number of the error, if it has one
    pub fn line_number(&self) -> Option<usize> {
        match self {
            AlmanacParseError::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Check if this is a specific kind of syntax error
    pub fn is_kind(&self, kind: AlmanacParseErrorKind) -> bool {
        matches!(self, AlmanacParseError::Syntax { kind: k, .. } if *k == kind)
    }
}

/// Result type alias for IntervalRemap operations
pub type Result<T> = std::result::Result<T, IntervalRemapError>;

/// Result type alias for table validation
pub type TableResult<T> = std::result::Result<T, TableError>;

/// Result type alias for remapping operations
pub type RemapResult<T> = std::result::Result<T, RemapError>;

/// Result type alias for almanac parsing
pub type AlmanacResult<T> = std::result::Result<T, AlmanacParseError>;
