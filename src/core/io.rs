//! Input helpers
//!
//! Opens plain or compressed text inputs behind a single `BufRead` and
//! provides a line iterator that reuses its buffer.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Default buffer size for BufReader (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// Compression format of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Plain text (uncompressed)
    Plain,
    /// Gzip compressed (.gz)
    Gzip,
    /// Bzip2 compressed (.bz2)
    Bzip2,
}

impl CompressionFormat {
    /// Detect format from leading bytes
    pub fn from_magic(magic: &[u8]) -> Self {
        if magic.starts_with(&[0x1f, 0x8b]) {
            CompressionFormat::Gzip
        } else if magic.starts_with(b"BZh") {
            CompressionFormat::Bzip2
        } else {
            CompressionFormat::Plain
        }
    }
}

/// Detect compression format from file path and/or content
///
/// The extension wins; otherwise the magic bytes decide.
pub fn detect_compression(path: &Path) -> io::Result<CompressionFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => return Ok(CompressionFormat::Gzip),
        Some("bz2") => return Ok(CompressionFormat::Bzip2),
        _ => {}
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 3];
    let bytes_read = file.read(&mut magic)?;
    Ok(CompressionFormat::from_magic(&magic[..bytes_read]))
}

/// Open a file for buffered reading, decompressing if needed
pub fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let format = detect_compression(path)?;
    let file = File::open(path)?;

    let reader: Box<dyn BufRead> = match format {
        CompressionFormat::Gzip => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            flate2::read::MultiGzDecoder::new(file),
        )),
        CompressionFormat::Bzip2 => Box::new(BufReader::with_capacity(
            DEFAULT_BUFFER_SIZE,
            bzip2::read::BzDecoder::new(file),
        )),
        CompressionFormat::Plain => Box::new(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file)),
    };
    Ok(reader)
}

/// Numbered, trimmed lines over a reused buffer
///
/// Comment lines are counted but never yielded, so reported line numbers
/// always match the file.
pub struct LineIterator<R: BufRead> {
    reader: R,
    buffer: String,
    line_number: usize,
    comment_prefix: Option<char>,
}

impl<R: BufRead> LineIterator<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::with_capacity(1024),
            line_number: 0,
            comment_prefix: None,
        }
    }

    /// Skip lines whose first non-blank character is `prefix`
    pub fn with_comment_prefix(mut self, prefix: char) -> Self {
        self.comment_prefix = Some(prefix);
        self
    }

    /// Next non-comment line as `(line_number, trimmed_line)`
    ///
    /// Line numbers are 1-based. Blank lines are yielded as `""`.
    pub fn next_line(&mut self) -> Option<io::Result<(usize, &str)>> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => return Some(Err(e)),
            }

            let text = self.buffer.trim_start();
            let is_comment = self.comment_prefix.is_some_and(|p| text.starts_with(p));
            if !is_comment {
                return Some(Ok((self.line_number, self.buffer.trim())));
            }
        }
    }
}
