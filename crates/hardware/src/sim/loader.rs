//! Trace Loader.
//!
//! This module turns a Valgrind-style memory trace into [`TraceRecord`]s. It performs:
//! 1. **Filtering:** Only lines starting with a space describe data accesses; instruction
//!    fetches (`I ...` in column zero) and blank lines are skipped.
//! 2. **Tokenizing:** ` <op> <hex-address>,<decimal-size>` with `op` one of `L`, `S`, `M`.
//! 3. **Validation:** Malformed fields and spans that wrap the address space are rejected
//!    with the 1-based line number.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::common::constants::{DATA_ACCESS_MARKER, SIZE_SEPARATOR};
use crate::common::{AccessKind, TraceError};

/// One parsed memory access from a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceRecord {
    /// Operation kind.
    pub kind: AccessKind,
    /// First byte accessed.
    pub address: u64,
    /// Number of bytes accessed.
    pub size: u32,
}

impl TraceRecord {
    /// Creates a record.
    pub const fn new(kind: AccessKind, address: u64, size: u32) -> Self {
        Self {
            kind,
            address,
            size,
        }
    }

    /// Shorthand for a load record.
    pub const fn load(address: u64, size: u32) -> Self {
        Self::new(AccessKind::Load, address, size)
    }

    /// Shorthand for a store record.
    pub const fn store(address: u64, size: u32) -> Self {
        Self::new(AccessKind::Store, address, size)
    }

    /// Shorthand for a modify record.
    pub const fn modify(address: u64, size: u32) -> Self {
        Self::new(AccessKind::Modify, address, size)
    }

    /// Last byte touched, or `None` for a zero-size record or one that wraps past `u64::MAX`.
    pub const fn last_byte(&self) -> Option<u64> {
        if self.size == 0 {
            return None;
        }
        self.address.checked_add(self.size as u64 - 1)
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x},{}", self.kind, self.address, self.size)
    }
}

/// Parses one trace line.
///
/// Returns `Ok(None)` for lines that carry no data access.
///
/// # Errors
///
/// Returns [`TraceError::Malformed`] if a data line has a missing or invalid field
/// and [`TraceError::SpanOverflow`] if the access would run past `u64::MAX`.
///
/// # Examples
///
/// ```
/// use csim_core::common::AccessKind;
/// use csim_core::sim::loader::parse_line;
///
/// let record = parse_line(" M 7ff0005c8,8", 1).unwrap().unwrap();
/// assert_eq!(record.kind, AccessKind::Modify);
/// assert_eq!(record.address, 0x7ff0005c8);
/// assert_eq!(record.size, 8);
///
/// assert!(parse_line("I  0400d7d4,8", 2).unwrap().is_none());
/// ```
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<TraceRecord>, TraceError> {
    let Some(body) = line.strip_prefix(DATA_ACCESS_MARKER) else {
        return Ok(None);
    };

    let malformed = |reason: String| TraceError::Malformed {
        line: line_no,
        reason,
    };

    let mut fields = body
        .split(|c: char| c.is_whitespace() || c == SIZE_SEPARATOR)
        .filter(|field| !field.is_empty());

    let Some(op) = fields.next() else {
        return Ok(None);
    };
    let mut chars = op.chars();
    let kind = match (chars.next(), chars.next()) {
        (Some(c), None) => AccessKind::from_op(c),
        _ => None,
    }
    .ok_or_else(|| malformed(format!("unknown operation '{op}'")))?;
    if !kind.is_data() {
        return Ok(None);
    }

    let address = fields
        .next()
        .ok_or_else(|| malformed("missing address".to_owned()))?;
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    let address = u64::from_str_radix(digits, 16)
        .map_err(|e| malformed(format!("invalid address '{address}': {e}")))?;

    let size = fields
        .next()
        .ok_or_else(|| malformed("missing size".to_owned()))?;
    let size = size
        .parse::<u32>()
        .map_err(|e| malformed(format!("invalid size '{size}': {e}")))?;

    let record = TraceRecord::new(kind, address, size);
    if size > 0 && record.last_byte().is_none() {
        return Err(TraceError::SpanOverflow {
            line: line_no,
            address,
            size,
        });
    }
    Ok(Some(record))
}

/// Streaming reader producing the data-access records of a trace.
#[derive(Debug)]
pub struct TraceReader<R> {
    lines: io::Lines<R>,
    line_no: usize,
    path: PathBuf,
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps any buffered reader.
    pub fn new(reader: R) -> Self {
        Self::with_path(reader, "<reader>")
    }

    /// Wraps a reader, naming it `path` in I/O errors.
    pub fn with_path(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            path: path.into(),
        }
    }

    /// Number of lines consumed so far.
    pub const fn lines_read(&self) -> usize {
        self.line_no
    }
}

impl TraceReader<BufReader<File>> {
    /// Opens a trace file.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TraceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::with_path(BufReader::new(file), path))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(TraceError::Io {
                        path: self.path.clone(),
                        source,
                    }));
                }
            };
            self.line_no += 1;
            match parse_line(&line, self.line_no) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
