//! Line-oriented bulk I/O over an index.
//!
//! - [`load_csv`] - Insert every `key,value` row of a CSV stream
//! - [`write_csv`] - Export all pairs as `key,value` rows
//! - [`write_listing`] - Dump all pairs as `key: value` lines
//!
//! Rows that fail to parse are skipped with a warning rather than aborting
//! the load.

use std::io::{BufRead, Write};

use crate::common::{Error, Result};
use crate::index::{BTreeIndex, InsertOutcome};

/// Tally of a [`load_csv`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Rows whose key was new.
    pub inserted: u64,
    /// Rows that overwrote an existing key.
    pub updated: u64,
    /// Malformed rows.
    pub skipped: u64,
    /// Well-formed rows the index failed to store.
    pub failed: u64,
}

impl LoadSummary {
    /// Rows that made it into the index.
    pub fn loaded(&self) -> u64 {
        self.inserted + self.updated
    }
}

/// Parse an unsigned 64-bit integer, naming `what` in the error.
///
/// Surrounding whitespace is ignored.
pub fn parse_u64(what: &'static str, input: &str) -> Result<u64> {
    input.trim().parse::<u64>().map_err(|_| Error::Parse {
        what,
        input: input.to_string(),
    })
}

/// Parse one `key,value` row.
///
/// # Errors
/// `Error::Parse` if the row does not have exactly two fields or either
/// field is not an unsigned integer.
pub fn parse_row(line: &str) -> Result<(u64, u64)> {
    let mut fields = line.split(',');
    match (fields.next(), fields.next(), fields.next()) {
        (Some(key), Some(value), None) => Ok((parse_u64("key", key)?, parse_u64("value", value)?)),
        _ => Err(Error::Parse {
            what: "row",
            input: line.to_string(),
        }),
    }
}

/// Insert every row of `reader` into `index`.
///
/// Blank lines are ignored. Malformed rows are counted as skipped and
/// logged; rows the index fails to store are counted as failed and logged.
///
/// # Errors
/// Only a failure to read `reader` itself aborts the load.
pub fn load_csv<R: BufRead>(index: &mut BTreeIndex, reader: R) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let (key, value) = match parse_row(&line) {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!("skipping line {}: {}", line_no + 1, err);
                summary.skipped += 1;
                continue;
            }
        };

        match index.insert(key, value) {
            Ok(InsertOutcome::Inserted) => summary.inserted += 1,
            Ok(InsertOutcome::Updated { .. }) => summary.updated += 1,
            Err(err) => {
                tracing::error!("failed to insert line {} ({key},{value}): {}", line_no + 1, err);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Write every pair as a `key,value` row, in ascending key order.
///
/// Returns the number of rows written.
pub fn write_csv<W: Write>(index: &mut BTreeIndex, mut out: W) -> Result<u64> {
    let mut rows = 0;
    for entry in index.iter() {
        let (key, value) = entry?;
        writeln!(out, "{key},{value}")?;
        rows += 1;
    }
    out.flush()?;
    Ok(rows)
}

/// Write every pair as a `key: value` line, in ascending key order.
///
/// Returns the number of lines written.
pub fn write_listing<W: Write>(index: &mut BTreeIndex, mut out: W) -> Result<u64> {
    let mut lines = 0;
    for entry in index.iter() {
        let (key, value) = entry?;
        writeln!(out, "{key}: {value}")?;
        lines += 1;
    }
    out.flush()?;
    Ok(lines)
}
