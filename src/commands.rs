//! Command implementations behind the `blockdex` binary.
//!
//! Each function opens the index, performs one operation, reports to
//! `out`, and closes the index when it returns. Errors returned from here
//! are fatal for the command and name the file they concern; engine
//! failures during `search` and `insert` are reported and absorbed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::bulk::{self, LoadSummary};
use crate::common::{Error, IndexOptions, Result};
use crate::index::{BTreeIndex, InsertOutcome};

fn open(path: &Path, options: IndexOptions) -> Result<BTreeIndex> {
    BTreeIndex::open_with_options(path, options).map_err(|err| err.in_file(path))
}

/// `create <file>`
pub fn create(path: &Path, options: IndexOptions, out: &mut impl Write) -> Result<()> {
    BTreeIndex::create_with_options(path, options).map_err(|err| err.in_file(path))?;
    writeln!(out, "Index file {} created", path.display())?;
    Ok(())
}

/// `insert <file> <key> <value>`
///
/// A failure inside the engine is logged and reported with a
/// `Failed to insert` line; the result is then `Ok(None)`.
pub fn insert(
    path: &Path,
    key: u64,
    value: u64,
    options: IndexOptions,
    out: &mut impl Write,
) -> Result<Option<InsertOutcome>> {
    let mut index = open(path, options)?;
    let outcome = match index.insert(key, value) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!("insert of {key} into {} failed: {err}", path.display());
            writeln!(out, "Failed to insert {key}: {value}")?;
            return Ok(None);
        }
    };

    match outcome {
        InsertOutcome::Inserted => writeln!(out, "Inserted {key}: {value}")?,
        InsertOutcome::Updated { .. } => writeln!(out, "Updated {key}: {value}")?,
    }
    log_stats(&index);
    Ok(Some(outcome))
}

/// `search <file> <key>`
///
/// A failure while reading the tree is logged and reported as not found.
pub fn search(
    path: &Path,
    key: u64,
    options: IndexOptions,
    out: &mut impl Write,
) -> Result<Option<u64>> {
    let mut index = open(path, options)?;
    let found = match index.get(key) {
        Ok(found) => found,
        Err(err) => {
            tracing::error!("search for {key} in {} failed: {err}", path.display());
            None
        }
    };

    match found {
        Some(value) => writeln!(out, "{key}: {value}")?,
        None => writeln!(out, "Key {key} not found")?,
    }
    log_stats(&index);
    Ok(found)
}

/// `load <file> <csv>`
pub fn load(
    path: &Path,
    csv: &Path,
    options: IndexOptions,
    out: &mut impl Write,
) -> Result<LoadSummary> {
    let mut index = open(path, options)?;
    let reader = File::open(csv).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound(csv.to_path_buf()),
        _ => Error::Io(err).in_file(csv),
    })?;

    // Only reading the CSV itself can fail here
    let summary =
        bulk::load_csv(&mut index, BufReader::new(reader)).map_err(|err| err.in_file(csv))?;
    writeln!(
        out,
        "Loaded {} rows from {} ({} skipped)",
        summary.loaded(),
        csv.display(),
        summary.skipped
    )?;
    if summary.failed > 0 {
        writeln!(out, "{} rows could not be inserted", summary.failed)?;
    }
    log_stats(&index);
    Ok(summary)
}

/// `print <file>`
pub fn print(path: &Path, options: IndexOptions, out: &mut impl Write) -> Result<u64> {
    let mut index = open(path, options)?;
    let lines = bulk::write_listing(&mut index, &mut *out).map_err(|err| err.in_file(path))?;
    log_stats(&index);
    Ok(lines)
}

/// `extract <file> <output_csv>`
///
/// # Errors
/// Returns `Error::AlreadyExists` if `output` exists; it is not modified.
/// If the export fails part-way, the partial output file is removed.
pub fn extract(
    path: &Path,
    output: &Path,
    options: IndexOptions,
    out: &mut impl Write,
) -> Result<u64> {
    let mut index = open(path, options)?;
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output)
        .map_err(|err| match err.kind() {
            io::ErrorKind::AlreadyExists => Error::AlreadyExists(output.to_path_buf()),
            _ => Error::Io(err).in_file(output),
        })?;

    let rows = match bulk::write_csv(&mut index, BufWriter::new(file)) {
        Ok(rows) => rows,
        Err(err) => {
            if let Err(remove_err) = fs::remove_file(output) {
                tracing::warn!("could not remove {}: {remove_err}", output.display());
            }
            // Write failures concern the output; anything else the index
            return Err(match err {
                Error::Io(_) => err.in_file(output),
                other => other.in_file(path),
            });
        }
    };
    writeln!(out, "Extracted {rows} rows to {}", output.display())?;
    log_stats(&index);
    Ok(rows)
}

fn log_stats(index: &BTreeIndex) {
    tracing::debug!("{}: {}", index.path().display(), index.stats().snapshot());
}
