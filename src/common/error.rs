//! Error types for blockdex.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::config::BLOCK_SIZE;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classes of failure.
///
/// The command layer uses this to decide between aborting and carrying on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file is not a valid index, or a block is malformed.
    Format,
    /// A file that must (or must not) exist is in the wrong state.
    Precondition,
    /// Text that should hold a number does not.
    Parse,
    /// The operating system refused a read or write.
    Io,
}

/// All possible errors in blockdex.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Block 0 does not start with the magic tag.
    #[error("bad magic {:?}, not an index file", String::from_utf8_lossy(.found))]
    BadMagic { found: [u8; 8] },

    /// Fewer than a full block could be read.
    #[error("block {block} is truncated ({len} of {BLOCK_SIZE} bytes)")]
    TruncatedBlock { block: u64, len: usize },

    /// A node block decoded to something that cannot be a valid node.
    #[error("block {block} is corrupt: {reason}")]
    CorruptNode { block: u64, reason: String },

    /// `create` or `extract` target already exists.
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// Index file (or CSV input) does not exist.
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// A key or value could not be parsed as an unsigned integer.
    #[error("invalid {what} {input:?}: expected an unsigned 64-bit integer")]
    Parse { what: &'static str, input: String },

    /// Another error, tagged with the file it concerns.
    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::BadMagic { .. } | Error::TruncatedBlock { .. } | Error::CorruptNode { .. } => {
                ErrorKind::Format
            }
            Error::AlreadyExists(_) | Error::NotFound(_) => ErrorKind::Precondition,
            Error::Parse { .. } => ErrorKind::Parse,
            Error::InFile { source, .. } => source.kind(),
        }
    }

    /// Name `path` as the file this error concerns.
    ///
    /// Errors that already carry their own path, and parse errors, which
    /// concern command-line text or a CSV row, come back unchanged.
    pub fn in_file(self, path: &Path) -> Self {
        match self {
            Error::AlreadyExists(_)
            | Error::NotFound(_)
            | Error::Parse { .. }
            | Error::InFile { .. } => self,
            other => Error::InFile {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, with any file tag removed.
    pub fn root(&self) -> &Error {
        match self {
            Error::InFile { source, .. } => source.root(),
            other => other,
        }
    }

    pub(crate) fn corrupt(block: u64, reason: impl Into<String>) -> Self {
        Error::CorruptNode {
            block,
            reason: reason.into(),
        }
    }
}
