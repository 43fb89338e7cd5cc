use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Unified error type for index building and lookup.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error from disk operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// An input file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Query key does not have the expected length.
    #[error("invalid key {key:?}: expected {expected} characters")]
    InvalidKey { key: String, expected: usize },
    /// A primary-file record could not be parsed.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
    /// Segment or index content is not what we wrote (bad line, unsorted keys).
    #[error("Corruption: {0}")]
    Corruption(String),
    /// Options the builder cannot run with.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// A forced merge finished without a surviving segment to promote.
    #[error("no segment left to promote")]
    EmptyWorkspace,
}

impl Error {
    /// Process exit code for this error, shared by the binaries.
    ///
    /// `1` is shared with the usage errors clap reports itself.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::InvalidOptions(_) => 1,
            Error::InvalidKey { .. } => 2,
            Error::NotFound(_) => 3,
            Error::Io(_) | Error::EmptyWorkspace => 4,
            Error::MalformedRecord { .. } | Error::Corruption(_) => 5,
        }
    }

    /// Maps a failed open of `path` to [`Error::NotFound`] when the file is missing.
    pub fn open(path: &Path, e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            Error::NotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
