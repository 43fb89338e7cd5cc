use std::path::PathBuf;

use crate::error::{Error, Result};

/// Entries held in memory per sort block.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Zero-based column holding the key (the NIS column in the benefit-payment
/// dataset this tool was first written for).
pub const DEFAULT_KEY_COLUMN: usize = 7;

/// Length every query key must have.
pub const DEFAULT_KEY_LEN: usize = 14;

/// Tuning and layout knobs for building and querying an index.
#[derive(Debug, Clone)]
pub struct Options {
    /// Maximum entries sorted in memory before a segment is written.
    pub batch_size: usize,
    /// Zero-based tab-separated column holding the key.
    pub key_column: usize,
    /// Expected length of query keys.
    pub key_len: usize,
    /// Whether the first line of the primary file is a header.
    pub skip_header: bool,
    /// Parent directory for the build workspace. `None` puts it next to the
    /// output index so promotion is a plain rename.
    pub work_dir: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            batch_size: DEFAULT_BATCH_SIZE,
            key_column: DEFAULT_KEY_COLUMN,
            key_len: DEFAULT_KEY_LEN,
            skip_header: true,
            work_dir: None,
        }
    }
}

impl Options {
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn key_column(mut self, key_column: usize) -> Self {
        self.key_column = key_column;
        self
    }

    pub fn key_len(mut self, key_len: usize) -> Self {
        self.key_len = key_len;
        self
    }

    pub fn skip_header(mut self, skip_header: bool) -> Self {
        self.skip_header = skip_header;
        self
    }

    pub fn work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    /// Reject settings the builder cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::InvalidOptions("batch_size must be > 0".into()));
        }
        if self.key_len == 0 {
            return Err(Error::InvalidOptions("key_len must be > 0".into()));
        }
        Ok(())
    }
}
