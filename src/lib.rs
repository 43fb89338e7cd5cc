//! # Sorted Index
//!
//! Builds a secondary (key → byte offset) index over a tab-separated file too
//! large to sort in memory, and answers point lookups against it straight
//! from disk.
//!
//! ## Core idea
//! Sort the file in memory-sized batches, write each batch as a sorted
//! segment, and merge segments pairwise level by level until one is left:
//! an external merge sort. The result is a sorted text file of
//! `key<TAB>offset` lines that a byte-range binary search can query with a
//! handful of seeks.

pub mod compaction;
pub mod error;
pub mod index;
pub mod iterator;
pub mod options;
pub mod record;
pub mod segment;
pub mod types;
pub mod workspace;

// Public re-exports for the top-level API
pub use error::{Error, Result};
pub use index::{BuildStats, IndexBuilder, IndexReader, VerifyReport, validate_key, verify_index};
pub use options::Options;
pub use record::Record;
pub use types::Entry;
