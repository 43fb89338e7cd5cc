pub mod merge;

pub use merge::MergeIterator;

use crate::error::Result;
use crate::types::Entry;

/// Cursor over a sorted stream of entries.
///
/// Segment files and merged views implement this so the merge engine can
/// stack them: `MergeIterator` takes two boxed cursors and is one itself.
pub trait EntryIterator {
    /// Returns the current entry. Only valid when is_valid() is true.
    fn entry(&self) -> &Entry;

    /// Returns true if the iterator is positioned at a valid entry.
    fn is_valid(&self) -> bool;

    /// Advances to the next entry. Returns error on IO failure.
    fn next(&mut self) -> Result<()>;
}

/// Drains any cursor into a vector. Handy for tests and small segments.
pub fn collect(iter: &mut dyn EntryIterator) -> Result<Vec<Entry>> {
    let mut out = Vec::new();
    while iter.is_valid() {
        out.push(iter.entry().clone());
        iter.next()?;
    }
    Ok(out)
}
