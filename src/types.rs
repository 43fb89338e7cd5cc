use std::cmp::Ordering;

use crate::error::{Error, Result};

/// Key of a primary-file record. Compared lexicographically on raw bytes.
pub type Key = String;

/// A (key, offset) pair: the unit that flows through sorting, merging and
/// the final index.
///
/// Ordering: (key ASC, offset ASC). The offset only breaks ties between
/// duplicate keys, which keeps the order total and the duplicate policy
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    pub key: Key,
    /// Byte offset of the start of the record line in the primary file.
    pub offset: u64,
}

impl Entry {
    pub fn new(key: impl Into<Key>, offset: u64) -> Self {
        Entry {
            key: key.into(),
            offset,
        }
    }

    /// Serialize as one segment/index line.
    ///
    /// Format: `key<TAB>offset\n`
    pub fn encode_line(&self) -> String {
        format!("{}\t{}\n", self.key, self.offset)
    }

    /// Parse one segment/index line. A trailing `\n` or `\r\n` is accepted.
    pub fn decode_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let (key, offset) = line
            .split_once('\t')
            .ok_or_else(|| Error::Corruption(format!("index line without tab: {line:?}")))?;
        if key.is_empty() {
            return Err(Error::Corruption("index line with empty key".into()));
        }
        let offset = offset
            .parse::<u64>()
            .map_err(|e| Error::Corruption(format!("bad offset {offset:?}: {e}")))?;
        Ok(Entry::new(key, offset))
    }

    /// Of two entries sharing a key, the one that survives: the record that
    /// appears last in the primary file.
    pub fn newest(a: Entry, b: Entry) -> Entry {
        debug_assert_eq!(a.key, b.key);
        if b.offset >= a.offset { b } else { a }
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .as_bytes()
            .cmp(other.key.as_bytes())
            .then(self.offset.cmp(&other.offset))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort a batch in place and drop duplicate keys, keeping the entry with the
/// largest offset for each key.
pub fn sort_and_dedup(entries: &mut Vec<Entry>) {
    entries.sort_unstable();
    // After sorting, duplicates are adjacent with the largest offset last.
    // dedup_by keeps the first of a run, so walk the runs in reverse.
    entries.reverse();
    entries.dedup_by(|later, earlier| later.key == earlier.key);
    entries.reverse();
}
