use std::cell::RefCell;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{Error, Result};
use crate::segment::SegmentIterator;
use crate::types::Entry;

/// Check that a query key has the expected length before touching any file.
pub fn validate_key(key: &str, key_len: usize) -> Result<()> {
    if key.chars().count() != key_len {
        return Err(Error::InvalidKey {
            key: key.to_string(),
            expected: key_len,
        });
    }
    Ok(())
}

/// An opened index file. Supports point lookups without loading it.
///
/// The index is a sorted run of variable-length `key<TAB>offset` lines, so a
/// lookup is a binary search over byte positions: seek to the middle of the
/// candidate range, skip to the next line start, compare that line's key.
pub struct IndexReader {
    path: PathBuf,
    /// Wrapped in RefCell so lookups can seek through a shared reference.
    file: RefCell<BufReader<File>>,
    len: u64,
}

impl IndexReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::open(path, e))?;
        let len = file.metadata()?.len();
        Ok(IndexReader {
            path: path.to_path_buf(),
            file: RefCell::new(BufReader::new(file)),
            len,
        })
    }

    /// Size of the index file in bytes.
    pub fn len_bytes(&self) -> u64 {
        self.len
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up `key` and return the primary-file offset stored for it.
    ///
    /// Invariant: the candidates are the lines whose first byte lies in
    /// `[lo, hi)`, and `lo` is always a line start. Every step either returns
    /// or strictly shrinks the range, and only discards lines known to sort
    /// before or after `key`, so every line (the first one included) is
    /// reachable.
    pub fn find(&self, key: &str) -> Result<Option<u64>> {
        let (mut lo, mut hi) = (0u64, self.len);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let Some((start, entry, end)) = self.line_from(mid, hi)? else {
                // No line starts in [mid, hi): all candidates start before mid.
                hi = mid;
                continue;
            };
            trace!(lo, hi, mid, start, key = %entry.key, "bisect");
            match key.as_bytes().cmp(entry.key.as_bytes()) {
                Ordering::Equal => return Ok(Some(entry.offset)),
                Ordering::Less => hi = start,
                Ordering::Greater => lo = end,
            }
        }
        Ok(None)
    }

    /// Decode the first line starting at or after `pos`, if it starts before
    /// `hi`. Returns (line start, entry, line end).
    fn line_from(&self, pos: u64, hi: u64) -> Result<Option<(u64, Entry, u64)>> {
        let mut file = self.file.borrow_mut();
        let mut buf = Vec::new();

        let start = if pos == 0 {
            file.seek(SeekFrom::Start(0))?;
            0
        } else {
            // Discard the rest of the line containing byte pos-1; whatever
            // follows starts at or after pos.
            file.seek(SeekFrom::Start(pos - 1))?;
            let skipped = file.read_until(b'\n', &mut buf)?;
            pos - 1 + skipped as u64
        };
        if start >= hi {
            return Ok(None);
        }

        buf.clear();
        let read = file.read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }
        let line = std::str::from_utf8(&buf).map_err(|_| {
            Error::Corruption(format!(
                "{}: non UTF-8 line at byte {start}",
                self.path.display()
            ))
        })?;
        let entry = Entry::decode_line(line)?;
        Ok(Some((start, entry, start + read as u64)))
    }

    /// Sequential scan of every entry, in key order.
    pub fn iter(&self) -> Result<SegmentIterator> {
        SegmentIterator::open(&self.path)
    }
}
