use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::iterator::EntryIterator;
use crate::types::Entry;

/// Streams the entries of a segment (or a finished index) line by line.
///
/// Only the current entry is held in memory, which is what keeps a merge of
/// two arbitrarily large segments within a bounded footprint.
pub struct SegmentIterator {
    path: PathBuf,
    reader: BufReader<File>,
    line: String,
    current: Option<Entry>,
    /// 1-based line number of `current`, for error messages.
    line_no: u64,
}

impl SegmentIterator {
    /// Open a segment and position at its first entry.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::open(path, e))?;
        let mut iter = SegmentIterator {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            line: String::new(),
            current: None,
            line_no: 0,
        };
        iter.read_next()?;
        Ok(iter)
    }

    fn read_next(&mut self) -> Result<()> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            self.current = None;
            return Ok(());
        }
        self.line_no += 1;
        let entry = Entry::decode_line(&self.line).map_err(|e| {
            Error::Corruption(format!("{}:{}: {e}", self.path.display(), self.line_no))
        })?;
        self.current = Some(entry);
        Ok(())
    }
}

impl EntryIterator for SegmentIterator {
    fn entry(&self) -> &Entry {
        self.current
            .as_ref()
            .expect("entry() called on exhausted SegmentIterator")
    }

    fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    fn next(&mut self) -> Result<()> {
        self.read_next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::collect;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_back_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.tsv");
        fs::write(&path, "a\t1\nb\t22\nc\t333\n").unwrap();

        let mut iter = SegmentIterator::open(&path).unwrap();
        let entries = collect(&mut iter).unwrap();
        assert_eq!(
            entries,
            vec![Entry::new("a", 1), Entry::new("b", 22), Entry::new("c", 333)]
        );
    }

    #[test]
    fn empty_file_is_immediately_exhausted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.tsv");
        fs::write(&path, "").unwrap();

        let iter = SegmentIterator::open(&path).unwrap();
        assert!(!iter.is_valid());
    }

    #[test]
    fn missing_final_newline_is_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.tsv");
        fs::write(&path, "a\t1\nb\t2").unwrap();

        let mut iter = SegmentIterator::open(&path).unwrap();
        assert_eq!(collect(&mut iter).unwrap().len(), 2);
    }

    #[test]
    fn bad_line_reports_position() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.tsv");
        fs::write(&path, "a\t1\ngarbage\n").unwrap();

        let mut iter = SegmentIterator::open(&path).unwrap();
        let err = iter.next().unwrap_err();
        assert!(matches!(err, Error::Corruption(ref msg) if msg.contains(":2:")));
    }

    #[test]
    fn missing_segment_is_not_found() {
        let dir = tempdir().unwrap();
        let result = SegmentIterator::open(&dir.path().join("nope.tsv"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
