use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::segment::{Segment, SegmentSet};
use crate::types::{Entry, sort_and_dedup};
use crate::workspace::Workspace;

/// Writes a sorted stream of entries to a segment file.
///
/// Used during:
/// - Batch flush (memory-sorted batch → level 0 segment)
/// - Merging (two segments → one segment a level up)
///
/// Entries are written as `key<TAB>offset` lines and MUST arrive with
/// strictly increasing keys.
pub struct SegmentWriter {
    writer: BufWriter<File>,
    segment: Segment,
    /// Last key written, to enforce ordering.
    last_key: Option<String>,
}

impl SegmentWriter {
    /// Create (or truncate) the file at `path` for segment `(level, id)`.
    pub fn create(path: &Path, level: u32, id: u64) -> Result<Self> {
        let file = File::create(path)?;
        Ok(SegmentWriter {
            writer: BufWriter::new(file),
            segment: Segment {
                level,
                id,
                path: path.to_path_buf(),
                entry_count: 0,
            },
            last_key: None,
        })
    }

    /// Append an entry. Its key must be greater than the previous one.
    pub fn add(&mut self, entry: &Entry) -> Result<()> {
        if let Some(last) = &self.last_key {
            if entry.key.as_bytes() <= last.as_bytes() {
                return Err(Error::Corruption(format!(
                    "segment {} out of order: {:?} after {:?}",
                    self.segment.path.display(),
                    entry.key,
                    last
                )));
            }
        }
        self.writer.write_all(entry.encode_line().as_bytes())?;
        self.segment.entry_count += 1;
        self.last_key = Some(entry.key.clone());
        Ok(())
    }

    /// Flush buffered lines and hand back the segment descriptor.
    pub fn finish(mut self) -> Result<Segment> {
        self.writer.flush()?;
        Ok(self.segment)
    }
}

/// Sort one in-memory batch and write it as a new level 0 segment.
///
/// The segment takes the smallest id free at level 0 and is registered in
/// `segments`. The batch is left sorted and deduplicated.
pub fn write_batch(
    workspace: &Workspace,
    segments: &mut SegmentSet,
    batch: &mut Vec<Entry>,
) -> Result<Segment> {
    sort_and_dedup(batch);

    let id = segments.next_id(0);
    let path = workspace.segment_path(0, id);
    let mut writer = SegmentWriter::create(&path, 0, id)?;
    for entry in batch.iter() {
        writer.add(entry)?;
    }
    let segment = writer.finish()?;

    debug!(level = 0, id, entries = segment.entry_count, "wrote segment");
    segments.insert(segment.clone());
    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_lines_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.tsv");

        let mut writer = SegmentWriter::create(&path, 2, 7).unwrap();
        writer.add(&Entry::new("alpha", 10)).unwrap();
        writer.add(&Entry::new("omega", 0)).unwrap();
        let segment = writer.finish().unwrap();

        assert_eq!(segment.level, 2);
        assert_eq!(segment.id, 7);
        assert_eq!(segment.entry_count, 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "alpha\t10\nomega\t0\n");
    }

    #[test]
    fn rejects_unsorted_or_duplicate_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seg.tsv");

        let mut writer = SegmentWriter::create(&path, 0, 0).unwrap();
        writer.add(&Entry::new("b", 1)).unwrap();
        assert!(matches!(
            writer.add(&Entry::new("a", 2)),
            Err(Error::Corruption(_))
        ));
        assert!(writer.add(&Entry::new("b", 3)).is_err());
    }

    #[test]
    fn batch_gets_next_free_level0_id() {
        let parent = tempdir().unwrap();
        let ws = Workspace::create(parent.path()).unwrap();
        let mut set = SegmentSet::new();

        let mut batch = vec![Entry::new("c", 3), Entry::new("a", 1), Entry::new("b", 2)];
        let first = write_batch(&ws, &mut set, &mut batch).unwrap();
        let mut batch = vec![Entry::new("d", 4)];
        let second = write_batch(&ws, &mut set, &mut batch).unwrap();

        assert_eq!((first.level, first.id), (0, 0));
        assert_eq!((second.level, second.id), (0, 1));
        assert_eq!(set.len(), 2);
        assert_eq!(
            fs::read_to_string(&first.path).unwrap(),
            "a\t1\nb\t2\nc\t3\n"
        );
    }
}
