pub mod reader;
pub mod writer;

pub use reader::SegmentIterator;
pub use writer::{SegmentWriter, write_batch};

use std::collections::BTreeMap;
use std::path::PathBuf;

/// A sorted temporary file produced during an index build.
///
/// Level 0 segments come straight from a memory-sorted batch; each merge
/// produces a segment one level above its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Merge generations behind this segment (0 = freshly sorted batch).
    pub level: u32,
    /// Disambiguates segments sharing a level.
    pub id: u64,
    /// Location inside the build workspace.
    pub path: PathBuf,
    /// Number of entries written.
    pub entry_count: u64,
}

impl Segment {
    /// File name for a segment; only for humans poking at a workspace.
    pub fn file_name(level: u32, id: u64) -> String {
        format!("segment_{level}_{id}.tsv")
    }
}

/// The live segments of one build, ordered by (level, id).
///
/// This is the merge worklist: the builder registers new segments here and
/// the merge engine plans from it, so the workspace directory is never
/// re-listed and file names are never parsed back.
#[derive(Debug, Default)]
pub struct SegmentSet {
    segments: BTreeMap<(u32, u64), Segment>,
}

impl SegmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smallest id not taken by a live segment at `level`.
    pub fn next_id(&self, level: u32) -> u64 {
        let mut id = 0;
        for &(_, taken) in self.segments.range((level, 0)..=(level, u64::MAX)).map(|(k, _)| k) {
            if taken != id {
                break;
            }
            id += 1;
        }
        id
    }

    pub fn insert(&mut self, segment: Segment) {
        self.segments.insert((segment.level, segment.id), segment);
    }

    pub fn remove(&mut self, level: u32, id: u64) -> Option<Segment> {
        self.segments.remove(&(level, id))
    }

    pub fn get(&self, level: u32, id: u64) -> Option<&Segment> {
        self.segments.get(&(level, id))
    }

    /// (level, id) of every live segment, ascending.
    pub fn keys(&self) -> Vec<(u32, u64)> {
        self.segments.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Takes the only remaining segment out of the set.
    pub fn take_single(&mut self) -> Option<Segment> {
        if self.segments.len() != 1 {
            return None;
        }
        self.segments.pop_first().map(|(_, segment)| segment)
    }
}
