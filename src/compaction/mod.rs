//! Leveled pairwise merging of segments.
//!
//! After every batch the builder runs a normal merge: any two segments at the
//! same level fold into one a level up, which cascades like a binary counter
//! and keeps the number of live segments logarithmic in the input. At end of
//! input a forced merge ignores levels and folds everything into a single
//! segment, which becomes the index.

pub mod plan;

pub use plan::{MergeTask, plan_pass};

use tracing::debug;

use crate::error::{Error, Result};
use crate::iterator::{EntryIterator, MergeIterator};
use crate::segment::{Segment, SegmentIterator, SegmentSet, SegmentWriter};
use crate::workspace::Workspace;

/// Counters from one or more [`Compactor::run`] calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionStats {
    /// Pairwise merges performed.
    pub merges: u64,
    /// Passes that merged at least one pair.
    pub passes: u64,
}

/// Runs merge passes over the segments of one workspace.
pub struct Compactor<'a> {
    workspace: &'a Workspace,
}

impl<'a> Compactor<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Compactor { workspace }
    }

    /// Merge until nothing is left to do.
    ///
    /// Normal mode stops once no two segments share a level; forced mode
    /// stops once at most one segment remains.
    pub fn run(&self, segments: &mut SegmentSet, force: bool) -> Result<CompactionStats> {
        let mut stats = CompactionStats::default();
        loop {
            let tasks = plan_pass(&segments.keys(), force);
            if tasks.is_empty() {
                break;
            }
            stats.passes += 1;
            for task in tasks {
                self.merge(segments, task)?;
                stats.merges += 1;
            }
        }
        Ok(stats)
    }

    /// Stream two segments into a new one, then retire the inputs.
    fn merge(&self, segments: &mut SegmentSet, task: MergeTask) -> Result<Segment> {
        let [(la, ia), (lb, ib)] = task.inputs;
        let a = segments
            .get(la, ia)
            .cloned()
            .ok_or_else(|| Error::Corruption(format!("segment ({la}, {ia}) is not live")))?;
        let b = segments
            .get(lb, ib)
            .cloned()
            .ok_or_else(|| Error::Corruption(format!("segment ({lb}, {ib}) is not live")))?;

        let level = task.output_level;
        let id = segments.next_id(level);
        let path = self.workspace.segment_path(level, id);

        let mut merged = MergeIterator::new(
            Box::new(SegmentIterator::open(&a.path)?),
            Box::new(SegmentIterator::open(&b.path)?),
        )?;
        let mut writer = SegmentWriter::create(&path, level, id)?;
        while merged.is_valid() {
            writer.add(merged.entry())?;
            merged.next()?;
        }
        let output = writer.finish()?;

        debug!(
            inputs = ?task.inputs,
            level,
            id,
            entries = output.entry_count,
            "merged segments"
        );

        segments.insert(output.clone());
        for input in [&a, &b] {
            segments.remove(input.level, input.id);
            self.workspace.remove_segment(input)?;
        }
        Ok(output)
    }
}
