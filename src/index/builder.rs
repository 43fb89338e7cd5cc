use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::compaction::Compactor;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::record::key_at;
use crate::segment::{SegmentSet, write_batch};
use crate::types::Entry;
use crate::workspace::Workspace;

/// Upper bound on entries reserved up front; larger batches grow on demand.
const MAX_BATCH_PREALLOC: usize = 64 * 1024;

/// Summary of one index build.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildStats {
    /// Data records read (header and blank lines excluded).
    pub records: u64,
    /// Entries in the final index (records minus duplicate keys).
    pub entries: u64,
    /// Level 0 segments written, one per batch.
    pub segments_written: u64,
    /// Pairwise merges performed.
    pub merges: u64,
    /// Level of the segment promoted to the index.
    pub max_level: u32,
    pub elapsed: Duration,
}

/// Builds a sorted (key, offset) index over a primary file with an external
/// merge sort.
///
/// Build process:
/// 1. Stream the primary file once, noting each line's offset before reading it
/// 2. Every `batch_size` entries: sort in memory, write a level 0 segment,
///    merge same-level segments
/// 3. At end of input: write the partial batch, force-merge down to one segment
/// 4. Promote that segment to the index path; the workspace is dropped
///
/// Peak memory is one batch plus one entry per merge input, independent of
/// the primary file's size.
pub struct IndexBuilder {
    options: Options,
}

impl IndexBuilder {
    pub fn new(options: Options) -> Self {
        IndexBuilder { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Build the index for `primary` and write it to `index`.
    pub fn build(&self, primary: &Path, index: &Path) -> Result<BuildStats> {
        self.options.validate()?;
        let started = Instant::now();

        let file = File::open(primary).map_err(|e| Error::open(primary, e))?;
        let mut reader = BufReader::new(file);

        let workspace = Workspace::create(&self.work_parent(index))?;
        let compactor = Compactor::new(&workspace);
        let mut segments = SegmentSet::new();
        let mut stats = BuildStats::default();

        info!(
            primary = %primary.display(),
            batch_size = self.options.batch_size,
            key_column = self.options.key_column,
            "building index"
        );

        let mut batch: Vec<Entry> =
            Vec::with_capacity(self.options.batch_size.min(MAX_BATCH_PREALLOC));
        let mut line = Vec::new();
        let mut offset = 0u64;
        let mut line_no = 0u64;

        loop {
            line.clear();
            let read = reader.read_until(b'\n', &mut line)?;
            if read == 0 {
                break;
            }
            let line_offset = offset;
            offset += read as u64;
            line_no += 1;

            if line_no == 1 && self.options.skip_header {
                continue;
            }
            if line.iter().all(|b| matches!(b, b'\n' | b'\r')) {
                debug!(line = line_no, "skipping blank line");
                continue;
            }

            let key = self.extract_key(&line, line_no)?;
            batch.push(Entry::new(key, line_offset));
            stats.records += 1;

            if batch.len() == self.options.batch_size {
                write_batch(&workspace, &mut segments, &mut batch)?;
                stats.segments_written += 1;
                stats.merges += compactor.run(&mut segments, false)?.merges;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            write_batch(&workspace, &mut segments, &mut batch)?;
            stats.segments_written += 1;
        }
        stats.merges += compactor.run(&mut segments, true)?.merges;

        match segments.take_single() {
            Some(segment) => {
                stats.max_level = segment.level;
                stats.entries = segment.entry_count;
                workspace.promote(&segment, index)?;
            }
            None if segments.is_empty() => workspace.promote_empty(index)?,
            None => return Err(Error::EmptyWorkspace),
        }

        stats.elapsed = started.elapsed();
        info!(
            index = %index.display(),
            records = stats.records,
            entries = stats.entries,
            segments = stats.segments_written,
            merges = stats.merges,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "index built"
        );
        Ok(stats)
    }

    /// Key column of one primary-file line.
    fn extract_key(&self, line: &[u8], line_no: u64) -> Result<String> {
        let column = self.options.key_column;
        let raw = key_at(line, column).ok_or_else(|| Error::MalformedRecord {
            line: line_no,
            reason: format!("no column {column}"),
        })?;
        if raw.is_empty() {
            return Err(Error::MalformedRecord {
                line: line_no,
                reason: format!("empty key in column {column}"),
            });
        }
        String::from_utf8(raw.to_vec()).map_err(|_| Error::MalformedRecord {
            line: line_no,
            reason: "key is not valid UTF-8".into(),
        })
    }

    /// Directory the workspace is created in.
    fn work_parent(&self, index: &Path) -> PathBuf {
        if let Some(dir) = &self.options.work_dir {
            return dir.clone();
        }
        match index.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
