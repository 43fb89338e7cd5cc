use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::iterator::EntryIterator;
use crate::options::Options;
use crate::record::Record;
use crate::segment::SegmentIterator;

/// Problems kept verbatim in a report; the rest are only counted.
const MAX_REPORTED: usize = 20;

/// Outcome of [`verify_index`].
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Entries scanned in the index.
    pub entries: u64,
    /// Total problems found.
    pub problem_count: u64,
    /// The first problems, human-readable.
    pub problems: Vec<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.problem_count == 0
    }

    fn problem(&mut self, msg: String) {
        self.problem_count += 1;
        if self.problems.len() < MAX_REPORTED {
            warn!(problem = %msg, "index verification");
            self.problems.push(msg);
        }
    }
}

/// Check a finished index against its primary file.
///
/// - keys strictly ascend
/// - the primary line at each stored offset carries that key in the key column
///
/// Problems are collected, not returned as errors; only I/O failures and
/// undecodable index lines abort.
pub fn verify_index(index: &Path, primary: &Path, options: &Options) -> Result<VerifyReport> {
    let primary_file = File::open(primary).map_err(|e| Error::open(primary, e))?;
    let mut primary_reader = BufReader::new(primary_file);
    let mut entries = SegmentIterator::open(index)?;
    let mut report = VerifyReport::default();
    let mut previous: Option<String> = None;

    while entries.is_valid() {
        let entry = entries.entry().clone();
        report.entries += 1;

        if let Some(prev) = &previous {
            if entry.key.as_bytes() <= prev.as_bytes() {
                report.problem(format!("key {:?} not after {:?}", entry.key, prev));
            }
        }

        match Record::read_at(&mut primary_reader, entry.offset)? {
            None => report.problem(format!(
                "key {:?}: offset {} is past the end of the primary file",
                entry.key, entry.offset
            )),
            Some(record) => match record.field(options.key_column) {
                Some(found) if found == entry.key => {}
                found => report.problem(format!(
                    "key {:?}: record at offset {} has key {:?}",
                    entry.key, entry.offset, found
                )),
            },
        }

        previous = Some(entry.key);
        entries.next()?;
    }

    info!(
        entries = report.entries,
        problems = report.problem_count,
        "verified index"
    );
    Ok(report)
}
