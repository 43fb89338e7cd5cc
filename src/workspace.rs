use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::Result;
use crate::segment::Segment;

/// Scratch directory owned by one index build.
///
/// Created when the build starts and removed when the handle is dropped,
/// whether the build succeeded or failed. Each build gets a uniquely named
/// directory, so two builds pointed at the same parent do not see each
/// other's segments.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace under `parent` (created if missing).
    pub fn create(parent: &Path) -> Result<Self> {
        fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(".sorted-index-")
            .tempdir_in(parent)?;
        debug!(path = %dir.path().display(), "created workspace");
        Ok(Workspace { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the segment `(level, id)` lives.
    pub fn segment_path(&self, level: u32, id: u64) -> PathBuf {
        self.dir.path().join(Segment::file_name(level, id))
    }

    /// Delete a segment that has been merged into its successor.
    pub fn remove_segment(&self, segment: &Segment) -> Result<()> {
        fs::remove_file(&segment.path)?;
        Ok(())
    }

    /// Move the surviving segment to its final location.
    ///
    /// Rename when possible; if the destination is on another filesystem,
    /// copy and delete instead.
    pub fn promote(&self, segment: &Segment, dest: &Path) -> Result<()> {
        create_parent(dest)?;
        if let Err(e) = fs::rename(&segment.path, dest) {
            warn!(error = %e, "rename failed, copying segment instead");
            fs::copy(&segment.path, dest)?;
            fs::remove_file(&segment.path)?;
        }
        debug!(from = %segment.path.display(), to = %dest.display(), "promoted segment");
        Ok(())
    }

    /// Write an empty final index; the build had no records to sort.
    pub fn promote_empty(&self, dest: &Path) -> Result<()> {
        create_parent(dest)?;
        fs::File::create(dest)?;
        debug!(to = %dest.display(), "wrote empty index");
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
