//! Scoped working copy of an extracted container
//!
//! The working copy and its snapshot live in a temporary directory that is
//! removed when the workspace is dropped, whichever way the run ends.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::Result;

#[derive(Debug)]
pub struct Workspace {
    root: TempDir,
    working: PathBuf,
    snapshot: Option<PathBuf>,
}

impl Workspace {
    /// Copies `source` into a fresh temporary working directory
    pub fn stage(source: &Path) -> Result<Self> {
        let root = tempfile::Builder::new().prefix("docsweep-").tempdir()?;
        let working = root.path().join("working");
        copy_tree(source, &working)?;
        debug!("Staged {} into {}", source.display(), working.display());
        Ok(Self {
            root,
            working,
            snapshot: None,
        })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working
    }

    pub fn snapshot_dir(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// Copies the working directory aside; a later snapshot replaces it
    pub fn snapshot(&mut self) -> Result<()> {
        let name = format!("snapshot-{}", Utc::now().format("%Y%m%dT%H%M%S%3f"));
        let target = self.root.path().join(name);
        copy_tree(&self.working, &target)?;
        if let Some(previous) = self.snapshot.replace(target) {
            fs::remove_dir_all(previous)?;
        }
        debug!("Snapshot taken");
        Ok(())
    }

    /// Puts the working directory back to the last snapshot. Without a
    /// snapshot this is a no-op.
    pub fn restore(&self) -> Result<()> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };
        if self.working.exists() {
            fs::remove_dir_all(&self.working)?;
        }
        copy_tree(snapshot, &self.working)?;
        info!("Working copy restored from snapshot");
        Ok(())
    }

    /// Mirrors the working directory onto `destination`: files missing from
    /// the working copy are deleted there
    pub fn commit(&self, destination: &Path) -> Result<()> {
        for entry in WalkDir::new(destination).contents_first(true) {
            let entry = entry?;
            let relative = match entry.path().strip_prefix(destination) {
                Ok(relative) if !relative.as_os_str().is_empty() => relative,
                _ => continue,
            };
            if entry.file_type().is_file() && !self.working.join(relative).exists() {
                fs::remove_file(entry.path())?;
                debug!("Deleted {}", relative.display());
            }
        }
        copy_tree(&self.working, destination)
    }
}

fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(target)?;
    for entry in WalkDir::new(source) {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let destination = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}
