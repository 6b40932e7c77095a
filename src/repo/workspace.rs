//! Temporary storage scoped to a single run

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding the working copies and intermediate
/// artifacts of one run.
///
/// The directory is removed when the workspace is dropped, whichever way
/// the run ends.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh, uniquely named workspace in the system temp directory
    pub fn acquire() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("docme-")
            .tempdir()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;

        tracing::debug!("Acquired workspace {:?}", dir.path());
        Ok(Self { dir })
    }

    /// Root of the workspace
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Destination for a clone. The directory itself is not created.
    pub fn checkout_dir(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Location of an intermediate artifact
    pub fn artifact(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the workspace, reporting a failed removal
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        tracing::debug!("Releasing workspace {:?}", path);
        self.dir.close().map_err(|e| Error::io(path, e))
    }
}
