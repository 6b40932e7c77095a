//! Progress notifications
//!
//! Library code reports what it is doing through a [`Progress`] observer
//! instead of printing, so callers decide where messages go.

use std::path::Path;

/// Receives progress events from a run. Every method defaults to a no-op.
pub trait Progress {
    /// A clone is about to start
    fn fetch_started(&self, _url: &str, _dest: &Path) {}

    /// A clone finished
    fn fetch_finished(&self, _url: &str) {}

    /// A file was selected and is being read
    fn file_read(&self, _path: &Path) {}

    /// A file was left out of the output
    fn file_skipped(&self, _path: &Path, _reason: &str) {}

    /// Docstrings were extracted from a source file
    fn docstrings_found(&self, _path: &Path, _count: usize) {}

    /// An artifact was written
    fn artifact_written(&self, _path: &Path) {}
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Progress for Silent {}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn fetch_started(&self, url: &str, dest: &Path) {
        tracing::info!("Cloning {} into {:?}...", url, dest);
    }

    fn fetch_finished(&self, url: &str) {
        tracing::info!("Repository {} cloned successfully", url);
    }

    fn file_read(&self, path: &Path) {
        tracing::info!("Reading {:?}...", path);
    }

    fn file_skipped(&self, path: &Path, reason: &str) {
        tracing::warn!("Skipping {:?}: {}", path, reason);
    }

    fn docstrings_found(&self, path: &Path, count: usize) {
        tracing::debug!("Found {} docstring(s) in {:?}", count, path);
    }

    fn artifact_written(&self, path: &Path) {
        tracing::info!("Output written to {:?}", path);
    }
}
