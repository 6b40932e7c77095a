//! Repository fetching and run-scoped working storage
//!
//! This module handles:
//! - Cloning a remote repository into a local working copy
//! - The temporary workspace that owns every working copy of a run

mod workspace;

pub use workspace::Workspace;

use crate::error::{Error, Result};
use std::path::Path;

/// Materializes a working copy of a remote repository
pub trait Fetcher {
    /// Populate `dest` with a working copy of the default branch of `url`.
    ///
    /// A single attempt is made; any failure is returned as [`Error::Fetch`].
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Clones repositories with libgit2
#[derive(Debug, Clone, Copy, Default)]
pub struct GitFetcher;

impl GitFetcher {
    /// Create a new fetcher
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for GitFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        git2::build::RepoBuilder::new()
            .clone(url, dest)
            .map(|_| ())
            .map_err(|source| Error::Fetch {
                url: url.to_string(),
                dest: dest.to_path_buf(),
                source,
            })
    }
}

/// Build a committed git repository in `dir` holding `files`
#[cfg(test)]
pub(crate) fn init_origin(dir: &Path, files: &[(&str, &[u8])]) {
    let repo = git2::Repository::init(dir).unwrap();

    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
    }

    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = git2::Signature::now("docme", "docme@example.com").unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
        .unwrap();
}
