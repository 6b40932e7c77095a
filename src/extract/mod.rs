//! Documentation extraction module
//!
//! This module handles pulling human-readable text out of a working copy:
//! - Documentation files, concatenated verbatim (`doc`)
//! - Python docstrings, found with tree-sitter (`code`)

pub mod code;
pub mod doc;

pub use code::{DocRecord, DocstringExtractor, SymbolKind};
pub use doc::{toctree_placeholder, CollectSummary, CollectedFile, DocCollector};

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every file under `root`, in directory-entry order.
///
/// Directories named in `ignore_dirs` are pruned. Symbolic links to files
/// are yielded; symbolic links to directories are not followed.
pub fn walk_files<'a>(
    root: &Path,
    ignore_dirs: &'a [String],
) -> impl Iterator<Item = Result<PathBuf>> + 'a {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(move |e| {
            let ignored = ignore_dirs.iter().any(|d| e.file_name() == d.as_str());
            !(e.depth() > 0 && e.file_type().is_dir() && ignored)
        })
        .filter_map(|entry| match entry {
            Err(e) => Some(Err(Error::from(e))),
            Ok(entry) => {
                let file_type = entry.file_type();
                if file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir()) {
                    None
                } else {
                    Some(Ok(entry.into_path()))
                }
            }
        })
}

/// Whether the file name ends with `.<ext>` for one of `extensions`
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name() else {
        return false;
    };
    let name = name.to_string_lossy();
    extensions
        .iter()
        .any(|ext| name.ends_with(&format!(".{}", ext)))
}

/// Read a whole file as strict UTF-8
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    String::from_utf8(bytes).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })
}
