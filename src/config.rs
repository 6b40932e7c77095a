//! Run configuration for docme

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "docme.toml";

/// Configuration for a docme run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Extensions collected in single-repo mode
    #[serde(default = "default_doc_extensions")]
    pub doc_extensions: Vec<String>,

    /// Extensions collected from the documentation repo in combined mode
    #[serde(default = "default_markdown_extensions")]
    pub markdown_extensions: Vec<String>,

    /// Extensions handed to the docstring extractor
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,

    /// Markdown files containing this substring are toctree placeholders
    #[serde(default = "default_toctree_marker")]
    pub toctree_marker: String,

    /// Directory names that are never descended into
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,

    /// Order in which syntax tree nodes are visited
    #[serde(default)]
    pub traversal: Traversal,

    /// What to do with a file that cannot be decoded or parsed
    #[serde(default)]
    pub on_error: FailurePolicy,

    /// Header written before the Markdown dump in combined mode
    #[serde(default = "default_docs_header")]
    pub docs_header: String,

    /// Header written before the docstring dump in combined mode
    #[serde(default = "default_docstrings_header")]
    pub docstrings_header: String,
}

/// Syntax tree traversal order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    /// Level by level, like Python's `ast.walk`
    #[default]
    BreadthFirst,
    /// Pre-order, each definition followed by its nested definitions
    DepthFirst,
}

/// Policy for per-file decode and syntax errors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first bad file ends the run
    #[default]
    Abort,
    /// Bad files are logged and left out of the output
    Skip,
}

fn default_doc_extensions() -> Vec<String> {
    vec!["rst".to_string(), "md".to_string()]
}

fn default_markdown_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

fn default_source_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_toctree_marker() -> String {
    "{toctree}".to_string()
}

fn default_ignore_dirs() -> Vec<String> {
    vec![".git".to_string()]
}

fn default_docs_header() -> String {
    "# Manual Documentation".to_string()
}

fn default_docstrings_header() -> String {
    "# Library Docstrings".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            doc_extensions: default_doc_extensions(),
            markdown_extensions: default_markdown_extensions(),
            source_extensions: default_source_extensions(),
            toctree_marker: default_toctree_marker(),
            ignore_dirs: default_ignore_dirs(),
            traversal: Traversal::default(),
            on_error: FailurePolicy::default(),
            docs_header: default_docs_header(),
            docstrings_header: default_docstrings_header(),
        }
    }
}

impl Config {
    /// Parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise `./docme.toml` and then the
    /// user configuration directory are tried before falling back to defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        for candidate in Self::search_paths() {
            if candidate.is_file() {
                tracing::debug!("Using configuration from {:?}", candidate);
                return Self::load(&candidate);
            }
        }

        Ok(Self::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("docme").join("config.toml"));
        }
        paths
    }
}
