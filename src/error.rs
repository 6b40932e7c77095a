//! Error types shared by every stage of a run

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can end a run
#[derive(Debug, Error)]
pub enum Error {
    /// Cloning the remote repository failed
    #[error("failed to clone {url} into {dest:?}: {source}")]
    Fetch {
        url: String,
        dest: PathBuf,
        source: git2::Error,
    },

    /// A file selected for output is not valid UTF-8
    #[error("{path:?} is not valid UTF-8: {source}")]
    Decode {
        path: PathBuf,
        source: std::string::FromUtf8Error,
    },

    /// A source file could not be parsed as Python
    #[error("invalid syntax in {path:?} at line {line}, column {column}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    /// Wrong command-line arguments
    #[error("{0}")]
    Usage(String),

    /// Reading or writing a file failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing to an output sink failed
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    /// Directory traversal failed
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Configuration file could not be parsed
    #[error("invalid configuration in {path:?}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The Python grammar could not be loaded into the parser
    #[error("failed to load Python grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors confined to a single input file, which the skip policy may pass over
    pub fn is_per_file(&self) -> bool {
        matches!(self, Error::Decode { .. } | Error::Syntax { .. })
    }
}
