//! docme - flatten repository documentation into plain text
//!
//! This library clones repositories, collects their Markdown and
//! reStructuredText files and extracts Python docstrings, producing flat
//! text meant to be fed to a language model.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod progress;
pub mod repo;

/// Re-export commonly used types
pub use aggregate::Aggregator;
pub use config::Config;
pub use error::{Error, Result};
pub use extract::{DocCollector, DocRecord, DocstringExtractor};
pub use repo::{Fetcher, GitFetcher, Workspace};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "docme";
