//! CLI interface using clap
//!
//! Provides the argument definitions shared by the `docme` and
//! `docme-combined` binaries

mod commands;

pub use commands::*;

use crate::error::{Error, Result};
use clap::error::ErrorKind;
use clap::{Args, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Exit status for wrong command-line arguments
pub const USAGE_EXIT_CODE: u8 = 2;

/// docme - flatten a repository's .rst and .md files into one text file
#[derive(Parser, Debug)]
#[command(name = "docme")]
#[command(author, version, about, long_about = None)]
pub struct SingleCli {
    /// URL of the repository to clone
    pub repository_url: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// docme-combined - Markdown docs plus library docstrings in one file
#[derive(Parser, Debug)]
#[command(name = "docme-combined")]
#[command(author, version, about, long_about = None)]
pub struct CombinedCli {
    /// URL of the documentation repository
    pub docs_repository_url: String,

    /// URL of the library source repository
    pub library_repository_url: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options accepted by both binaries
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (defaults to ./docme.toml, then the user config directory)
    #[arg(short, long, env = "DOCME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Where to write the result (defaults to the mode's file in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip files that cannot be decoded or parsed instead of aborting
    #[arg(short, long)]
    pub keep_going: bool,
}

/// Parse command line arguments.
///
/// Help and version requests print and exit; any other mistake becomes
/// [`Error::Usage`] carrying the rendered usage message.
pub fn parse_args<C, I, T>(args: I) -> Result<C>
where
    C: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    C::try_parse_from(args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        _ => Error::Usage(e.render().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_parsing() {
        let cli: SingleCli =
            parse_args(["docme", "https://example.com/repo.git", "--keep-going"]).unwrap();
        assert_eq!(cli.repository_url, "https://example.com/repo.git");
        assert!(cli.common.keep_going);
        assert!(cli.common.output.is_none());
    }

    #[test]
    fn test_combined_parsing() {
        let cli: CombinedCli =
            parse_args(["docme-combined", "docs-url", "lib-url", "-o", "out.md"]).unwrap();
        assert_eq!(cli.docs_repository_url, "docs-url");
        assert_eq!(cli.library_repository_url, "lib-url");
        assert_eq!(cli.common.output, Some(PathBuf::from("out.md")));
    }

    #[test]
    fn test_wrong_argument_count_is_usage_error() {
        let none = parse_args::<SingleCli, _, _>(["docme"]);
        assert!(matches!(none, Err(Error::Usage(msg)) if msg.contains("Usage")));

        let two = parse_args::<SingleCli, _, _>(["docme", "a", "b"]);
        assert!(matches!(two, Err(Error::Usage(_))));

        let one = parse_args::<CombinedCli, _, _>(["docme-combined", "a"]);
        assert!(matches!(one, Err(Error::Usage(_))));
    }
}
