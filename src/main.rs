//! docme - flatten a repository's documentation into output.txt
//!
//! Clones the repository given on the command line and concatenates every
//! `.rst` and `.md` file, each under a `File: <path>` header.

use docme::cli::{self, SingleCli, USAGE_EXIT_CODE};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli: SingleCli = match cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            eprint!("{}", e);
            return ExitCode::from(USAGE_EXIT_CODE);
        }
    };

    cli::init_logging(cli.common.verbose);

    match cli::single(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
