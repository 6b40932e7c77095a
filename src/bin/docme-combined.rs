//! docme-combined - Markdown documentation plus library docstrings
//!
//! Clones a documentation repository and a library repository and writes
//! the Markdown dump followed by the docstring dump to combined_output.md.

use docme::cli::{self, CombinedCli, USAGE_EXIT_CODE};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli: CombinedCli = match cli::parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            eprint!("{}", e);
            return ExitCode::from(USAGE_EXIT_CODE);
        }
    };

    cli::init_logging(cli.common.verbose);

    match cli::combined(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
