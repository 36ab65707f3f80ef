//! Standalone conflict fixer for an interrupted cherry-pick.
//!
//! Run with no arguments from (or copied into) the conflicted checkout. Exits
//! zero only when a cherry-pick was in progress and every two-sided conflict
//! was stripped and staged; finishing the cherry-pick is left to the operator.

use std::process::ExitCode;

fn main() -> ExitCode {
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to determine working directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    match topicsync::fixer::run(&cwd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
