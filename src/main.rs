//! Binary entrypoint for the `mockwright` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    match mockwright::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
