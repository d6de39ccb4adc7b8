//! Binary entrypoint for the `collate` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Trello credentials may come from a .env file.
    dotenvy::dotenv().ok();
    match collate::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
