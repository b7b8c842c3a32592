//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use vectext_cli::CliError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match vectext_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("vectext: {err}");
            ExitCode::FAILURE
        }
    }
}
