//! COURIER CLI entry point.

use std::process::ExitCode;

use courier_cli::error::CliError;
use courier_cli::telemetry;

fn main() -> ExitCode {
    if let Err(err) = telemetry::init_logging() {
        eprintln!("{}", err);
    }

    match courier_cli::run(std::env::args().skip(1)) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        // clap renders its own help and usage errors and picks the exit code.
        Err(CliError::Usage(err)) => err.exit(),
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
