use std::process::ExitCode;

use clap::Parser;
use driver_care::lifecycle::{self, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match lifecycle::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "driver-care failed to start");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
