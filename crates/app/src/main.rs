//! Storefront CLI

use std::process::ExitCode;

use storefront_app::logging;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = logging::init_subscriber(&cli.config.logging) {
        eprintln!("{error}");
        return ExitCode::FAILURE;
    }

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
