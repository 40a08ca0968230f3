use clap::Parser;
use orbit_cli::{Cli, run_cli, setup_logging};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.log);

    match run_cli(cli).await {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(code)) => ExitCode::from(code),
        Err(error) => {
            eprintln!("{error:?}");

            ExitCode::FAILURE
        }
    }
}
