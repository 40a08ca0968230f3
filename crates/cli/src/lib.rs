mod app;
mod app_error;
mod app_options;
pub mod commands;
mod helpers;
mod session;

pub use app::*;
pub use app_error::*;
pub use app_options::*;
pub use helpers::*;
pub use session::*;

/// Result of a command. An exit code is returned when the command completed
/// but the process should still exit unsuccessfully.
pub type AppResult = miette::Result<Option<u8>>;

/// Run the parsed command against the workspace found from the current
/// working directory.
pub async fn run_cli(cli: Cli) -> AppResult {
    let working_dir = std::env::current_dir()
        .map_err(|error| miette::miette!("Unable to determine the working directory: {error}"))?;

    let session = OrbitSession::load(&working_dir)?;

    match cli.command {
        Commands::Affected(args) => commands::affected::affected(&session, args).await,
        Commands::Graph(args) => commands::graph::graph(&session, args).await,
        Commands::Lint(args) => commands::lint::lint(&session, args).await,
        Commands::Run(args) => commands::run::run(&session, args).await,
    }
}
