use crate::app_options::LogLevel;
use crate::commands::affected::AffectedArgs;
use crate::commands::graph::GraphArgs;
use crate::commands::lint::LintArgs;
use crate::commands::run::RunArgs;
use clap::{Parser, Subcommand};
use orbit_common::consts::BIN_NAME;

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    // orbit graph
    #[command(
        name = "graph",
        about = "Build the project graph and print it as JSON or DOT.",
        alias = "g"
    )]
    Graph(GraphArgs),

    // orbit affected --files ...
    #[command(
        name = "affected",
        about = "List the projects and packages affected by a set of touched files."
    )]
    Affected(AffectedArgs),

    // orbit run <target>
    #[command(
        name = "run",
        about = "Run a target for one or many projects, in dependency order.",
        alias = "r"
    )]
    Run(RunArgs),

    // orbit lint
    #[command(
        name = "lint",
        about = "Check module boundaries, circular dependencies, and tag constraints."
    )]
    Lint(LintArgs),
}

#[derive(Clone, Debug, Parser)]
#[command(
    bin_name = BIN_NAME,
    name = "orbit",
    about = "Build, cache, and run tasks across a monorepo.",
    version,
    disable_help_subcommand = true,
    propagate_version = true
)]
pub struct Cli {
    #[arg(
        value_enum,
        long,
        global = true,
        help = "Lowest log level to output, overrides ORBIT_LOG"
    )]
    pub log: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}
