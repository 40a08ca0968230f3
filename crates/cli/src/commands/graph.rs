use crate::AppResult;
use crate::session::OrbitSession;
use clap::Args;
use orbit_common::color;
use orbit_graph_utils::GraphToDot;
use starbase_utils::{fs, json};
use std::path::PathBuf;
use tracing::instrument;

#[derive(Args, Clone, Debug)]
pub struct GraphArgs {
    #[arg(long, help = "Print the graph in DOT format instead of JSON")]
    dot: bool,

    #[arg(long, help = "Write the graph to a file instead of printing it")]
    file: Option<PathBuf>,
}

#[instrument(skip(session))]
pub async fn graph(session: &OrbitSession, args: GraphArgs) -> AppResult {
    let project_graph = session.get_project_graph()?;

    let contents = if args.dot {
        project_graph.to_dot()
    } else {
        json::format(&project_graph, true)?
    };

    match &args.file {
        Some(file) => {
            let path = session.working_dir.join(file);

            fs::write_file(&path, contents)?;

            println!("Wrote project graph to {}", color::path(&path));
        }
        None => {
            println!("{contents}");
        }
    }

    Ok(None)
}
