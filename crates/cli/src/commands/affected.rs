use super::HEADING_AFFECTED;
use crate::AppResult;
use crate::session::OrbitSession;
use clap::Args;
use orbit_affected::{TouchedFile, get_affected_nodes};
use orbit_common::ReadFs;
use orbit_common::consts::ROOT_MANIFEST_FILENAME;
use orbit_common::path::standardize_separators;
use orbit_project_graph::ProjectGraph;
use starbase_utils::{fs, json};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, instrument};

#[derive(Args, Clone, Debug)]
pub struct AffectedArgs {
    #[arg(
        long,
        required = true,
        num_args = 1..,
        help = "Workspace relative files that were touched",
        help_heading = HEADING_AFFECTED
    )]
    files: Vec<String>,

    #[arg(
        long,
        help = "Previous version of the root package.json, to diff its fields",
        help_heading = HEADING_AFFECTED
    )]
    manifest_before: Option<PathBuf>,

    #[arg(long, help = "Print in JSON format")]
    json: bool,
}

/// Map the touched file list into changes. The root manifest is diffed
/// field by field when its previous contents are provided, every other file
/// is a whole-file change.
pub fn create_touched_files(
    session: &OrbitSession,
    files: &[String],
    manifest_before: Option<&PathBuf>,
) -> miette::Result<Vec<TouchedFile>> {
    let mut touched = vec![];

    for file in files {
        let file = standardize_separators(file.trim_start_matches("./"));

        match manifest_before {
            Some(before_path) if file == ROOT_MANIFEST_FILENAME => {
                let before = fs::read_file(session.working_dir.join(before_path))?;

                // A deleted manifest has no contents after the change
                let after = session.fs.read_to_string(&file).ok();

                touched.push(TouchedFile::from_contents(
                    file,
                    Some(&before),
                    after.as_deref(),
                ));
            }
            _ => {
                touched.push(TouchedFile::new(file));
            }
        }
    }

    debug!(files = touched.len(), "Collected touched files");

    Ok(touched)
}

/// Workspace projects affected by the touched files, excluding npm nodes.
pub fn get_affected_projects(
    session: &OrbitSession,
    project_graph: &ProjectGraph,
    touched_files: &[TouchedFile],
) -> Vec<String> {
    get_affected_nodes(project_graph, &session.workspace_config, touched_files)
        .into_iter()
        .filter(|name| {
            project_graph
                .nodes
                .get(name)
                .is_some_and(|node| node.is_workspace_project())
        })
        .collect()
}

#[instrument(skip(session))]
pub async fn affected(session: &OrbitSession, args: AffectedArgs) -> AppResult {
    let project_graph = session.get_project_graph()?;
    let touched_files =
        create_touched_files(session, &args.files, args.manifest_before.as_ref())?;
    let affected: BTreeSet<String> =
        get_affected_nodes(&project_graph, &session.workspace_config, &touched_files);

    if args.json {
        println!("{}", json::format(&affected, true)?);

        return Ok(None);
    }

    for name in affected {
        println!("{name}");
    }

    Ok(None)
}
