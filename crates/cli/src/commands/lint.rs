use crate::AppResult;
use crate::session::OrbitSession;
use clap::Args;
use orbit_common::color;
use orbit_project_constraints::{ReachabilityCache, enforce_module_boundaries};
use tracing::instrument;

#[derive(Args, Clone, Debug)]
pub struct LintArgs {
    #[arg(long, help = "Print violations in JSON format")]
    json: bool,
}

#[instrument(skip(session))]
pub async fn lint(session: &OrbitSession, args: LintArgs) -> AppResult {
    let project_graph = session.get_project_graph()?;
    let mut cache = ReachabilityCache::new();

    let violations = enforce_module_boundaries(
        &project_graph,
        &session.workspace_config.dep_constraints,
        &mut cache,
    )?;

    if args.json {
        let messages = violations
            .iter()
            .map(|violation| violation.to_string())
            .collect::<Vec<_>>();

        println!("{}", starbase_utils::json::format(&messages, true)?);
    } else if violations.is_empty() {
        println!("{}", color::success("No module boundary violations found"));
    } else {
        for violation in &violations {
            eprintln!("{:?}", miette::Report::new(violation.clone()));
        }

        println!(
            "{}",
            color::failure(format!(
                "Found {} module boundary violations",
                violations.len()
            ))
        );
    }

    Ok(if violations.is_empty() { None } else { Some(1) })
}
