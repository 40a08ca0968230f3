use crate::reachability::ReachabilityCache;
use orbit_project_graph::ProjectGraph;
use tracing::trace;

/// Return the path `source -> ... -> target` when the two projects are on a
/// cycle, otherwise an empty list. See
/// [`ReachabilityMatrix::find_circular_path`](crate::ReachabilityMatrix::find_circular_path).
pub fn has_circular_path(
    cache: &mut ReachabilityCache,
    graph: &ProjectGraph,
    source: &str,
    target: &str,
) -> miette::Result<Vec<String>> {
    let path = cache.get_matrix(graph)?.find_circular_path(source, target);

    if !path.is_empty() {
        trace!(source, target, path = ?path, "Found circular path");
    }

    Ok(path)
}

/// Return the shortest path between two workspace projects, if any.
pub fn find_path(
    cache: &mut ReachabilityCache,
    graph: &ProjectGraph,
    source: &str,
    target: &str,
) -> miette::Result<Vec<String>> {
    Ok(cache.get_matrix(graph)?.find_path(source, target))
}
