use std::collections::BTreeSet;

pub trait GraphConnections<K: Clone + Ord> {
    /// Return a list of node keys that the provided node depends on.
    fn dependencies_of(&self, key: &K) -> Vec<K>;

    /// Return a list of node keys that require the provided node.
    fn dependents_of(&self, key: &K) -> Vec<K>;

    /// Return a list of keys for all nodes currently within the graph.
    fn get_node_keys(&self) -> Vec<K>;

    /// Return every node reachable by following dependencies from the provided
    /// roots, including the roots themselves.
    fn collect_upstream(&self, roots: &[K]) -> BTreeSet<K> {
        walk(roots, |key| self.dependencies_of(key))
    }

    /// Return every node that has a path into any of the provided roots,
    /// including the roots themselves.
    fn collect_downstream(&self, roots: &[K]) -> BTreeSet<K> {
        walk(roots, |key| self.dependents_of(key))
    }
}

/// Depth-first walk using an explicit stack, so that very deep graphs
/// can't overflow the call stack.
pub fn walk<K: Clone + Ord>(roots: &[K], mut neighbors: impl FnMut(&K) -> Vec<K>) -> BTreeSet<K> {
    let mut visited = BTreeSet::new();
    let mut stack = roots.to_vec();

    while let Some(key) = stack.pop() {
        if visited.contains(&key) {
            continue;
        }

        for next in neighbors(&key) {
            if !visited.contains(&next) {
                stack.push(next);
            }
        }

        visited.insert(key);
    }

    visited
}
