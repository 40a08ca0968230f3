use crate::project_graph::ProjectGraphNode;
use orbit_common::consts::NPM_NODE_PREFIX;
use orbit_common::path::{RelativePath, is_within_dir, remove_ext};
use std::collections::BTreeMap;
use tracing::trace;

/// Resolves module specifiers found in source files to the graph node
/// that owns them: a workspace project, or an external npm package.
pub struct TargetProjectLocator<'graph> {
    /// Extension-less file path to owning project.
    files: BTreeMap<String, &'graph str>,

    /// Project roots, deepest first.
    roots: Vec<(&'graph str, &'graph str)>,

    paths: &'graph BTreeMap<String, Vec<String>>,
}

impl<'graph> TargetProjectLocator<'graph> {
    pub fn new<I>(projects: I, paths: &'graph BTreeMap<String, Vec<String>>) -> Self
    where
        I: IntoIterator<Item = &'graph ProjectGraphNode>,
    {
        let mut files = BTreeMap::new();
        let mut roots = vec![];

        for project in projects {
            if project.is_npm() {
                continue;
            }

            for data in &project.data.files {
                files
                    .entry(remove_ext(&data.file))
                    .or_insert(project.name.as_str());
            }

            if let Some(root) = &project.data.root {
                roots.push((root.as_str(), project.name.as_str()));
            }
        }

        roots.sort_by(|a, d| d.0.len().cmp(&a.0.len()).then(a.0.cmp(d.0)));

        Self {
            files,
            roots,
            paths,
        }
    }

    /// Find the name of the node the specifier imported from `importing_file`
    /// resolves to. Relative specifiers are resolved against the importing
    /// file's directory, then path aliases are checked, and finally the
    /// specifier is treated as an npm package.
    pub fn find_project_with_import(&self, specifier: &str, importing_file: &str) -> Option<String> {
        let specifier = specifier.split('#').next().unwrap_or_default().trim();

        if specifier.is_empty() || specifier.starts_with("node:") {
            return None;
        }

        let result = if specifier.starts_with('.') {
            let dir = RelativePath::new(importing_file)
                .parent()
                .unwrap_or_else(|| RelativePath::new(""));
            let resolved = dir.join_normalized(specifier);

            self.find_project_with_file(resolved.as_str())
                .map(|name| name.to_owned())
        } else if let Some(target) = self.resolve_alias(specifier) {
            self.find_project_with_file(&target)
                .map(|name| name.to_owned())
        } else if specifier.starts_with('/') {
            None
        } else {
            get_package_name(specifier).map(|name| format!("{NPM_NODE_PREFIX}{name}"))
        };

        trace!(
            specifier,
            file = importing_file,
            target = result.as_deref(),
            "Resolved import"
        );

        result
    }

    /// Find the project that owns a file, tolerating missing extensions and
    /// directory `index` files, falling back to the deepest containing root.
    pub fn find_project_with_file(&self, file: &str) -> Option<&'graph str> {
        let file = file.trim_start_matches("./").trim_end_matches('/');
        let base = remove_ext(file);

        for candidate in [
            base.clone(),
            file.to_owned(),
            format!("{file}/index"),
            format!("{file}/src/index"),
        ] {
            if let Some(project) = self.files.get(&candidate) {
                return Some(*project);
            }
        }

        self.roots
            .iter()
            .find(|(root, _)| !root.is_empty() && is_within_dir(file, root))
            .map(|(_, name)| *name)
    }

    /// Resolve an aliased specifier to a workspace file path: exact aliases
    /// first, then wildcard aliases (`@scope/lib/*`), then deep imports
    /// beneath an exact alias (`@scope/lib/deep/path`).
    fn resolve_alias(&self, specifier: &str) -> Option<String> {
        if let Some(target) = self.paths.get(specifier).and_then(|targets| targets.first()) {
            return Some(target.to_owned());
        }

        let wildcard = self
            .paths
            .iter()
            .filter_map(|(alias, targets)| {
                let (prefix, suffix) = alias.split_once('*')?;

                if specifier.len() >= prefix.len() + suffix.len()
                    && specifier.starts_with(prefix)
                    && specifier.ends_with(suffix)
                {
                    let matched = &specifier[prefix.len()..specifier.len() - suffix.len()];
                    let target = targets.first()?.replacen('*', matched, 1);

                    Some((prefix.len(), target))
                } else {
                    None
                }
            })
            .max_by_key(|(len, _)| *len);

        if let Some((_, target)) = wildcard {
            return Some(target);
        }

        self.paths
            .iter()
            .filter(|(alias, _)| {
                !alias.contains('*')
                    && specifier
                        .strip_prefix(alias.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|(alias, _)| alias.len())
            .and_then(|(_, targets)| targets.first())
            .map(|target| target.to_owned())
    }
}

/// Extract the package name from a bare specifier: `@scope/name/deep`
/// becomes `@scope/name`, and `name/deep` becomes `name`.
pub fn get_package_name(specifier: &str) -> Option<String> {
    let mut parts = specifier.split('/');
    let first = parts.next().filter(|part| !part.is_empty())?;

    if first.starts_with('@') {
        let second = parts.next().filter(|part| !part.is_empty())?;

        Some(format!("{first}/{second}"))
    } else {
        Some(first.to_owned())
    }
}
