use orbit_common::MemoryFs;
use orbit_common::consts::{CONFIG_WORKSPACE_FILENAME, ROOT_MANIFEST_FILENAME};
use orbit_config::WorkspaceConfig;
use orbit_project_graph::{ProjectGraph, ProjectGraphBuilder};
use serde_json::{Map, Value, json};

/// Builds an in-memory workspace (`workspace.json`, `package.json`, and
/// source files) for tests.
pub struct WorkspaceMocker {
    pub fs: MemoryFs,
    pub manifest: Map<String, Value>,
    pub workspace: Map<String, Value>,
}

impl Default for WorkspaceMocker {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceMocker {
    pub fn new() -> Self {
        let mut workspace = Map::new();
        workspace.insert("version".into(), json!(1));
        workspace.insert("projects".into(), json!({}));

        Self {
            fs: MemoryFs::new(),
            manifest: Map::new(),
            workspace,
        }
    }

    /// Two projects where the app imports the library and an npm package,
    /// with `package.json` dependencies implicitly affecting the app.
    pub fn with_default_projects(&mut self) -> &mut Self {
        self.with_project("proj1", "apps/proj1", "application")
            .with_project("proj2", "libs/proj2", "library")
            .with_package("happy-nrwl", "1.0.0")
            .with_workspace_field(
                "paths",
                json!({ "@scope/proj2": ["libs/proj2/src/index.ts"] }),
            )
            .with_workspace_field(
                "implicitDependencies",
                json!({ "package.json": { "dependencies": ["proj1"] } }),
            )
            .with_file(
                "apps/proj1/src/main.ts",
                "import { lib } from '@scope/proj2';\nimport 'happy-nrwl';\n",
            )
            .with_file("libs/proj2/src/index.ts", "export const lib = 1;\n")
    }

    pub fn with_project(&mut self, name: &str, root: &str, project_type: &str) -> &mut Self {
        self.with_project_config(name, json!({ "root": root, "projectType": project_type }))
    }

    /// Insert a project, merging fields over an existing declaration.
    pub fn with_project_config(&mut self, name: &str, config: Value) -> &mut Self {
        let projects = self
            .workspace
            .entry("projects")
            .or_insert_with(|| json!({}));

        if let Some(projects) = projects.as_object_mut() {
            let project = projects.entry(name).or_insert_with(|| json!({}));

            if let (Some(project), Value::Object(fields)) = (project.as_object_mut(), config) {
                project.extend(fields);
            }
        }

        self
    }

    pub fn with_target(&mut self, project: &str, target: &str, config: Value) -> &mut Self {
        self.with_project_config(project, json!({}));

        if let Some(targets) = self
            .workspace
            .get_mut("projects")
            .and_then(|projects| projects.get_mut(project))
            .and_then(|project| project.as_object_mut())
            .map(|project| project.entry("targets").or_insert_with(|| json!({})))
            .and_then(|targets| targets.as_object_mut())
        {
            targets.insert(target.into(), config);
        }

        self
    }

    pub fn with_workspace_field(&mut self, key: &str, value: Value) -> &mut Self {
        self.workspace.insert(key.into(), value);
        self
    }

    pub fn with_package(&mut self, name: &str, version: &str) -> &mut Self {
        let deps = self
            .manifest
            .entry("dependencies")
            .or_insert_with(|| json!({}));

        if let Some(deps) = deps.as_object_mut() {
            deps.insert(name.into(), json!(version));
        }

        self
    }

    pub fn with_file(&mut self, path: &str, contents: &str) -> &mut Self {
        self.fs.insert(path, contents);
        self
    }

    pub fn to_workspace_json(&self) -> String {
        serde_json::to_string_pretty(&self.workspace).unwrap()
    }

    pub fn to_manifest_json(&self) -> String {
        serde_json::to_string_pretty(&self.manifest).unwrap()
    }

    pub fn to_fs(&self) -> MemoryFs {
        let mut fs = self.fs.clone();
        fs.insert(CONFIG_WORKSPACE_FILENAME, self.to_workspace_json());

        if !self.manifest.is_empty() {
            fs.insert(ROOT_MANIFEST_FILENAME, self.to_manifest_json());
        }

        fs
    }

    pub fn load_config(&self) -> WorkspaceConfig {
        WorkspaceConfig::load_from(&self.to_fs()).unwrap()
    }

    pub fn build_project_graph(&self) -> ProjectGraph {
        let fs = self.to_fs();
        let config = WorkspaceConfig::load_from(&fs).unwrap();

        ProjectGraphBuilder::new(&config, &fs).build(None).unwrap()
    }
}
