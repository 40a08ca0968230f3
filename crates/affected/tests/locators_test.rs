use orbit_affected::*;
use orbit_config::WorkspaceConfig;
use orbit_project_graph::*;
use orbit_test_utils::create_graph_stub;
use serde_json::json;

fn create_config() -> WorkspaceConfig {
    serde_json::from_value(json!({
        "version": 1,
        "projects": {
            "proj1": { "root": "libs/proj1", "projectType": "application" },
            "proj2": { "root": "libs/proj2" }
        },
        "implicitDependencies": {
            "package.json": {
                "dependencies": ["proj1"],
                "some": { "deep-field": ["proj2"] }
            },
            "tools/**/*.js": "*"
        }
    }))
    .unwrap()
}

fn create_graph() -> ProjectGraph {
    create_graph_stub(
        &[
            ("proj1", ProjectGraphNodeType::App),
            ("proj2", ProjectGraphNodeType::Lib),
            ("npm:happy-nrwl", ProjectGraphNodeType::Npm),
        ],
        &[],
    )
}

fn manifest_change(type_of: DiffType, path: &[&str]) -> TouchedFile {
    TouchedFile::with_json_changes("package.json", vec![JsonChange::new(type_of, path)])
}

mod npm_packages {
    use super::*;

    #[test]
    fn modified_dependency_marks_its_package() {
        let touched = manifest_change(DiffType::Modified, &["dependencies", "happy-nrwl"]);

        assert_eq!(
            get_touched_npm_packages(&touched, &create_graph(), &create_config()),
            vec!["npm:happy-nrwl"]
        );
    }

    #[test]
    fn deleted_dependency_without_dependents_marks_all_projects() {
        let touched = manifest_change(DiffType::Deleted, &["dependencies", "sad-nrwl"]);

        assert_eq!(
            get_touched_npm_packages(&touched, &create_graph(), &create_config()),
            vec!["proj1", "proj2"]
        );
    }

    #[test]
    fn deleted_dependency_marks_its_dependents() {
        let graph = create_graph_stub(
            &[
                ("proj1", ProjectGraphNodeType::App),
                ("proj2", ProjectGraphNodeType::Lib),
            ],
            &[("proj2", "npm:sad-nrwl", DependencyType::Static)],
        );
        let touched = manifest_change(DiffType::Deleted, &["devDependencies", "sad-nrwl"]);

        assert_eq!(
            get_touched_npm_packages(&touched, &graph, &create_config()),
            vec!["proj2", "npm:sad-nrwl"]
        );
    }

    #[test]
    fn deleted_section_marks_all_projects() {
        let touched = manifest_change(DiffType::Deleted, &["dependencies"]);

        assert_eq!(
            get_touched_npm_packages(&touched, &create_graph(), &create_config()),
            vec!["proj1", "proj2"]
        );
    }

    #[test]
    fn added_dependency_marks_only_the_new_package() {
        let mut graph = create_graph();
        graph.add_node(ProjectGraphNode::new_npm("awesome-nrwl", None));

        let touched = manifest_change(DiffType::Added, &["dependencies", "awesome-nrwl"]);

        assert_eq!(
            get_touched_npm_packages(&touched, &graph, &create_config()),
            vec!["npm:awesome-nrwl"]
        );
    }

    #[test]
    fn whole_file_change_marks_every_package() {
        let mut graph = create_graph();
        graph.add_node(ProjectGraphNode::new_npm("awesome-nrwl", None));

        assert_eq!(
            get_touched_npm_packages(&TouchedFile::new("package.json"), &graph, &create_config()),
            vec!["npm:awesome-nrwl", "npm:happy-nrwl"]
        );
    }

    #[test]
    fn ignores_other_fields_and_files() {
        let graph = create_graph();
        let config = create_config();

        assert!(
            get_touched_npm_packages(
                &manifest_change(DiffType::Modified, &["scripts", "build"]),
                &graph,
                &config
            )
            .is_empty()
        );
        assert!(
            get_touched_npm_packages(
                &manifest_change(DiffType::Modified, &["dependencies"]),
                &graph,
                &config
            )
            .is_empty()
        );
        assert!(
            get_touched_npm_packages(&TouchedFile::new("libs/package.json"), &graph, &config)
                .is_empty()
        );
    }
}

mod implicit_dependencies {
    use super::*;

    #[test]
    fn matches_changed_fields() {
        let touched = manifest_change(DiffType::Modified, &["dependencies", "happy-nrwl"]);

        assert_eq!(
            get_implicitly_touched_projects(&touched, &create_graph(), &create_config()),
            vec!["proj1"]
        );
    }

    #[test]
    fn matches_deep_fields() {
        let touched = manifest_change(DiffType::Added, &["some", "deep-field"]);

        assert_eq!(
            get_implicitly_touched_projects(&touched, &create_graph(), &create_config()),
            vec!["proj2"]
        );
    }

    #[test]
    fn ignores_unmapped_fields() {
        let touched = manifest_change(DiffType::Modified, &["name"]);

        assert!(
            get_implicitly_touched_projects(&touched, &create_graph(), &create_config())
                .is_empty()
        );
    }

    #[test]
    fn whole_file_change_marks_every_leaf() {
        assert_eq!(
            get_implicitly_touched_projects(
                &TouchedFile::new("package.json"),
                &create_graph(),
                &create_config()
            ),
            vec!["proj1", "proj2"]
        );
    }

    #[test]
    fn matches_glob_patterns() {
        assert_eq!(
            get_implicitly_touched_projects(
                &TouchedFile::new("tools/scripts/build.js"),
                &create_graph(),
                &create_config()
            ),
            vec!["proj1", "proj2"]
        );
        assert!(
            get_implicitly_touched_projects(
                &TouchedFile::new("tools/build.ts"),
                &create_graph(),
                &create_config()
            )
            .is_empty()
        );
    }
}

mod workspace_config {
    use super::*;

    fn workspace_change(path: &[&str]) -> TouchedFile {
        TouchedFile::with_json_changes(
            "workspace.json",
            vec![JsonChange::new(DiffType::Modified, path)],
        )
    }

    #[test]
    fn marks_changed_project() {
        assert_eq!(
            get_touched_projects_in_workspace_config(
                &workspace_change(&["projects", "proj2", "tags"]),
                &create_graph(),
                &create_config()
            ),
            vec!["proj2"]
        );
    }

    #[test]
    fn removed_project_marks_all() {
        assert_eq!(
            get_touched_projects_in_workspace_config(
                &workspace_change(&["projects", "proj3"]),
                &create_graph(),
                &create_config()
            ),
            vec!["proj1", "proj2"]
        );
    }

    #[test]
    fn ignores_other_fields() {
        assert!(
            get_touched_projects_in_workspace_config(
                &workspace_change(&["tasksRunnerOptions", "parallel"]),
                &create_graph(),
                &create_config()
            )
            .is_empty()
        );
    }

    #[test]
    fn whole_file_change_marks_all() {
        assert_eq!(
            get_touched_projects_in_workspace_config(
                &TouchedFile::new("workspace.json"),
                &create_graph(),
                &create_config()
            ),
            vec!["proj1", "proj2"]
        );
    }
}

mod project_files {
    use super::*;

    #[test]
    fn maps_file_to_owner() {
        assert_eq!(
            get_touched_projects_by_files(
                &TouchedFile::new("libs/proj2/src/index.ts"),
                &create_graph(),
                &create_config()
            ),
            vec!["proj2"]
        );
    }

    #[test]
    fn tolerates_extension_changes() {
        assert_eq!(
            get_touched_projects_by_files(
                &TouchedFile::new("libs/proj2/src/index.tsx"),
                &create_graph(),
                &create_config()
            ),
            vec!["proj2"]
        );
    }

    #[test]
    fn ignores_files_outside_projects() {
        assert!(
            get_touched_projects_by_files(
                &TouchedFile::new("README.md"),
                &create_graph(),
                &create_config()
            )
            .is_empty()
        );
    }
}
