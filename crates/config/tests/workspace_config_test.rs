use orbit_common::MemoryFs;
use orbit_config::*;
use serde_json::json;
use starbase_sandbox::create_empty_sandbox;
use std::collections::BTreeMap;

const WORKSPACE: &str = r#"{
  "version": 1,
  "npmScope": "scope",
  "projects": {
    "proj1": {
      "root": "apps/proj1",
      "projectType": "application",
      "tags": ["scope:app"],
      "targets": {
        "build": {
          "executor": "run-commands",
          "options": { "command": "tsc", "sourceMap": false },
          "configurations": { "production": { "sourceMap": true, "minify": true } },
          "outputs": ["dist/apps/proj1"],
          "timeout": 60
        }
      }
    },
    "proj2": { "root": "libs/proj2" }
  },
  "implicitDependencies": {
    "package.json": { "dependencies": ["proj1"], "some": { "deep-field": ["proj2"] } },
    "tsconfig.base.json": "*"
  },
  "paths": { "@scope/proj2": ["libs/proj2/src/index.ts"] },
  "tasksRunnerOptions": { "parallel": 2, "cacheableOperations": ["build"] }
}"#;

mod loading {
    use super::*;

    #[test]
    fn parses_workspace_file() {
        let fs = MemoryFs::new().with_file("workspace.json", WORKSPACE);
        let config = WorkspaceConfig::load_from(&fs).unwrap();

        assert_eq!(config.npm_scope.as_deref(), Some("scope"));
        assert_eq!(config.get_project_names(), vec!["proj1", "proj2"]);
        assert_eq!(
            config.projects["proj1"].project_type,
            ProjectType::Application
        );
        assert_eq!(config.projects["proj2"].project_type, ProjectType::Library);
        assert_eq!(config.tasks_runner_options.parallel, 2);
        assert_eq!(config.tasks_runner_options.grace_period, 5);
        assert!(config.is_cacheable("build"));
        assert!(!config.is_cacheable("test"));
    }

    #[test]
    fn errors_when_missing() {
        let fs = MemoryFs::new();

        assert!(WorkspaceConfig::load_from(&fs).is_err());
    }

    #[test]
    fn errors_for_invalid_json() {
        let fs = MemoryFs::new().with_file("workspace.json", "{ invalid");

        assert!(WorkspaceConfig::load_from(&fs).is_err());
    }

    #[test]
    fn merges_tsconfig_paths() {
        let fs = MemoryFs::new()
            .with_file("workspace.json", WORKSPACE)
            .with_file(
                "tsconfig.base.json",
                r#"{ "compilerOptions": { "paths": {
                    "@scope/proj2": ["libs/other/index.ts"],
                    "@scope/proj3": ["libs/proj3/index.ts"]
                } } }"#,
            );
        let config = WorkspaceConfig::load_from(&fs).unwrap();

        assert_eq!(
            config.paths["@scope/proj2"],
            vec!["libs/proj2/src/index.ts"]
        );
        assert_eq!(config.paths["@scope/proj3"], vec!["libs/proj3/index.ts"]);
    }

    #[test]
    fn loads_from_disk() {
        let sandbox = create_empty_sandbox();
        sandbox.create_file("workspace.json", WORKSPACE);

        let config = WorkspaceConfig::load(sandbox.path()).unwrap();

        assert_eq!(config.projects.len(), 2);
    }
}

mod implicit_dependencies {
    use super::*;

    fn load() -> WorkspaceConfig {
        WorkspaceConfig::load_from(&MemoryFs::new().with_file("workspace.json", WORKSPACE))
            .unwrap()
    }

    #[test]
    fn resolves_nested_paths() {
        let config = load();
        let all = config.get_project_names();
        let entry = &config.implicit_dependencies["package.json"];

        assert_eq!(
            entry.resolve_path(&["dependencies", "happy-nrwl"], &all),
            vec!["proj1"]
        );
        assert_eq!(
            entry.resolve_path(&["some", "deep-field"], &all),
            vec!["proj2"]
        );
        assert!(entry.resolve_path(&["scripts"], &all).is_empty());
    }

    #[test]
    fn resolves_every_leaf_for_empty_path() {
        let config = load();
        let all = config.get_project_names();

        assert_eq!(
            config.implicit_dependencies["package.json"].resolve_all(&all),
            vec!["proj1", "proj2"]
        );
    }

    #[test]
    fn resolves_star_to_all_projects() {
        let config = load();
        let all = config.get_project_names();
        let entry = &config.implicit_dependencies["tsconfig.base.json"];

        assert!(entry.is_all());
        assert_eq!(entry.resolve_path(&["compilerOptions"], &all), all);
    }
}

mod targets {
    use super::*;

    #[test]
    fn merges_configuration_and_overrides() {
        let config =
            WorkspaceConfig::load_from(&MemoryFs::new().with_file("workspace.json", WORKSPACE))
                .unwrap();
        let target = &config.projects["proj1"].targets["build"];

        let overrides = BTreeMap::from_iter([("minify".to_owned(), json!(false))]);
        let options = target.resolve_options(Some("production"), &overrides);

        assert_eq!(options["sourceMap"], json!(true));
        assert_eq!(options["minify"], json!(false));
        assert_eq!(target.resolve_command(&options).as_deref(), Some("tsc"));
        assert!(target.has_configuration("production"));
        assert_eq!(target.timeout, Some(60));
    }

    #[test]
    fn prefers_explicit_command() {
        let target = TargetConfig {
            command: Some("echo hi".into()),
            options: BTreeMap::from_iter([("command".to_owned(), json!("echo other"))]),
            ..Default::default()
        };

        assert_eq!(
            target.resolve_command(&target.options).as_deref(),
            Some("echo hi")
        );
    }
}
