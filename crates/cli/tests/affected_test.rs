mod utils;

use serde_json::json;
use starbase_sandbox::Sandbox;
use utils::*;

fn run_affected(sandbox: &Sandbox, args: &[&str]) -> Vec<String> {
    let assert = sandbox.run_bin(|cmd| {
        cmd.arg("affected").args(args);
    });

    assert
        .stdout()
        .lines()
        .map(|line| line.trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect()
}

fn write_manifest_before(sandbox: &Sandbox, dependencies: serde_json::Value) {
    sandbox.create_file(
        "before.json",
        serde_json::to_string_pretty(&json!({ "dependencies": dependencies })).unwrap(),
    );
}

mod affected {
    use super::*;

    #[test]
    fn marks_owner_and_dependents_of_touched_files() {
        let sandbox = create_default_sandbox();

        assert_eq!(
            run_affected(&sandbox, &["--files", "libs/proj2/src/index.ts"]),
            vec!["proj1", "proj2"]
        );
    }

    #[test]
    fn doesnt_mark_dependencies_of_touched_files() {
        let sandbox = create_default_sandbox();

        assert_eq!(
            run_affected(&sandbox, &["--files", "apps/proj1/src/main.ts"]),
            vec!["proj1"]
        );
    }

    #[test]
    fn marks_deleted_files_by_project_root() {
        let sandbox = create_default_sandbox();

        assert_eq!(
            run_affected(&sandbox, &["--files", "libs/proj2/src/removed.ts"]),
            vec!["proj1", "proj2"]
        );
    }

    #[test]
    fn marks_nothing_for_unowned_files() {
        let sandbox = create_default_sandbox();

        assert!(run_affected(&sandbox, &["--files", "README.md"]).is_empty());
    }

    #[test]
    fn prints_json() {
        let sandbox = create_default_sandbox();

        let assert = sandbox.run_bin(|cmd| {
            cmd.arg("affected")
                .arg("--json")
                .arg("--files")
                .arg("libs/proj2/src/index.ts");
        });

        let affected: Vec<String> = serde_json::from_str(&assert.stdout()).unwrap();

        assert_eq!(affected, vec!["proj1", "proj2"]);
    }

    #[test]
    fn requires_files() {
        let sandbox = create_default_sandbox();

        sandbox
            .run_bin(|cmd| {
                cmd.arg("affected");
            })
            .failure();
    }
}

mod manifest {
    use super::*;

    #[test]
    fn whole_file_change_marks_npm_nodes_and_dependents() {
        let sandbox = create_default_sandbox();

        assert_eq!(
            run_affected(&sandbox, &["--files", "package.json"]),
            vec!["npm:happy-nrwl", "proj1"]
        );
    }

    #[test]
    fn version_change_marks_package() {
        let sandbox = create_default_sandbox();
        write_manifest_before(&sandbox, json!({ "happy-nrwl": "0.9.0" }));

        assert_eq!(
            run_affected(
                &sandbox,
                &["--files", "package.json", "--manifest-before", "before.json"]
            ),
            vec!["npm:happy-nrwl", "proj1"]
        );
    }

    #[test]
    fn deleted_dependency_marks_every_project_when_unused() {
        let sandbox = create_default_sandbox();
        write_manifest_before(
            &sandbox,
            json!({ "happy-nrwl": "1.0.0", "sad-nrwl": "1.0.0" }),
        );

        assert_eq!(
            run_affected(
                &sandbox,
                &["--files", "package.json", "--manifest-before", "before.json"]
            ),
            vec!["proj1", "proj2"]
        );
    }

    #[test]
    fn unrelated_field_marks_nothing() {
        let sandbox = create_default_sandbox();
        sandbox.create_file(
            "before.json",
            r#"{ "name": "old", "dependencies": { "happy-nrwl": "1.0.0" } }"#,
        );

        assert!(
            run_affected(
                &sandbox,
                &["--files", "package.json", "--manifest-before", "before.json"]
            )
            .is_empty()
        );
    }
}
