mod utils;

use httpmock::prelude::*;
use orbit_test_utils::WorkspaceMocker;
use orbit_test_utils::predicates::prelude::*;
use serde_json::json;
use utils::*;

mod run {
    use super::*;

    #[test]
    fn runs_dependencies_first() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        let assert = sandbox.run_bin(|cmd| {
            cmd.arg("run").arg("build").arg("--all");
        });

        assert
            .success()
            .stdout(predicate::str::contains("proj1:build"))
            .stdout(predicate::str::contains("built proj2"))
            .stdout(predicate::str::contains("Success:"));

        assert_eq!(read_lines(&sandbox, "order.txt"), vec!["proj2", "proj1"]);
    }

    #[test]
    fn runs_selected_projects() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("build").arg("--projects").arg("proj2");
            })
            .success();

        assert_eq!(read_lines(&sandbox, "order.txt"), vec!["proj2"]);
    }

    #[test]
    fn runs_explicit_project_target() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("proj1:build");
            })
            .success();

        assert_eq!(read_lines(&sandbox, "order.txt"), vec!["proj1"]);
    }

    #[test]
    fn runs_affected_projects() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run")
                    .arg("build")
                    .arg("--affected")
                    .arg("--files")
                    .arg("apps/proj1/src/main.ts");
            })
            .success();

        assert_eq!(read_lines(&sandbox, "order.txt"), vec!["proj1"]);
    }

    #[test]
    fn replays_cached_results() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("build").arg("--all");
            })
            .success();

        let assert = sandbox.run_bin(|cmd| {
            cmd.arg("run").arg("build").arg("--all");
        });

        assert
            .success()
            .stdout(predicate::str::contains("(cached)"))
            .stdout(predicate::str::contains("built proj1"))
            .stdout(predicate::str::contains("(2 cached)"));

        assert_eq!(read_lines(&sandbox, "order.txt").len(), 2);
    }

    #[test]
    fn skip_cache_always_executes() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        for _ in 0..2 {
            sandbox
                .run_bin(|cmd| {
                    cmd.arg("run").arg("build").arg("--all").arg("--skip-cache");
                })
                .success()
                .stdout(predicate::str::contains("(cached)").not());
        }

        assert_eq!(read_lines(&sandbox, "order.txt").len(), 4);
    }

    #[test]
    fn non_cacheable_targets_always_execute() {
        let mut mock = create_run_mocker();
        mock.with_target("proj2", "lint", json!({ "command": "echo lint >> lint.txt" }));

        let sandbox = create_cli_sandbox(&mock);

        for _ in 0..2 {
            sandbox
                .run_bin(|cmd| {
                    cmd.arg("run").arg("proj2:lint");
                })
                .success();
        }

        assert_eq!(read_lines(&sandbox, "lint.txt").len(), 2);
    }

    #[test]
    fn reruns_when_dependency_changes() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("build").arg("--all");
            })
            .success();

        sandbox.create_file("libs/proj2/src/index.ts", "export const lib = 2;\n");

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("build").arg("--all");
            })
            .success();

        assert_eq!(
            read_lines(&sandbox, "order.txt"),
            vec!["proj2", "proj1", "proj2", "proj1"]
        );
    }

    #[test]
    fn applies_configuration_and_overrides() {
        let mut mock = create_run_mocker();
        mock.with_target(
            "proj2",
            "build",
            json!({
                "options": { "command": "echo dev >> mode.txt" },
                "configurations": {
                    "production": { "command": "echo prod >> mode.txt" }
                }
            }),
        );

        let sandbox = create_cli_sandbox(&mock);

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("proj2:build");
            })
            .success();

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("proj2:build:production");
            })
            .success();

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run")
                    .arg("proj2:build")
                    .arg("--")
                    .arg("command=echo override >> mode.txt");
            })
            .success();

        assert_eq!(
            read_lines(&sandbox, "mode.txt"),
            vec!["dev", "prod", "override"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn injects_env_vars() {
        let mut mock = create_run_mocker();
        mock.with_target(
            "proj2",
            "build",
            json!({ "command": "echo $ORBIT_TARGET $ORBIT_PROJECT" }),
        );

        let sandbox = create_cli_sandbox(&mock);

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("proj2:build");
            })
            .success()
            .stdout(predicate::str::contains("proj2:build proj2"));
    }
}

mod failures {
    use super::*;

    #[test]
    fn skips_dependents_and_exits_non_zero() {
        let mut mock = create_run_mocker();
        mock.with_target("proj2", "build", json!({ "command": "echo broken && exit 3" }));

        let sandbox = create_cli_sandbox(&mock);

        let assert = sandbox.run_bin(|cmd| {
            cmd.arg("run").arg("build").arg("--all");
        });

        assert
            .code(1)
            .stdout(predicate::str::contains("failed with code 3"))
            .stdout(predicate::str::contains("broken"))
            .stdout(predicate::str::contains("skipped, a dependency failed"))
            .stdout(predicate::str::contains("Failure:"));

        assert!(read_lines(&sandbox, "order.txt").is_empty());
    }

    #[test]
    fn errors_without_selection() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("build");
            })
            .failure()
            .stderr(predicate::str::contains("No projects selected"));
    }

    #[test]
    fn errors_for_missing_target() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("proj2:unknown");
            })
            .failure()
            .stderr(predicate::str::contains("does not have a"));
    }

    #[test]
    fn errors_for_unknown_configuration() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("proj2:build:staging");
            })
            .failure()
            .stderr(predicate::str::contains("does not have a"));
    }

    #[test]
    fn errors_for_invalid_overrides() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("proj2:build").arg("--").arg("novalue");
            })
            .failure()
            .stderr(predicate::str::contains("Invalid task override"));
    }

    #[test]
    fn errors_for_zero_parallel() {
        let sandbox = create_cli_sandbox(&create_run_mocker());

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("build").arg("--all").arg("--parallel").arg("0");
            })
            .failure();
    }

    #[test]
    fn nothing_to_run_succeeds() {
        let mut mock = WorkspaceMocker::new();
        mock.with_default_projects();

        let sandbox = create_cli_sandbox(&mock);

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("build").arg("--all");
            })
            .success()
            .stdout(predicate::str::contains("No projects to run"));
    }
}

mod webhooks {
    use super::*;

    fn create_webhook_sandbox(url: String) -> starbase_sandbox::Sandbox {
        let mut mock = create_run_mocker();
        mock.with_workspace_field("notifier", json!({ "webhookUrl": url }));

        create_cli_sandbox(&mock)
    }

    #[test]
    fn posts_run_events() {
        let server = MockServer::start();
        let started = server.mock(|when, then| {
            when.method(POST)
                .path("/hook")
                .body_contains("\"type\":\"command.started\"");
            then.status(200);
        });
        let finished = server.mock(|when, then| {
            when.method(POST)
                .path("/hook")
                .body_contains("\"type\":\"task.finished\"");
            then.status(200);
        });
        let completed = server.mock(|when, then| {
            when.method(POST)
                .path("/hook")
                .body_contains("\"type\":\"command.finished\"");
            then.status(200);
        });

        let sandbox = create_webhook_sandbox(server.url("/hook"));

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("build").arg("--all");
            })
            .success();

        started.assert_hits(1);
        finished.assert_hits(2);
        completed.assert_hits(1);
    }

    #[test]
    fn failed_delivery_doesnt_fail_the_run() {
        let server = MockServer::start();
        let hook = server.mock(|when, then| {
            when.method(POST).path("/hook");
            then.status(500);
        });

        let sandbox = create_webhook_sandbox(server.url("/hook"));

        sandbox
            .run_bin(|cmd| {
                cmd.arg("run").arg("build").arg("--all");
            })
            .success()
            .stdout(predicate::str::contains("1 notifications failed to deliver"));

        hook.assert_hits(1);
        assert_eq!(read_lines(&sandbox, "order.txt").len(), 2);
    }
}
