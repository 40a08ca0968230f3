#![allow(dead_code)]

use orbit_test_utils::{WorkspaceMocker, create_workspace_sandbox};
use serde_json::json;
use starbase_sandbox::Sandbox;
use std::fs;

pub fn create_cli_sandbox(mock: &WorkspaceMocker) -> Sandbox {
    let mut sandbox = create_workspace_sandbox(mock);

    sandbox.settings.bin = "orbit".into();

    for (key, value) in [
        ("NO_COLOR", "1"),
        ("ORBIT_TEST", "true"),
        ("ORBIT_LOG", "warn"),
        ("ORBIT_CACHE", "read-write"),
    ] {
        sandbox.settings.env.insert(key.into(), value.into());
    }

    sandbox
}

pub fn create_default_sandbox() -> Sandbox {
    let mut mock = WorkspaceMocker::new();
    mock.with_default_projects();

    create_cli_sandbox(&mock)
}

/// Default projects with a cacheable `build` target that appends the
/// project name to `order.txt` in the workspace root.
pub fn create_run_mocker() -> WorkspaceMocker {
    let mut mock = WorkspaceMocker::new();

    mock.with_default_projects()
        .with_target(
            "proj1",
            "build",
            json!({ "command": "echo proj1 >> order.txt && echo built proj1" }),
        )
        .with_target(
            "proj2",
            "build",
            json!({ "command": "echo proj2 >> order.txt && echo built proj2" }),
        )
        .with_workspace_field(
            "tasksRunnerOptions",
            json!({ "cacheableOperations": ["build"], "gracePeriod": 1 }),
        );

    mock
}

pub fn read_lines(sandbox: &Sandbox, file: &str) -> Vec<String> {
    fs::read_to_string(sandbox.path().join(file))
        .unwrap_or_default()
        .lines()
        .map(|line| line.trim().to_owned())
        .collect()
}
