use crate::workspace_mocker::WorkspaceMocker;
use orbit_common::ReadFs;
use starbase_sandbox::{Sandbox, create_empty_sandbox};

/// Write every file of the mocked workspace into a fresh sandbox.
pub fn create_workspace_sandbox(mock: &WorkspaceMocker) -> Sandbox {
    let sandbox = create_empty_sandbox();
    let fs = mock.to_fs();

    for file in fs.list("").unwrap() {
        sandbox.create_file(&file, fs.read_to_string(&file).unwrap());
    }

    sandbox
}
