#![allow(dead_code)]

use async_trait::async_trait;
use orbit_cache::{CacheEngine, RemoteCache, TaskCache};
use orbit_task::{Target, Task};
use orbit_task_runner::command_builder::TaskPlan;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub fn create_plan(root: &Path, command: &str, hash: Option<&str>) -> TaskPlan {
    let task = Task::new(Target::new("app", "build"), BTreeMap::new()).unwrap();

    TaskPlan {
        task,
        command_line: command.into(),
        working_dir: root.to_path_buf(),
        env: BTreeMap::new(),
        outputs: vec![],
        timeout: None,
        hash: hash.map(|hash| hash.to_owned()),
    }
}

pub fn create_cache(root: &Path) -> Arc<TaskCache> {
    Arc::new(CacheEngine::new(root, None).unwrap().create_task_cache())
}

/// Records calls and fails on demand.
#[derive(Default)]
pub struct MockRemoteCache {
    pub fail_retrieve: bool,
    pub fail_store: bool,
    pub retrieved: Mutex<Vec<String>>,
    pub stored: Mutex<Vec<String>>,
}

#[async_trait]
impl RemoteCache for MockRemoteCache {
    async fn retrieve(&self, hash: &str, _cache_dir: &Path) -> miette::Result<bool> {
        self.retrieved.lock().unwrap().push(hash.to_owned());

        if self.fail_retrieve {
            return Err(miette::miette!("connection refused"));
        }

        Ok(false)
    }

    async fn store(&self, hash: &str, _cache_dir: &Path) -> miette::Result<bool> {
        self.stored.lock().unwrap().push(hash.to_owned());

        if self.fail_store {
            return Err(miette::miette!("connection refused"));
        }

        Ok(true)
    }
}
