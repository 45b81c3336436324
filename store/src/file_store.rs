//! Atomic load/save over `tasks.ednl` / `complete.ednl`, guarded by a
//! cross-process lock so concurrent CLI/MCP invocations never interleave
//! writes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use task_core::codec;
use task_core::config::ResolvedConfig;
use task_core::error::{Result, TaskError};
use task_core::repository::TaskRepository;

use crate::lock::{self, LockGuard};

pub struct FileStore {
    tasks_file: PathBuf,
    complete_file: PathBuf,
    lock_file: PathBuf,
    lock_timeout_ms: u64,
    lock_poll_interval_ms: u64,
}

impl FileStore {
    pub fn new(config: &ResolvedConfig) -> Result<Self> {
        if !config.resolved_tasks_dir.exists() {
            fs::create_dir_all(&config.resolved_tasks_dir).map_err(|e| {
                TaskError::internal(
                    "open_store",
                    format!(
                        "failed to create {}: {e}",
                        config.resolved_tasks_dir.display()
                    ),
                )
            })?;
        }
        Ok(Self {
            tasks_file: config.tasks_file(),
            complete_file: config.complete_file(),
            lock_file: config.lock_file(),
            lock_timeout_ms: config.lock_timeout_ms,
            lock_poll_interval_ms: config.lock_poll_interval_ms,
        })
    }

    fn acquire_lock(&self, op: &str) -> Result<LockGuard> {
        lock::acquire(&self.lock_file, self.lock_timeout_ms, self.lock_poll_interval_ms, op)
    }

    fn read_stream(path: &Path, op: &str) -> Result<String> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(TaskError::internal(op, format!("failed to read {}: {e}", path.display()))),
        }
    }

    fn load_locked(&self) -> Result<TaskRepository> {
        let active = codec::decode_stream(&Self::read_stream(&self.tasks_file, "load")?)?;
        let complete = codec::decode_stream(&Self::read_stream(&self.complete_file, "load")?)?;
        TaskRepository::from_streams(active, complete)
    }

    fn write_atomic(path: &Path, contents: &str, op: &str) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        let mut tmp = fs::File::create(&tmp_path).map_err(|e| {
            TaskError::internal(op, format!("failed to create {}: {e}", tmp_path.display()))
        })?;
        tmp.write_all(contents.as_bytes()).map_err(|e| {
            TaskError::internal(op, format!("failed to write {}: {e}", tmp_path.display()))
        })?;
        tmp.sync_all()
            .map_err(|e| TaskError::internal(op, format!("failed to sync {}: {e}", tmp_path.display())))?;
        fs::rename(&tmp_path, path).map_err(|e| {
            TaskError::internal(
                op,
                format!("failed to rename {} to {}: {e}", tmp_path.display(), path.display()),
            )
        })
    }

    fn save_locked(&self, repo: &TaskRepository) -> Result<()> {
        let active = codec::encode_stream(repo.active_tasks())?;
        let complete = codec::encode_stream(repo.complete_tasks())?;
        Self::write_atomic(&self.tasks_file, &active, "save")?;
        Self::write_atomic(&self.complete_file, &complete, "save")
    }

    /// Read the current repository state without holding the lock for any
    /// longer than the read itself takes.
    pub fn load(&self) -> Result<TaskRepository> {
        let _guard = self.acquire_lock("load")?;
        self.load_locked()
    }

    /// Run `f` against the freshly loaded repository and persist whatever it
    /// returns alongside its result, all under a single lock acquisition so
    /// read-modify-write is atomic across processes.
    pub fn with_transaction<T>(
        &self,
        op: &str,
        f: impl FnOnce(&mut TaskRepository) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.acquire_lock(op)?;
        let mut repo = self.load_locked()?;
        let result = f(&mut repo)?;
        self.save_locked(&repo)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use task_core::config;
    use task_core::models::NewTask;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> FileStore {
        let resolved = config::resolve(dir).unwrap();
        FileStore::new(&resolved).unwrap()
    }

    #[test]
    fn round_trips_a_task_through_a_transaction() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let created = store
            .with_transaction("add", |repo| {
                repo.add(NewTask {
                    title: "write the store".to_string(),
                    category: "simple".to_string(),
                    ..Default::default()
                })
            })
            .unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.get(created.id).unwrap().title, "write the store");
    }

    #[test]
    fn completing_moves_a_task_into_complete_ednl() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        let created = store
            .with_transaction("add", |repo| {
                repo.add(NewTask {
                    title: "finish me".to_string(),
                    category: "simple".to_string(),
                    ..Default::default()
                })
            })
            .unwrap();
        store
            .with_transaction("complete", |repo| repo.complete(created.id))
            .unwrap();

        let reloaded = store.load().unwrap();
        assert!(reloaded.active_tasks().is_empty());
        assert_eq!(reloaded.complete_tasks().len(), 1);
    }
}
