//! Persistence for `.mcp-tasks-current.edn` (C7): one JSON object recording
//! which task a given working directory is currently executing. Lives next
//! to the working directory itself, not inside the shared tasks directory,
//! since it is per-checkout state rather than shared task data.

use std::fs;
use std::path::{Path, PathBuf};

use task_core::error::{Result, TaskError};
use task_core::models::ExecutionState;

const EXECUTION_STATE_FILE_NAME: &str = ".mcp-tasks-current.edn";

pub fn path_for(working_dir: &Path) -> PathBuf {
    working_dir.join(EXECUTION_STATE_FILE_NAME)
}

pub fn load(working_dir: &Path) -> Result<Option<ExecutionState>> {
    let path = path_for(working_dir);
    match fs::read_to_string(&path) {
        Ok(contents) if contents.trim().is_empty() => Ok(None),
        Ok(contents) => serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| TaskError::internal("execution_state", format!("malformed {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TaskError::internal(
            "execution_state",
            format!("failed to read {}: {e}", path.display()),
        )),
    }
}

pub fn save(working_dir: &Path, state: &ExecutionState) -> Result<()> {
    let path = path_for(working_dir);
    let contents = serde_json::to_string_pretty(state)
        .map_err(|e| TaskError::internal("execution_state", format!("serialization failed: {e}")))?;
    fs::write(&path, contents)
        .map_err(|e| TaskError::internal("execution_state", format!("failed to write {}: {e}", path.display())))
}

pub fn clear(working_dir: &Path) -> Result<()> {
    let path = path_for(working_dir);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TaskError::internal(
            "execution_state",
            format!("failed to remove {}: {e}", path.display()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn round_trips_execution_state() {
        let dir = tempdir().unwrap();
        assert!(load(dir.path()).unwrap().is_none());

        let state = ExecutionState {
            task_id: Some(7),
            story_id: None,
            task_start_time: Utc::now(),
        };
        save(dir.path(), &state).unwrap();
        let loaded = load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.task_id, Some(7));

        clear(dir.path()).unwrap();
        assert!(load(dir.path()).unwrap().is_none());
    }
}
