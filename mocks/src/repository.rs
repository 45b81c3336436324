//! An in-memory [`TaskOperations`] double with error injection and call
//! tracking, for driving `mcp-protocol`'s tool router in tests without
//! touching the filesystem or git.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use task_core::config::{BranchTitleWords, ResolvedConfig, WorktreePrefix};
use task_core::protocol::{
    AddTaskParams, AppendSessionEventParams, AppendSharedContextParams, CleanupParams,
    CompleteTaskParams, DeleteTaskParams, QueryResult, ReopenTaskParams, SelectTasksParams,
    TaskOperations, UpdateTaskParams, WorkOnParams, WorkOnResult,
};
use task_core::repository::TaskRepository;
use task_core::{BlockedStatus, ExecutionState, Result, Task, TaskError};

fn in_memory_config() -> ResolvedConfig {
    ResolvedConfig {
        use_git: false,
        branch_management: false,
        worktree_management: false,
        worktree_prefix: WorktreePrefix::None,
        base_branch: None,
        branch_title_words: BranchTitleWords::default(),
        lock_timeout_ms: 0,
        lock_poll_interval_ms: 0,
        enable_git_sync: false,
        base_dir: PathBuf::from("."),
        main_repo_dir: PathBuf::from("."),
        resolved_tasks_dir: PathBuf::from("."),
    }
}

/// In-memory double for [`TaskOperations`]. `work_on`/`cleanup` are no-ops
/// over git since there's no repository to operate on; they only touch the
/// task record.
pub struct MockTaskOperations {
    repo: Mutex<TaskRepository>,
    config: ResolvedConfig,
    error_injection: Mutex<Option<TaskError>>,
    call_history: Mutex<Vec<String>>,
}

impl Default for MockTaskOperations {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTaskOperations {
    pub fn new() -> Self {
        Self {
            repo: Mutex::new(TaskRepository::from_streams(Vec::new(), Vec::new()).unwrap()),
            config: in_memory_config(),
            error_injection: Mutex::new(None),
            call_history: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tasks(active: Vec<Task>, complete: Vec<Task>) -> Self {
        Self {
            repo: Mutex::new(TaskRepository::from_streams(active, complete).unwrap()),
            config: in_memory_config(),
            error_injection: Mutex::new(None),
            call_history: Mutex::new(Vec::new()),
        }
    }

    pub fn inject_error(&self, error: TaskError) {
        *self.error_injection.lock().unwrap() = Some(error);
    }

    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().unwrap().clone()
    }

    pub fn assert_called(&self, method: &str) {
        let history = self.call_history.lock().unwrap();
        assert!(
            history.iter().any(|call| call == method),
            "method '{method}' was not called. call history: {history:?}"
        );
    }

    fn check_error_injection(&self) -> Result<()> {
        match self.error_injection.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn record_call(&self, method: &str) {
        self.call_history.lock().unwrap().push(method.to_string());
    }
}

#[async_trait]
impl TaskOperations for MockTaskOperations {
    async fn add_task(&self, params: AddTaskParams) -> Result<Task> {
        self.record_call("add_task");
        self.check_error_injection()?;
        self.repo.lock().unwrap().add(params.into())
    }

    async fn update_task(&self, params: UpdateTaskParams) -> Result<Task> {
        self.record_call("update_task");
        self.check_error_injection()?;
        let id = params.id;
        self.repo.lock().unwrap().update(id, params.into())
    }

    async fn select_tasks(&self, params: SelectTasksParams) -> Result<QueryResult> {
        self.record_call("select_tasks");
        self.check_error_injection()?;
        self.repo.lock().unwrap().query(&params.into())
    }

    async fn complete_task(&self, params: CompleteTaskParams) -> Result<Task> {
        self.record_call("complete_task");
        self.check_error_injection()?;
        self.repo.lock().unwrap().complete(params.id)
    }

    async fn delete_task(&self, params: DeleteTaskParams) -> Result<Task> {
        self.record_call("delete_task");
        self.check_error_injection()?;
        self.repo.lock().unwrap().delete(params.id)
    }

    async fn reopen_task(&self, params: ReopenTaskParams) -> Result<Task> {
        self.record_call("reopen_task");
        self.check_error_injection()?;
        self.repo.lock().unwrap().reopen(params.id)
    }

    async fn work_on(&self, params: WorkOnParams) -> Result<WorkOnResult> {
        self.record_call("work_on");
        self.check_error_injection()?;
        let task = self.repo.lock().unwrap().get(params.id)?.clone();
        Ok(WorkOnResult { task, branch: None, worktree_path: None })
    }

    async fn cleanup(&self, params: CleanupParams) -> Result<Task> {
        self.record_call("cleanup");
        self.check_error_injection()?;
        Ok(self.repo.lock().unwrap().get(params.id)?.clone())
    }

    async fn execution_state(&self) -> Result<ExecutionState> {
        self.record_call("execution_state");
        self.check_error_injection()?;
        Ok(ExecutionState { task_id: None, story_id: None, task_start_time: chrono::Utc::now() })
    }

    async fn is_blocked(&self, id: u64) -> Result<BlockedStatus> {
        self.record_call("is_blocked");
        self.check_error_injection()?;
        self.repo.lock().unwrap().is_blocked(id)
    }

    async fn append_shared_context(&self, params: AppendSharedContextParams) -> Result<Task> {
        self.record_call("append_shared_context");
        self.check_error_injection()?;
        self.repo.lock().unwrap().append_shared_context(params.id, params.entry)
    }

    async fn append_session_event(&self, params: AppendSessionEventParams) -> Result<Task> {
        self.record_call("append_session_event");
        self.check_error_injection()?;
        self.repo.lock().unwrap().append_session_event(params.id, params.event)
    }

    fn config(&self) -> &ResolvedConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_every_call_in_order() {
        let ops = MockTaskOperations::new();
        let task = ops
            .add_task(AddTaskParams { title: "x".into(), category: "simple".into(), ..Default::default() })
            .await
            .unwrap();
        ops.select_tasks(SelectTasksParams { id: Some(task.id), ..Default::default() }).await.unwrap();
        assert_eq!(ops.call_history(), vec!["add_task", "select_tasks"]);
    }

    #[tokio::test]
    async fn injected_error_is_returned_once() {
        let ops = MockTaskOperations::new();
        ops.inject_error(TaskError::not_found_id("add_task", 1));
        let result = ops
            .add_task(AddTaskParams { title: "x".into(), category: "simple".into(), ..Default::default() })
            .await;
        assert!(result.is_err());

        let result = ops
            .add_task(AddTaskParams { title: "y".into(), category: "simple".into(), ..Default::default() })
            .await;
        assert!(result.is_ok());
    }
}
