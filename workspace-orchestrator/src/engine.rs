//! Concrete [`TaskOperations`] implementation: wires the repository engine,
//! the file store's locking/persistence, and the git coordinator together
//! into the operations the CLI and MCP tool router both call through.

use async_trait::async_trait;

use task_core::config::ResolvedConfig;
use task_core::error::Result;
use task_core::models::{ExecutionState, Task};
use task_core::protocol::{
    AddTaskParams, AppendSessionEventParams, AppendSharedContextParams, CleanupParams,
    CompleteTaskParams, DeleteTaskParams, QueryResult, ReopenTaskParams, SelectTasksParams,
    TaskOperations, UpdateTaskParams, WorkOnParams, WorkOnResult,
};
use task_core::validation::{PromptCatalog, StaticPromptCatalog, TaskValidator};
use task_core::BlockedStatus;
use tasks_store::FileStore;

use crate::coordinator;

pub struct TaskEngine {
    config: ResolvedConfig,
    store: FileStore,
    catalog: Box<dyn PromptCatalog + Send + Sync>,
}

impl TaskEngine {
    pub fn open(config: ResolvedConfig) -> Result<Self> {
        let store = FileStore::new(&config)?;
        Ok(Self {
            config,
            store,
            catalog: Box::new(StaticPromptCatalog),
        })
    }

    pub fn with_catalog(mut self, catalog: Box<dyn PromptCatalog + Send + Sync>) -> Self {
        self.catalog = catalog;
        self
    }
}

#[async_trait]
impl TaskOperations for TaskEngine {
    async fn add_task(&self, params: AddTaskParams) -> Result<Task> {
        let new_task = params.into();
        TaskValidator::validate_new_task(&new_task, self.catalog.as_ref())?;
        self.store.with_transaction("add_task", |repo| repo.add(new_task))
    }

    async fn update_task(&self, params: UpdateTaskParams) -> Result<Task> {
        let id = params.id;
        let update = params.into();
        TaskValidator::validate_update(id, &update, self.catalog.as_ref())?;
        self.store.with_transaction("update_task", |repo| repo.update(id, update))
    }

    async fn select_tasks(&self, params: SelectTasksParams) -> Result<QueryResult> {
        let filter = params.into();
        let repo = self.store.load()?;
        repo.query(&filter)
    }

    async fn complete_task(&self, params: CompleteTaskParams) -> Result<Task> {
        let pr_num = params.pr_num;
        self.store.with_transaction("complete_task", |repo| {
            let task = repo.complete(params.id)?;
            if let Some(pr_num) = pr_num {
                let updated = repo.update(
                    task.id,
                    task_core::models::UpdateTask {
                        pr_num: Some(pr_num),
                        ..Default::default()
                    },
                );
                // pr_num is recorded on a best-effort basis: the task has
                // already moved to the archive, so a missed update here
                // isn't fatal.
                let _ = updated;
            }
            Ok(task)
        })
    }

    async fn delete_task(&self, params: DeleteTaskParams) -> Result<Task> {
        self.store.with_transaction("delete_task", |repo| repo.delete(params.id))
    }

    async fn reopen_task(&self, params: ReopenTaskParams) -> Result<Task> {
        self.store.with_transaction("reopen_task", |repo| repo.reopen(params.id))
    }

    async fn work_on(&self, params: WorkOnParams) -> Result<WorkOnResult> {
        let outcome = coordinator::work_on(&self.config, &self.store, params.id)?;
        Ok(WorkOnResult {
            task: outcome.task,
            branch: outcome.branch,
            worktree_path: outcome.worktree_path,
        })
    }

    async fn cleanup(&self, params: CleanupParams) -> Result<Task> {
        coordinator::cleanup(&self.config, &self.store, params.id)
    }

    async fn execution_state(&self) -> Result<ExecutionState> {
        let state = tasks_store::load_execution_state(&self.config.base_dir)?;
        Ok(state.unwrap_or(ExecutionState {
            task_id: None,
            story_id: None,
            task_start_time: chrono::Utc::now(),
        }))
    }

    async fn is_blocked(&self, id: u64) -> Result<BlockedStatus> {
        let repo = self.store.load()?;
        repo.is_blocked(id)
    }

    async fn append_shared_context(&self, params: AppendSharedContextParams) -> Result<Task> {
        // I6: prefix with "Task N: " when execution state names a current
        // task; a direct append with no execution state passes through
        // unprefixed.
        let current_task_id = self.execution_state().await?.task_id;
        let entry = match current_task_id {
            Some(task_id) => format!("Task {task_id}: {}", params.entry),
            None => params.entry,
        };
        self.store.with_transaction("append_shared_context", |repo| {
            repo.append_shared_context(params.id, entry)
        })
    }

    async fn append_session_event(&self, params: AppendSessionEventParams) -> Result<Task> {
        self.store.with_transaction("append_session_event", |repo| {
            repo.append_session_event(params.id, params.event)
        })
    }

    fn config(&self) -> &ResolvedConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use task_core::config;
    use tempfile::tempdir;

    fn engine_in(dir: &std::path::Path) -> TaskEngine {
        let resolved = config::resolve(dir).unwrap();
        TaskEngine::open(resolved).unwrap()
    }

    #[tokio::test]
    async fn add_then_select_round_trips() {
        let dir = tempdir().unwrap();
        let engine = engine_in(dir.path());

        let task = engine
            .add_task(AddTaskParams {
                title: "Investigate timeout".to_string(),
                category: "simple".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let result = engine
            .select_tasks(SelectTasksParams {
                id: Some(task.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(result.total_matches, 1);
    }

    #[tokio::test]
    async fn add_task_rejects_an_unknown_category() {
        let dir = tempdir().unwrap();
        let engine = engine_in(dir.path());

        let result = engine
            .add_task(AddTaskParams {
                title: "Investigate timeout".to_string(),
                category: "not-a-real-category".to_string(),
                ..Default::default()
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn complete_then_reopen_round_trips_status() {
        let dir = tempdir().unwrap();
        let engine = engine_in(dir.path());
        let task = engine
            .add_task(AddTaskParams {
                title: "Ship the release".to_string(),
                category: "simple".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let completed = engine
            .complete_task(CompleteTaskParams { id: task.id, pr_num: Some(42) })
            .await
            .unwrap();
        assert_eq!(completed.status, task_core::TaskStatus::Closed);

        let reopened = engine.reopen_task(ReopenTaskParams { id: task.id }).await.unwrap();
        assert_eq!(reopened.status, task_core::TaskStatus::Open);
    }

    #[tokio::test]
    async fn append_shared_context_passes_through_unprefixed_with_no_execution_state() {
        let dir = tempdir().unwrap();
        let engine = engine_in(dir.path());
        let task = engine
            .add_task(AddTaskParams {
                title: "Direct append".to_string(),
                category: "simple".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = engine
            .append_shared_context(AppendSharedContextParams { id: task.id, entry: "a note".to_string() })
            .await
            .unwrap();
        assert_eq!(updated.shared_context, vec!["a note"]);
    }

    #[tokio::test]
    async fn append_shared_context_prefixes_with_the_in_progress_task_id() {
        let dir = tempdir().unwrap();
        let engine = engine_in(dir.path());
        let task = engine
            .add_task(AddTaskParams {
                title: "Prefixed append".to_string(),
                category: "simple".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        tasks_store::save_execution_state(
            &engine.config().base_dir,
            &ExecutionState { task_id: Some(task.id), story_id: None, task_start_time: chrono::Utc::now() },
        )
        .unwrap();

        let updated = engine
            .append_shared_context(AppendSharedContextParams { id: task.id, entry: "a note".to_string() })
            .await
            .unwrap();
        assert_eq!(updated.shared_context, vec![format!("Task {}: a note", task.id)]);
    }

    #[tokio::test]
    async fn append_session_event_preserves_existing_entries() {
        let dir = tempdir().unwrap();
        let engine = engine_in(dir.path());
        let task = engine
            .add_task(AddTaskParams {
                title: "Session events".to_string(),
                category: "simple".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = engine
            .append_session_event(AppendSessionEventParams {
                id: task.id,
                event: task_core::models::SessionEvent::SessionStart {
                    timestamp: chrono::Utc::now(),
                    session_id: "s1".to_string(),
                },
            })
            .await
            .unwrap();
        assert_eq!(updated.session_events.len(), 1);
    }
}
