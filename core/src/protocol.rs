//! Operation surface (C9): the named operations exposed identically by
//! the CLI and by MCP tools, plus their parameter/result DTOs. Both
//! front ends call through [`TaskOperations`]; neither re-implements
//! business logic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ResolvedConfig;
use crate::error::Result;
use crate::models::{
    BlockedStatus, ExecutionState, NewTask, Relation, SessionEvent, StatusFilter, Task, TaskFilter,
    TaskType, UpdateTask,
};
pub use crate::models::QueryResult;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AddTaskParams {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub design: String,
    pub category: String,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub prepend: bool,
}

impl From<AddTaskParams> for NewTask {
    fn from(p: AddTaskParams) -> Self {
        Self {
            parent_id: p.parent_id,
            title: p.title,
            description: p.description,
            design: p.design,
            category: p.category,
            task_type: p.task_type,
            meta: Default::default(),
            relations: p.relations,
            prepend: p.prepend,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct UpdateTaskParams {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub design: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub relations: Option<Vec<Relation>>,
}

impl From<UpdateTaskParams> for UpdateTask {
    fn from(p: UpdateTaskParams) -> Self {
        Self {
            title: p.title,
            description: p.description,
            design: p.design,
            category: p.category,
            task_type: p.task_type,
            meta: None,
            relations: p.relations,
            code_reviewed: None,
            pr_num: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SelectTasksParams {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub title_pattern: Option<String>,
    #[serde(default)]
    pub task_type: Option<TaskType>,
    #[serde(default)]
    pub include_archived: bool,
}

impl From<SelectTasksParams> for TaskFilter {
    fn from(p: SelectTasksParams) -> Self {
        Self {
            id: p.id,
            category: p.category,
            parent_id: p.parent_id,
            title_pattern: p.title_pattern,
            task_type: p.task_type,
            status: if p.include_archived {
                Some(StatusFilter::Any)
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompleteTaskParams {
    pub id: u64,
    #[serde(default)]
    pub pr_num: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteTaskParams {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReopenTaskParams {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkOnParams {
    pub id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkOnResult {
    pub task: Task,
    pub branch: Option<String>,
    pub worktree_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupParams {
    pub id: u64,
}

/// Appends one entry to a task's `shared-context` log (I5/I6/P5). `entry`
/// is the raw text; the `"Task N: "` prefix, when execution state names a
/// current task, is applied by the implementation, not the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppendSharedContextParams {
    pub id: u64,
    pub entry: String,
}

/// Appends one entry to a task's `session-events` log (I5/P5).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppendSessionEventParams {
    pub id: u64,
    pub event: SessionEvent,
}

/// The operations the CLI and MCP tool router both dispatch to.
/// Implementations hold the loaded repository, the git adapter, and the
/// resolved config; every call persists and releases the cross-process
/// lock before returning.
#[async_trait]
pub trait TaskOperations: Send + Sync {
    async fn add_task(&self, params: AddTaskParams) -> Result<Task>;
    async fn update_task(&self, params: UpdateTaskParams) -> Result<Task>;
    async fn select_tasks(&self, params: SelectTasksParams) -> Result<QueryResult>;
    async fn complete_task(&self, params: CompleteTaskParams) -> Result<Task>;
    async fn delete_task(&self, params: DeleteTaskParams) -> Result<Task>;
    async fn reopen_task(&self, params: ReopenTaskParams) -> Result<Task>;
    async fn work_on(&self, params: WorkOnParams) -> Result<WorkOnResult>;
    async fn cleanup(&self, params: CleanupParams) -> Result<Task>;
    async fn execution_state(&self) -> Result<ExecutionState>;
    async fn is_blocked(&self, id: u64) -> Result<BlockedStatus>;
    async fn append_shared_context(&self, params: AppendSharedContextParams) -> Result<Task>;
    async fn append_session_event(&self, params: AppendSessionEventParams) -> Result<Task>;
    fn config(&self) -> &ResolvedConfig;
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub active_count: usize,
    pub complete_count: usize,
    pub message: String,
}
