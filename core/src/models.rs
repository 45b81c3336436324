use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum serialized size, in bytes, of `shared_context` or `session_events`.
pub const APPEND_LOG_MAX_BYTES: usize = 51_200;

/// A unit of work tracked by the repository.
///
/// Mirrors the on-disk EDNL record written to `tasks.ednl` /
/// `complete.ednl`; every field round-trips through [`crate::codec`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: u64,
    #[serde(default, alias = "parentId")]
    pub parent_id: Option<u64>,
    pub status: TaskStatus,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub design: String,
    pub category: String,
    #[serde(rename = "type", alias = "task_type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub meta: HashMap<String, String>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub shared_context: Vec<String>,
    #[serde(default)]
    pub session_events: Vec<SessionEvent>,
    #[serde(default, alias = "codeReviewed")]
    pub code_reviewed: Option<DateTime<Utc>>,
    #[serde(default, alias = "prNum")]
    pub pr_num: Option<u64>,
}

/// Task lifecycle state. `Open`, `InProgress`, `Blocked` are the "blocking
/// statuses" that count as incomplete for dependency resolution.
#[derive(Debug, Clone, Copy, Hash, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Blocked,
    Closed,
    Deleted,
}

impl TaskStatus {
    /// `open`, `in-progress`, `blocked` count as incomplete.
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Open | Self::InProgress | Self::Blocked)
    }

    /// `closed` or `deleted`: the task is resolved and lives in the archive.
    pub fn is_archived(self) -> bool {
        matches!(self, Self::Closed | Self::Deleted)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::InProgress => "in-progress",
            Self::Blocked => "blocked",
            Self::Closed => "closed",
            Self::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Hash, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Task,
    Bug,
    Feature,
    Story,
    Chore,
}

/// A directed edge from the owning task to another task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relation {
    pub id: u64,
    #[serde(alias = "relatesTo")]
    pub relates_to: u64,
    #[serde(alias = "asType")]
    pub as_type: RelationType,
}

#[derive(Debug, Clone, Copy, Hash, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    BlockedBy,
    Related,
    DiscoveredDuring,
}

/// An entry appended to a task's `session_events` log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_type", rename_all = "kebab-case")]
pub enum SessionEvent {
    UserPrompt {
        timestamp: DateTime<Utc>,
        content: String,
    },
    Compaction {
        timestamp: DateTime<Utc>,
        trigger: String,
    },
    SessionStart {
        timestamp: DateTime<Utc>,
        session_id: String,
    },
}

impl SessionEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::UserPrompt { timestamp, .. }
            | Self::Compaction { timestamp, .. }
            | Self::SessionStart { timestamp, .. } => *timestamp,
        }
    }
}

/// Fields supplied when creating a task; `id` and `status` are assigned by
/// the repository.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub parent_id: Option<u64>,
    pub title: String,
    pub description: String,
    pub design: String,
    pub category: String,
    pub task_type: Option<TaskType>,
    pub meta: HashMap<String, String>,
    pub relations: Vec<Relation>,
    pub prepend: bool,
}

/// Partial update; only `Some` fields are applied. List-valued fields are
/// overwritten wholesale (per spec.md §3), not merged.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub design: Option<String>,
    pub category: Option<String>,
    pub task_type: Option<TaskType>,
    pub meta: Option<HashMap<String, String>>,
    pub relations: Option<Vec<Relation>>,
    pub code_reviewed: Option<DateTime<Utc>>,
    pub pr_num: Option<u64>,
}

/// Filter criteria for `query`; fields compose with AND.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub id: Option<u64>,
    pub category: Option<String>,
    pub parent_id: Option<u64>,
    /// Tried as a regex first; on parse failure, falls back to a
    /// case-insensitive substring match (decided in SPEC_FULL.md §E.3).
    pub title_pattern: Option<String>,
    pub task_type: Option<TaskType>,
    pub status: Option<StatusFilter>,
}

/// `status` defaults to excluding archived tasks; `Any` includes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    NonArchived,
    Exact(TaskStatus),
    Any,
}

/// Per-working-directory execution state (`.mcp-tasks-current.edn`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionState {
    pub task_id: Option<u64>,
    pub story_id: Option<u64>,
    pub task_start_time: DateTime<Utc>,
}

/// Result of the blocking traversal (`is_blocked`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockedStatus {
    pub blocked: bool,
    pub blocking_ids: Vec<u64>,
    pub circular_dependency: Option<Vec<u64>>,
    pub missing_ids: Vec<u64>,
}

/// Outcome of `query`: matches plus metadata UI layers render.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    pub tasks: Vec<Task>,
    pub total_matches: usize,
    /// Set only for `parent_id` queries: count of closed children.
    pub completed_child_count: Option<usize>,
}
