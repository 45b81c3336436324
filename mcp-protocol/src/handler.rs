//! `rmcp`-based tool router (C9 as MCP tools): one tool per operation-surface
//! entry, each a thin adapter translating scalar MCP arguments into the
//! corresponding `task-core` parameter struct and delegating to
//! [`TaskOperations`].

use std::future::Future;
use std::sync::Arc;

use rmcp::{
    handler::server::tool::Parameters, model::*, tool, tool_handler, tool_router,
    ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;

use task_core::models::{Relation, SessionEvent};
use task_core::protocol::{
    AddTaskParams, AppendSessionEventParams, AppendSharedContextParams, CleanupParams,
    CompleteTaskParams, DeleteTaskParams, ReopenTaskParams, SelectTasksParams, TaskOperations,
    UpdateTaskParams, WorkOnParams,
};

use crate::error::to_mcp_error;
use crate::request_logger::log_call;

fn parse_relations(json: Option<String>) -> Result<Vec<Relation>, McpError> {
    match json {
        None => Ok(Vec::new()),
        Some(s) if s.trim().is_empty() => Ok(Vec::new()),
        Some(s) => serde_json::from_str(&s)
            .map_err(|e| McpError::invalid_params(format!("malformed relations JSON: {e}"), None)),
    }
}

/// Builds a `SessionEvent` from scalar MCP arguments; `timestamp` is
/// generated at append time when absent, per spec.md's SessionEvent
/// definition.
fn parse_session_event(
    event_type: &str,
    content: Option<String>,
    trigger: Option<String>,
    session_id: Option<String>,
    timestamp: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<SessionEvent, McpError> {
    let timestamp = timestamp.unwrap_or_else(chrono::Utc::now);
    match event_type {
        "user-prompt" => Ok(SessionEvent::UserPrompt {
            timestamp,
            content: content
                .ok_or_else(|| McpError::invalid_params("user-prompt requires content", None))?,
        }),
        "compaction" => Ok(SessionEvent::Compaction {
            timestamp,
            trigger: trigger
                .ok_or_else(|| McpError::invalid_params("compaction requires trigger", None))?,
        }),
        "session-start" => Ok(SessionEvent::SessionStart {
            timestamp,
            session_id: session_id.ok_or_else(|| {
                McpError::invalid_params("session-start requires session_id", None)
            })?,
        }),
        other => Err(McpError::invalid_params(
            format!("unknown event_type: {other}"),
            None,
        )),
    }
}

fn success_json(value: &impl serde::Serialize) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialization failed: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[derive(Clone)]
pub struct TaskToolHandler<O: TaskOperations + 'static> {
    ops: Arc<O>,
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
}

impl<O: TaskOperations + 'static> TaskToolHandler<O> {
    pub fn new(ops: Arc<O>) -> Self {
        Self {
            ops,
            tool_router: Self::tool_router(),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AddTaskRequest {
    title: String,
    category: String,
    description: Option<String>,
    design: Option<String>,
    parent_id: Option<u64>,
    relations_json: Option<String>,
    prepend: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct UpdateTaskRequest {
    id: u64,
    title: Option<String>,
    description: Option<String>,
    design: Option<String>,
    category: Option<String>,
    relations_json: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SelectTasksRequest {
    id: Option<u64>,
    category: Option<String>,
    parent_id: Option<u64>,
    title_pattern: Option<String>,
    include_archived: Option<bool>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CompleteTaskRequest {
    id: u64,
    pr_num: Option<u64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct IdRequest {
    id: u64,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AppendSharedContextRequest {
    id: u64,
    entry: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AppendSessionEventRequest {
    id: u64,
    event_type: String,
    content: Option<String>,
    trigger: Option<String>,
    session_id: Option<String>,
}

#[tool_router]
impl<O: TaskOperations + 'static> TaskToolHandler<O> {
    #[tool(description = "Create a new task with a title and category, optionally under a parent and with blocked-by/related relations")]
    async fn add_task(
        &self,
        Parameters(AddTaskRequest {
            title,
            category,
            description,
            design,
            parent_id,
            relations_json,
            prepend,
        }): Parameters<AddTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        let params = AddTaskParams {
            title,
            description: description.unwrap_or_default(),
            design: design.unwrap_or_default(),
            category,
            task_type: None,
            parent_id,
            relations: parse_relations(relations_json)?,
            prepend: prepend.unwrap_or(false),
        };
        let task = log_call("add_task", &params, self.ops.add_task(params.clone())).await.map_err(to_mcp_error)?;
        success_json(&task)
    }

    #[tool(description = "Update a task's title, description, design, category, or relations")]
    async fn update_task(
        &self,
        Parameters(UpdateTaskRequest {
            id,
            title,
            description,
            design,
            category,
            relations_json,
        }): Parameters<UpdateTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        let relations = match relations_json {
            Some(s) => Some(parse_relations(Some(s))?),
            None => None,
        };
        let params = UpdateTaskParams {
            id,
            title,
            description,
            design,
            category,
            task_type: None,
            relations,
        };
        let task = log_call("update_task", &params, self.ops.update_task(params.clone())).await.map_err(to_mcp_error)?;
        success_json(&task)
    }

    #[tool(description = "Select tasks matching optional id, category, parent id, title pattern, or archived-inclusion filters")]
    async fn select_tasks(
        &self,
        Parameters(SelectTasksRequest {
            id,
            category,
            parent_id,
            title_pattern,
            include_archived,
        }): Parameters<SelectTasksRequest>,
    ) -> Result<CallToolResult, McpError> {
        let params = SelectTasksParams {
            id,
            category,
            parent_id,
            title_pattern,
            task_type: None,
            include_archived: include_archived.unwrap_or(false),
        };
        let result = log_call("select_tasks", &params, self.ops.select_tasks(params.clone())).await.map_err(to_mcp_error)?;
        success_json(&result)
    }

    #[tool(description = "Mark a task complete, moving it to the archive and optionally recording a PR number")]
    async fn complete_task(
        &self,
        Parameters(CompleteTaskRequest { id, pr_num }): Parameters<CompleteTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        let params = CompleteTaskParams { id, pr_num };
        let task = log_call("complete_task", &params, self.ops.complete_task(params.clone())).await.map_err(to_mcp_error)?;
        success_json(&task)
    }

    #[tool(description = "Delete a task, moving it to the archive with a deleted status")]
    async fn delete_task(
        &self,
        Parameters(IdRequest { id }): Parameters<IdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let params = DeleteTaskParams { id };
        let task = log_call("delete_task", &params, self.ops.delete_task(params.clone())).await.map_err(to_mcp_error)?;
        success_json(&task)
    }

    #[tool(description = "Reopen an archived task, moving it back to the active stream as open")]
    async fn reopen_task(
        &self,
        Parameters(IdRequest { id }): Parameters<IdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let params = ReopenTaskParams { id };
        let task = log_call("reopen_task", &params, self.ops.reopen_task(params.clone())).await.map_err(to_mcp_error)?;
        success_json(&task)
    }

    #[tool(description = "Begin work on a task: create its branch/worktree if configured and record execution state")]
    async fn work_on(
        &self,
        Parameters(IdRequest { id }): Parameters<IdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let params = WorkOnParams { id };
        let result = log_call("work_on", &params, self.ops.work_on(params.clone())).await.map_err(to_mcp_error)?;
        success_json(&result)
    }

    #[tool(description = "Tear down a task's workspace: commit outstanding changes if configured, then remove its branch/worktree")]
    async fn cleanup(
        &self,
        Parameters(IdRequest { id }): Parameters<IdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let params = CleanupParams { id };
        let task = log_call("cleanup", &params, self.ops.cleanup(params.clone())).await.map_err(to_mcp_error)?;
        success_json(&task)
    }

    #[tool(description = "Report which task, if any, the current working directory is executing")]
    async fn execution_state(&self) -> Result<CallToolResult, McpError> {
        let state = log_call("execution_state", &(), self.ops.execution_state()).await.map_err(to_mcp_error)?;
        success_json(&state)
    }

    #[tool(description = "Check whether a task is blocked, and by what, following its blocked-by relations")]
    async fn is_blocked(
        &self,
        Parameters(IdRequest { id }): Parameters<IdRequest>,
    ) -> Result<CallToolResult, McpError> {
        let status = log_call("is_blocked", &id, self.ops.is_blocked(id)).await.map_err(to_mcp_error)?;
        success_json(&status)
    }

    #[tool(description = "Append an entry to a task's shared-context log; prefixed with the current in-progress task id when one is set")]
    async fn append_shared_context(
        &self,
        Parameters(AppendSharedContextRequest { id, entry }): Parameters<AppendSharedContextRequest>,
    ) -> Result<CallToolResult, McpError> {
        let params = AppendSharedContextParams { id, entry };
        let task = log_call("append_shared_context", &params, self.ops.append_shared_context(params.clone()))
            .await
            .map_err(to_mcp_error)?;
        success_json(&task)
    }

    #[tool(description = "Append a session event (user-prompt, compaction, or session-start) to a task's session-events log")]
    async fn append_session_event(
        &self,
        Parameters(AppendSessionEventRequest {
            id,
            event_type,
            content,
            trigger,
            session_id,
        }): Parameters<AppendSessionEventRequest>,
    ) -> Result<CallToolResult, McpError> {
        let event = parse_session_event(&event_type, content, trigger, session_id, None)?;
        let params = AppendSessionEventParams { id, event };
        let task = log_call("append_session_event", &params, self.ops.append_session_event(params.clone()))
            .await
            .map_err(to_mcp_error)?;
        success_json(&task)
    }
}

#[tool_handler]
impl<O: TaskOperations + 'static> ServerHandler for TaskToolHandler<O> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Tracks tasks for coding agents across add/update/select/complete/delete/reopen/work-on/cleanup/execution-state/is-blocked/append-shared-context/append-session-event operations.".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
