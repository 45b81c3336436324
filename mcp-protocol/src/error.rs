//! Maps [`task_core::TaskError`] onto `rmcp`'s error type at the MCP
//! boundary; everywhere else in this crate keeps propagating `TaskError`.

use rmcp::ErrorData as McpError;
use task_core::TaskError;

pub fn to_mcp_error(err: TaskError) -> McpError {
    match &err {
        TaskError::Validation { .. } => McpError::invalid_params(err.to_string(), None),
        TaskError::NotFound { .. } => McpError::invalid_params(err.to_string(), None),
        _ => McpError::internal_error(err.to_string(), None),
    }
}
