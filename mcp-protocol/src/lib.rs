//! MCP Protocol Implementation
//!
//! Exposes the task-core operation surface (C9) as `rmcp` tools, served over
//! stdio by `mcp-server`. Tool calls are thin: parse scalar arguments into a
//! `task-core` parameter struct, delegate to [`TaskOperations`], log the
//! outcome, and render the result as JSON.

pub mod error;
pub mod handler;
pub mod request_logger;

pub use handler::TaskToolHandler;
pub use task_core::protocol::TaskOperations;
