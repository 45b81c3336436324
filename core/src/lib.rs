//! Task Core Library
//!
//! Foundational domain models, the in-memory repository engine, and the
//! operation-surface types shared by the CLI and the MCP tool router. Every
//! other crate in the workspace depends on the types defined here.
//!
//! # Modules
//!
//! - [`models`] - domain types (`Task`, `Relation`, `ExecutionState`, ...)
//! - [`error`] - structured error taxonomy
//! - [`codec`] - line-delimited record encode/decode
//! - [`config`] - `.mcp-tasks.edn` resolution
//! - [`repository`] - in-memory task engine and blocking-status traversal
//! - [`validation`] - business-rule checks
//! - [`protocol`] - operation surface (C9) shared by CLI and MCP

pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod protocol;
pub mod repository;
pub mod validation;

pub use error::{Result, TaskError};
pub use models::{
    BlockedStatus, ExecutionState, NewTask, QueryResult, Relation, RelationType, SessionEvent,
    StatusFilter, Task, TaskFilter, TaskStatus, TaskType, UpdateTask,
};
pub use protocol::{
    AddTaskParams, AppendSessionEventParams, AppendSharedContextParams, CleanupParams,
    CompleteTaskParams, DeleteTaskParams, HealthStatus, ReopenTaskParams, SelectTasksParams,
    TaskOperations, UpdateTaskParams, WorkOnParams, WorkOnResult,
};
pub use repository::TaskRepository;
pub use validation::{PromptCatalog, StaticPromptCatalog, TaskValidator};

/// Current version of the core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current crate name.
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_constants_are_populated() {
        assert!(!VERSION.is_empty());
        assert_eq!(CRATE_NAME, "task-core");
    }

    #[test]
    fn re_exports_resolve() {
        let status = TaskStatus::Open;
        assert_eq!(format!("{status}"), "open");

        let err = TaskError::not_found_id("get", 1);
        assert!(err.is_not_found());
    }
}
