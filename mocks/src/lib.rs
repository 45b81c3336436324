//! Test fixtures and doubles for the task-tracking operation surface.
//!
//! Provides:
//! - Builders for `Task`/`NewTask`/`UpdateTask`/`TaskFilter`
//! - Fixture functions covering the task lifecycle
//! - A `MockTaskOperations` double with error injection and call tracking
//! - Custom assertions
//! - Contract tests any `TaskOperations` implementation should pass
//! - Realistic random data generators

pub mod assertions;
pub mod builders;
pub mod contracts;
pub mod fixtures;
pub mod generators;
pub mod repository;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
pub use repository::MockTaskOperations;
