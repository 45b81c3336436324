//! Git adapter (C5), work-on/cleanup coordinator (C8), and the concrete
//! [`TaskOperations`](task_core::protocol::TaskOperations) engine (C9) that
//! wires the repository, file store, and git coordinator together.

pub mod coordinator;
pub mod engine;
pub mod git;

pub use coordinator::{cleanup, work_on, WorkOnOutcome};
pub use engine::TaskEngine;
