//! File-based persistence for the task repository (C3).
//!
//! `tasks.ednl` and `complete.ednl` are rewritten atomically (temp file +
//! rename) under a cross-process advisory lock, so concurrent CLI/MCP
//! invocations against the same tasks directory never corrupt either
//! stream. `.mcp-tasks-current.edn` is simpler: it's per-working-directory
//! state with no cross-process contention to guard against.

mod execution_state;
mod file_store;
mod lock;

pub use execution_state::{clear as clear_execution_state, load as load_execution_state, save as save_execution_state};
pub use file_store::FileStore;
pub use lock::{acquire as acquire_lock, LockGuard};
