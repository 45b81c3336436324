use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias for task operations.
pub type Result<T> = std::result::Result<T, TaskError>;

/// Structured error taxonomy for the task repository and its collaborators
/// (spec.md §7). Every variant carries `attempted_operation` plus enough
/// context to retry, so the operation surface can report a response without
/// re-deriving what went wrong.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    #[error("validation failed during {attempted_operation}: {message}")]
    Validation {
        attempted_operation: String,
        message: String,
        context: BTreeMap<String, String>,
    },

    #[error("not found during {attempted_operation}: {message}")]
    NotFound {
        attempted_operation: String,
        message: String,
        context: BTreeMap<String, String>,
    },

    #[error("illegal state during {attempted_operation}: {message}")]
    State {
        attempted_operation: String,
        message: String,
        context: BTreeMap<String, String>,
    },

    #[error("lock acquisition timed out during {attempted_operation} after {waited_ms}ms")]
    Lock {
        attempted_operation: String,
        waited_ms: u64,
    },

    #[error("sync failed during {attempted_operation}: {message}")]
    Sync {
        attempted_operation: String,
        message: String,
    },

    #[error("git operation failed during {attempted_operation}: {message}")]
    Git {
        attempted_operation: String,
        message: String,
    },

    #[error("internal error during {attempted_operation}: {message}")]
    Internal {
        attempted_operation: String,
        message: String,
    },
}

impl TaskError {
    pub fn validation(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            attempted_operation: op.into(),
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    pub fn validation_with(
        op: impl Into<String>,
        message: impl Into<String>,
        context: BTreeMap<String, String>,
    ) -> Self {
        Self::Validation {
            attempted_operation: op.into(),
            message: message.into(),
            context,
        }
    }

    pub fn not_found_id(op: impl Into<String>, id: u64) -> Self {
        let mut context = BTreeMap::new();
        context.insert("id".to_string(), id.to_string());
        Self::NotFound {
            attempted_operation: op.into(),
            message: format!("task {id} not found"),
            context,
        }
    }

    pub fn state(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::State {
            attempted_operation: op.into(),
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    pub fn cycle(op: impl Into<String>, cycle: &[u64]) -> Self {
        let mut context = BTreeMap::new();
        context.insert(
            "cycle".to_string(),
            cycle
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(","),
        );
        Self::Validation {
            attempted_operation: op.into(),
            message: format!(
                "circular blocked-by dependency: {}",
                cycle
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(" -> ")
            ),
            context,
        }
    }

    pub fn lock_timeout(op: impl Into<String>, waited_ms: u64) -> Self {
        Self::Lock {
            attempted_operation: op.into(),
            waited_ms,
        }
    }

    pub fn sync(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sync {
            attempted_operation: op.into(),
            message: message.into(),
        }
    }

    pub fn git(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            attempted_operation: op.into(),
            message: message.into(),
        }
    }

    pub fn internal(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            attempted_operation: op.into(),
            message: message.into(),
        }
    }

    pub fn attempted_operation(&self) -> &str {
        match self {
            Self::Validation {
                attempted_operation, ..
            }
            | Self::NotFound {
                attempted_operation, ..
            }
            | Self::State {
                attempted_operation, ..
            }
            | Self::Lock {
                attempted_operation, ..
            }
            | Self::Sync {
                attempted_operation, ..
            }
            | Self::Git {
                attempted_operation, ..
            }
            | Self::Internal {
                attempted_operation, ..
            } => attempted_operation,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_carries_id_context() {
        let err = TaskError::not_found_id("get", 42);
        assert!(err.is_not_found());
        assert_eq!(err.attempted_operation(), "get");
    }

    #[test]
    fn cycle_formats_the_back_edge() {
        let err = TaskError::cycle("update", &[1, 2, 1]);
        assert!(err.is_validation());
        assert!(err.to_string().contains("1 -> 2 -> 1"));
    }
}
