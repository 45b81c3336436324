//! Business-rule validation for task creation and updates (spec.md §3
//! invariants). Pure functions over `task-core` types; no I/O.

use crate::error::{Result, TaskError};
use crate::models::{NewTask, Relation, UpdateTask, APPEND_LOG_MAX_BYTES};

const MAX_TITLE_LEN: usize = 500;
const MAX_CATEGORY_LEN: usize = 100;

/// Category names a `category` must match (spec.md §3: "category must
/// correspond to an available prompt"). Kept deliberately small; real prompt
/// content and discovery are an external collaborator's concern.
pub trait PromptCatalog {
    fn categories(&self) -> &[&str];

    fn has_category(&self, category: &str) -> bool {
        self.categories().iter().any(|c| *c == category)
    }
}

/// Default catalog covering the task types spec.md names as examples.
pub struct StaticPromptCatalog;

const DEFAULT_CATEGORIES: &[&str] = &["simple", "standard", "complex", "research", "spike"];

impl PromptCatalog for StaticPromptCatalog {
    fn categories(&self) -> &[&str] {
        DEFAULT_CATEGORIES
    }
}

pub struct TaskValidator;

impl TaskValidator {
    pub fn validate_title(title: &str) -> Result<()> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(TaskError::validation("validate_title", "title must not be empty"));
        }
        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(TaskError::validation(
                "validate_title",
                format!("title exceeds {MAX_TITLE_LEN} characters"),
            ));
        }
        Ok(())
    }

    pub fn validate_category(category: &str, catalog: &dyn PromptCatalog) -> Result<()> {
        let trimmed = category.trim();
        if trimmed.is_empty() {
            return Err(TaskError::validation(
                "validate_category",
                "category must not be empty",
            ));
        }
        if trimmed.chars().count() > MAX_CATEGORY_LEN {
            return Err(TaskError::validation(
                "validate_category",
                format!("category exceeds {MAX_CATEGORY_LEN} characters"),
            ));
        }
        if !catalog.has_category(trimmed) {
            return Err(TaskError::validation(
                "validate_category",
                format!("category {trimmed} has no corresponding prompt"),
            ));
        }
        Ok(())
    }

    /// Rejects a relation that points a task at itself, per spec.md §3's
    /// "blocked-by must not target the owning task" invariant (I3).
    pub fn validate_relation(owner_id: Option<u64>, relation: &Relation) -> Result<()> {
        if Some(relation.relates_to) == owner_id {
            return Err(TaskError::validation(
                "validate_relation",
                format!("task {} cannot relate to itself", relation.relates_to),
            ));
        }
        Ok(())
    }

    /// `shared_context` and `session_events` are append logs with a byte
    /// ceiling (I5); oversized payloads are rejected rather than truncated.
    pub fn validate_append_log_size(field: &str, serialized_len: usize) -> Result<()> {
        if serialized_len > APPEND_LOG_MAX_BYTES {
            return Err(TaskError::validation(
                "validate_append_log_size",
                format!(
                    "{field} is {serialized_len} bytes, exceeding the {APPEND_LOG_MAX_BYTES}-byte limit"
                ),
            ));
        }
        Ok(())
    }

    pub fn validate_new_task(task: &NewTask, catalog: &dyn PromptCatalog) -> Result<()> {
        Self::validate_title(&task.title)?;
        Self::validate_category(&task.category, catalog)?;
        for relation in &task.relations {
            Self::validate_relation(task.parent_id, relation)?;
        }
        Ok(())
    }

    pub fn validate_update(
        owner_id: u64,
        update: &UpdateTask,
        catalog: &dyn PromptCatalog,
    ) -> Result<()> {
        if let Some(title) = &update.title {
            Self::validate_title(title)?;
        }
        if let Some(category) = &update.category {
            Self::validate_category(category, catalog)?;
        }
        if let Some(relations) = &update.relations {
            for relation in relations {
                Self::validate_relation(Some(owner_id), relation)?;
            }
        }
        Ok(())
    }
}
