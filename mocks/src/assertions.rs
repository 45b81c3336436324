//! Custom assertions for task equality, matching, and ordering.

use task_core::{Task, TaskStatus};

/// Assert tasks are equal ignoring their append-only logs and timestamps.
pub fn assert_task_equals(actual: &Task, expected: &Task) {
    assert_eq!(actual.id, expected.id, "task ids don't match");
    assert_eq!(actual.title, expected.title, "task titles don't match");
    assert_eq!(actual.category, expected.category, "task categories don't match");
    assert_eq!(actual.status, expected.status, "task statuses don't match");
    assert_eq!(actual.parent_id, expected.parent_id, "task parent ids don't match");
}

pub fn assert_task_matches(task: &Task, matcher: &TaskMatcher) {
    if let Some(id) = matcher.id {
        assert_eq!(task.id, id, "task id doesn't match expected");
    }
    if let Some(ref title) = matcher.title {
        assert_eq!(&task.title, title, "task title doesn't match expected");
    }
    if let Some(ref category) = matcher.category {
        assert_eq!(&task.category, category, "task category doesn't match expected");
    }
    if let Some(status) = matcher.status {
        assert_eq!(task.status, status, "task status doesn't match expected");
    }
}

pub fn assert_contains_task_with_title(tasks: &[Task], title: &str) {
    assert!(
        tasks.iter().any(|t| t.title == title),
        "expected a task titled '{title}', found: {:?}",
        tasks.iter().map(|t| &t.title).collect::<Vec<_>>()
    );
}

pub fn assert_ids_in_insertion_order(tasks: &[Task]) {
    for window in tasks.windows(2) {
        assert!(
            window[0].id <= window[1].id,
            "tasks are not in insertion order: {} appears before {}",
            window[0].id,
            window[1].id
        );
    }
}

#[derive(Debug, Default)]
pub struct TaskMatcher {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}
