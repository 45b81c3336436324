//! Standard fixtures covering the task lifecycle: open, in-progress,
//! blocked, closed, deleted, and a parent/child pair.

use task_core::{NewTask, Relation, RelationType, Task, TaskStatus, UpdateTask};

use crate::builders::{NewTaskBuilder, TaskBuilder, UpdateTaskBuilder};

pub fn create_test_task() -> Task {
    TaskBuilder::new()
        .with_id(1)
        .with_title("Investigate intermittent test failure")
        .with_category("standard")
        .build()
}

pub fn create_test_task_with_status(status: TaskStatus) -> Task {
    TaskBuilder::new().with_id(1).with_status(status).build()
}

pub fn create_test_tasks(count: u64) -> Vec<Task> {
    (1..=count)
        .map(|id| {
            let status = match id % 4 {
                0 => TaskStatus::Open,
                1 => TaskStatus::InProgress,
                2 => TaskStatus::Blocked,
                _ => TaskStatus::Closed,
            };
            TaskBuilder::new()
                .with_id(id)
                .with_title(format!("Task {id}"))
                .with_category("simple")
                .with_status(status)
                .build()
        })
        .collect()
}

/// One task in each status, for exercising `include_archived` filtering.
pub fn create_tasks_in_all_statuses() -> Vec<Task> {
    [
        TaskStatus::Open,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Closed,
        TaskStatus::Deleted,
    ]
    .into_iter()
    .enumerate()
    .map(|(i, status)| {
        TaskBuilder::new()
            .with_id(i as u64 + 1)
            .with_title(format!("{status} task"))
            .with_status(status)
            .build()
    })
    .collect()
}

/// A parent with two children, one of which blocks on the other.
pub fn create_parent_with_children() -> (Task, Task, Task) {
    let parent = TaskBuilder::new().with_id(1).with_title("Epic").build();
    let blocker = TaskBuilder::new()
        .with_id(2)
        .with_parent_id(1)
        .with_title("Prerequisite step")
        .build();
    let blocked = TaskBuilder::new()
        .with_id(3)
        .with_parent_id(1)
        .with_title("Dependent step")
        .with_relations(vec![Relation {
            id: 1,
            relates_to: 2,
            as_type: RelationType::BlockedBy,
        }])
        .build();
    (parent, blocker, blocked)
}

pub fn create_new_task() -> NewTask {
    NewTaskBuilder::new()
        .with_title("A freshly reported task")
        .with_category("simple")
        .build()
}

pub fn create_update_task() -> UpdateTask {
    UpdateTaskBuilder::new().with_title("Revised title").build()
}
