//! Integration tests for the mocks crate.
//!
//! Exercises the builders, fixtures, assertions, generators, and the
//! `MockTaskOperations` double together to make sure they compose the way
//! real callers (the MCP tool router, the CLI) would use them.

use mocks::*;
use task_core::protocol::{AddTaskParams, SelectTasksParams, TaskOperations};
use task_core::{TaskStatus, TaskType};

#[tokio::test]
async fn mock_operations_basic_lifecycle() {
    let ops = MockTaskOperations::new();

    let task = ops
        .add_task(AddTaskParams {
            title: "New task via mock".to_string(),
            category: "simple".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(task.id, 1);
    assert_eq!(task.status, TaskStatus::Open);
    ops.assert_called("add_task");

    let found = ops
        .select_tasks(SelectTasksParams { id: Some(task.id), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(found.total_matches, 1);
    ops.assert_called("select_tasks");
}

#[tokio::test]
async fn mock_operations_error_injection() {
    let ops = MockTaskOperations::new();

    ops.inject_error(task_core::TaskError::not_found_id("select_tasks", 1));
    let result = ops.select_tasks(SelectTasksParams { id: Some(1), ..Default::default() }).await;
    assert!(result.is_err());

    // error injection is one-shot: the next call succeeds
    let result = ops.select_tasks(SelectTasksParams { id: Some(1), ..Default::default() }).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn fixtures_cover_every_status() {
    let tasks = create_tasks_in_all_statuses();

    assert_eq!(tasks.len(), 5);
    let statuses: Vec<_> = tasks.iter().map(|t| t.status).collect();
    assert!(statuses.contains(&TaskStatus::Open));
    assert!(statuses.contains(&TaskStatus::InProgress));
    assert!(statuses.contains(&TaskStatus::Blocked));
    assert!(statuses.contains(&TaskStatus::Closed));
    assert!(statuses.contains(&TaskStatus::Deleted));
}

#[test]
fn builders_task_builder() {
    let task = TaskBuilder::new()
        .with_id(42)
        .with_title("Built task")
        .with_category("complex")
        .with_status(TaskStatus::InProgress)
        .build();

    assert_eq!(task.id, 42);
    assert_eq!(task.title, "Built task");
    assert_eq!(task.category, "complex");
    assert_eq!(task.status, TaskStatus::InProgress);
}

#[test]
fn assertions_task_equals_ignores_append_only_logs() {
    let task1 = create_test_task();
    let mut task2 = task1.clone();
    task2.shared_context.push("unrelated log line".to_string());

    // shared_context isn't compared, so this should still pass.
    assert_task_equals(&task1, &task2);

    task2.title = "Different title".to_string();
    let result = std::panic::catch_unwind(|| assert_task_equals(&task1, &task2));
    assert!(result.is_err());
}

#[test]
fn generators_produce_realistic_data() {
    let task = generate_new_task();

    assert!(!task.title.trim().is_empty());
    assert!(!task.description.trim().is_empty());
    assert_eq!(task.task_type, Some(TaskType::Task));
}

#[tokio::test]
async fn contract_suite_passes_against_the_mock() {
    let ops = MockTaskOperations::new();

    mocks::contracts::test_operations_contract(&ops).await;

    let history = ops.call_history();
    assert!(!history.is_empty(), "mock should have recorded method calls");
    assert!(history.iter().any(|call| call == "add_task"));
    assert!(history.iter().any(|call| call == "select_tasks"));
}
