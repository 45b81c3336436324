//! Contract tests any [`TaskOperations`] implementation should pass:
//! drive `MockTaskOperations` and `workspace_orchestrator::TaskEngine`
//! (via `integration-tests`) through the same suite.

use task_core::protocol::{
    AddTaskParams, AppendSessionEventParams, AppendSharedContextParams, CompleteTaskParams,
    DeleteTaskParams, ReopenTaskParams, SelectTasksParams, TaskOperations,
};
use task_core::{SessionEvent, TaskStatus};

pub async fn test_operations_contract<O: TaskOperations>(ops: &O) {
    test_add_contract(ops).await;
    test_select_contract(ops).await;
    test_complete_and_reopen_contract(ops).await;
    test_delete_contract(ops).await;
    test_append_contract(ops).await;
}

pub async fn test_add_contract<O: TaskOperations>(ops: &O) {
    let task = ops
        .add_task(AddTaskParams {
            title: "Contract test task".to_string(),
            category: "simple".to_string(),
            ..Default::default()
        })
        .await
        .expect("add_task should succeed with a valid category");

    assert_eq!(task.status, TaskStatus::Open, "new tasks start open");
    assert_eq!(task.title, "Contract test task");

    let rejected = ops
        .add_task(AddTaskParams {
            title: "".to_string(),
            category: "simple".to_string(),
            ..Default::default()
        })
        .await;
    assert!(rejected.is_err(), "add_task should reject a blank title");
}

pub async fn test_select_contract<O: TaskOperations>(ops: &O) {
    let task = ops
        .add_task(AddTaskParams {
            title: "Selectable task".to_string(),
            category: "simple".to_string(),
            ..Default::default()
        })
        .await
        .expect("add_task should succeed");

    let result = ops
        .select_tasks(SelectTasksParams { id: Some(task.id), ..Default::default() })
        .await
        .expect("select_tasks should succeed");
    assert_eq!(result.total_matches, 1, "selecting by id should return exactly one match");
    assert_eq!(result.tasks[0].id, task.id);
}

pub async fn test_complete_and_reopen_contract<O: TaskOperations>(ops: &O) {
    let task = ops
        .add_task(AddTaskParams {
            title: "Completable task".to_string(),
            category: "simple".to_string(),
            ..Default::default()
        })
        .await
        .expect("add_task should succeed");

    let completed = ops
        .complete_task(CompleteTaskParams { id: task.id, pr_num: None })
        .await
        .expect("complete_task should succeed");
    assert_eq!(completed.status, TaskStatus::Closed);

    let default_select = ops
        .select_tasks(SelectTasksParams { id: Some(task.id), ..Default::default() })
        .await
        .expect("select_tasks should succeed");
    assert_eq!(default_select.total_matches, 0, "closed tasks are excluded by default");

    let reopened = ops
        .reopen_task(ReopenTaskParams { id: task.id })
        .await
        .expect("reopen_task should succeed");
    assert_eq!(reopened.status, TaskStatus::Open);
}

pub async fn test_delete_contract<O: TaskOperations>(ops: &O) {
    let task = ops
        .add_task(AddTaskParams {
            title: "Deletable task".to_string(),
            category: "simple".to_string(),
            ..Default::default()
        })
        .await
        .expect("add_task should succeed");

    let deleted = ops.delete_task(DeleteTaskParams { id: task.id }).await.expect("delete_task should succeed");
    assert_eq!(deleted.status, TaskStatus::Deleted);

    let missing = ops.delete_task(DeleteTaskParams { id: task.id + 1_000_000 }).await;
    assert!(missing.is_err(), "delete_task should reject an unknown id");
}

pub async fn test_append_contract<O: TaskOperations>(ops: &O) {
    let task = ops
        .add_task(AddTaskParams {
            title: "Task with append-only logs".to_string(),
            category: "simple".to_string(),
            ..Default::default()
        })
        .await
        .expect("add_task should succeed");

    let updated = ops
        .append_shared_context(AppendSharedContextParams { id: task.id, entry: "first note".to_string() })
        .await
        .expect("append_shared_context should succeed");
    assert!(
        updated.shared_context.iter().any(|e| e.ends_with("first note")),
        "shared_context should contain the appended entry"
    );

    let updated = ops
        .append_session_event(AppendSessionEventParams {
            id: task.id,
            event: SessionEvent::SessionStart {
                timestamp: updated.session_events.first().map(|e| e.timestamp()).unwrap_or_else(chrono::Utc::now),
                session_id: "contract-test".to_string(),
            },
        })
        .await
        .expect("append_session_event should succeed");
    assert_eq!(updated.session_events.len(), 1, "session_events should record the appended event");

    let missing = ops
        .append_shared_context(AppendSharedContextParams { id: task.id + 1_000_000, entry: "orphan".to_string() })
        .await;
    assert!(missing.is_err(), "append_shared_context should reject an unknown id");
}
