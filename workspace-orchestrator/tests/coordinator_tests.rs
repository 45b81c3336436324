//! Exercises work-on/cleanup against a real git repository, since the git
//! adapter only talks to `git` as a subprocess and has nothing meaningful to
//! mock.

use std::path::Path;
use std::process::Command;

use task_core::config;
use task_core::models::{NewTask, TaskStatus};
use tasks_store::FileStore;
use tempfile::tempdir;
use workspace_orchestrator::{cleanup, work_on};

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .status()
        .expect("git must be on PATH for these tests");
    assert!(status.success(), "git {args:?} failed");
}

fn init_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "user.name", "Test"]);
    std::fs::write(dir.join("README.md"), "hello\n").unwrap();
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", "initial"]);
}

#[test]
fn work_on_creates_a_branch_and_worktree() {
    let root = tempdir().unwrap();
    let repo_dir = root.path().join("proj");
    std::fs::create_dir_all(&repo_dir).unwrap();
    init_repo(&repo_dir);

    std::fs::write(
        repo_dir.join(".mcp-tasks.edn"),
        r#"{:use-git? true :branch-management? true :worktree-management? true :tasks-dir "./.mcp-tasks"}"#,
    )
    .unwrap();
    let tasks_dir = repo_dir.join(".mcp-tasks");
    std::fs::create_dir_all(&tasks_dir).unwrap();
    init_repo(&tasks_dir);

    let resolved = config::resolve(&repo_dir).unwrap();
    let store = FileStore::new(&resolved).unwrap();
    let task = store
        .with_transaction("add", |repo| {
            repo.add(NewTask {
                title: "Add retry logic to the worker".to_string(),
                category: "simple".to_string(),
                ..Default::default()
            })
        })
        .unwrap();

    let outcome = work_on(&resolved, &store, task.id).unwrap();
    assert_eq!(outcome.task.status, TaskStatus::InProgress);
    assert!(outcome.branch.is_some());
    let worktree_path = outcome.worktree_path.expect("worktree path");
    assert!(Path::new(&worktree_path).exists());

    let cleaned = cleanup(&resolved, &store, task.id).unwrap();
    assert_eq!(cleaned.id, task.id);
    assert!(!Path::new(&worktree_path).exists());
}
