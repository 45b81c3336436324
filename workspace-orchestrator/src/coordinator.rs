//! Work-on / cleanup coordinator (C8): the per-task git workspace lifecycle
//! layered on top of the repository engine and the git adapter.

use std::path::PathBuf;

use chrono::Utc;
use task_core::config::{BranchTitleWords, ResolvedConfig, WorktreePrefix};
use task_core::error::Result;
use task_core::models::{Task, TaskStatus};
use tasks_store::FileStore;

use crate::git;

pub struct WorkOnOutcome {
    pub task: Task,
    pub branch: Option<String>,
    pub worktree_path: Option<String>,
}

fn max_words(config: &ResolvedConfig) -> Option<u32> {
    match config.branch_title_words {
        BranchTitleWords::Limited(n) => Some(n),
        BranchTitleWords::Unlimited => None,
    }
}

fn branch_name(task: &Task, config: &ResolvedConfig) -> String {
    let slug = git::slugify_title(&task.title, max_words(config));
    format!("task/{}-{slug}", task.id)
}

fn worktree_path(task: &Task, config: &ResolvedConfig) -> PathBuf {
    let slug = git::slugify_title(&task.title, max_words(config));
    let dir_name = match config.worktree_prefix {
        WorktreePrefix::ProjectName => {
            let project = config
                .main_repo_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "workspace".to_string());
            format!("{project}-{slug}")
        }
        WorktreePrefix::None => slug,
    };
    config
        .main_repo_dir
        .parent()
        .unwrap_or(&config.main_repo_dir)
        .join(dir_name)
}

/// Begin work on a task: move it to `in-progress`, optionally create a
/// branch and worktree, and record execution state for the current working
/// directory.
pub fn work_on(config: &ResolvedConfig, store: &FileStore, task_id: u64) -> Result<WorkOnOutcome> {
    let task = store.load()?.get(task_id)?.clone();

    let mut branch = None;
    let mut path = None;

    if config.use_git {
        if config.branch_management {
            let name = branch_name(&task, config);
            if !git::branch_exists(&config.main_repo_dir, &name)? {
                git::create_branch(&config.main_repo_dir, &name, config.base_branch.as_deref())?;
            }
            branch = Some(name);
        }

        if config.worktree_management {
            if let Some(name) = &branch {
                let wt_path = worktree_path(&task, config);
                if !wt_path.exists() {
                    git::add_worktree(&config.main_repo_dir, &wt_path, name)?;
                }
                path = Some(wt_path.to_string_lossy().to_string());
            }
        }
    }

    let working_dir = path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.base_dir.clone());
    tasks_store::save_execution_state(
        &working_dir,
        &task_core::models::ExecutionState {
            task_id: Some(task_id),
            story_id: task.parent_id,
            task_start_time: Utc::now(),
        },
    )?;

    let task = if task.status == TaskStatus::Open {
        store.with_transaction("work_on", |repo| repo.set_status(task_id, TaskStatus::InProgress))?
    } else {
        task
    };

    Ok(WorkOnOutcome {
        task,
        branch,
        worktree_path: path,
    })
}

/// Tear down the workspace for a task once work is done: commit outstanding
/// changes (if git sync is enabled), remove the worktree and branch, and
/// clear execution state. Does not change task status; pair with
/// `complete_task` or `reopen_task` for that.
pub fn cleanup(config: &ResolvedConfig, store: &FileStore, task_id: u64) -> Result<Task> {
    let task = store.load()?.get(task_id)?.clone();

    let name = branch_name(&task, config);
    let wt_path = worktree_path(&task, config);

    if config.use_git && config.worktree_management && wt_path.exists() {
        if config.enable_git_sync {
            git::commit_all(&wt_path, &format!("Complete task {}: {}", task.id, task.title))?;
        }
        git::remove_worktree(&config.main_repo_dir, &wt_path)?;
    }

    if config.use_git && config.branch_management && git::branch_exists(&config.main_repo_dir, &name)? {
        git::delete_branch(&config.main_repo_dir, &name)?;
    }

    tasks_store::clear_execution_state(&config.base_dir)?;
    if wt_path.exists() {
        tasks_store::clear_execution_state(&wt_path)?;
    }

    Ok(task)
}
