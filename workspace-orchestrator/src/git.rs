//! Git adapter (C5): every git interaction goes through a child process, never
//! an embedded git library, and every call returns a structured outcome
//! instead of propagating a bare process exit code.

use std::path::Path;
use std::process::Command;
use task_core::error::{Result, TaskError};

#[derive(Debug, Clone)]
pub struct GitOutcome {
    pub ok: bool,
    pub stdout: String,
    pub stderr: String,
}

fn run(dir: &Path, args: &[&str]) -> Result<GitOutcome> {
    tracing::debug!(dir = %dir.display(), args = ?args, "running git");
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| TaskError::git(args.join(" "), format!("failed to spawn git: {e}")))?;

    Ok(GitOutcome {
        ok: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

fn require_ok(outcome: GitOutcome, op: &str) -> Result<GitOutcome> {
    if outcome.ok {
        Ok(outcome)
    } else {
        Err(TaskError::git(op, outcome.stderr))
    }
}

pub fn current_branch(repo_dir: &Path) -> Result<String> {
    let outcome = require_ok(
        run(repo_dir, &["rev-parse", "--abbrev-ref", "HEAD"])?,
        "current_branch",
    )?;
    Ok(outcome.stdout)
}

pub fn branch_exists(repo_dir: &Path, branch: &str) -> Result<bool> {
    let outcome = run(repo_dir, &["rev-parse", "--verify", "--quiet", &format!("refs/heads/{branch}")])?;
    Ok(outcome.ok)
}

pub fn create_branch(repo_dir: &Path, branch: &str, base: Option<&str>) -> Result<GitOutcome> {
    let mut args = vec!["branch", branch];
    if let Some(base) = base {
        args.push(base);
    }
    require_ok(run(repo_dir, &args)?, "create_branch")
}

pub fn delete_branch(repo_dir: &Path, branch: &str) -> Result<GitOutcome> {
    require_ok(run(repo_dir, &["branch", "-D", branch])?, "delete_branch")
}

pub fn add_worktree(main_repo_dir: &Path, worktree_path: &Path, branch: &str) -> Result<GitOutcome> {
    require_ok(
        run(
            main_repo_dir,
            &["worktree", "add", &worktree_path.to_string_lossy(), branch],
        )?,
        "add_worktree",
    )
}

pub fn remove_worktree(main_repo_dir: &Path, worktree_path: &Path) -> Result<GitOutcome> {
    require_ok(
        run(
            main_repo_dir,
            &["worktree", "remove", "--force", &worktree_path.to_string_lossy()],
        )?,
        "remove_worktree",
    )
}

/// `git add -A && git commit -m <message>`. Returns `ok: false` rather than
/// an error when there is nothing to commit (git's normal "nothing to
/// commit" exit), since that is an expected outcome, not a failure.
pub fn commit_all(repo_dir: &Path, message: &str) -> Result<GitOutcome> {
    require_ok(run(repo_dir, &["add", "-A"])?, "commit_all")?;
    let outcome = run(repo_dir, &["commit", "-m", message])?;
    if outcome.ok || outcome.stdout.contains("nothing to commit") {
        Ok(GitOutcome { ok: true, ..outcome })
    } else {
        Err(TaskError::git("commit_all", outcome.stderr))
    }
}

pub fn pull(repo_dir: &Path) -> Result<GitOutcome> {
    require_ok(run(repo_dir, &["pull", "--ff-only"])?, "pull")
}

/// Lowercase, hyphenate, and cap a title to `max_words` words for use in
/// branch/worktree names. `None` leaves the title unbounded.
pub fn slugify_title(title: &str, max_words: Option<u32>) -> String {
    let words: Vec<&str> = title.split_whitespace().collect();
    let limited = match max_words {
        Some(n) => &words[..words.len().min(n as usize)],
        None => &words[..],
    };
    let mut slug = String::new();
    for word in limited {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if cleaned.is_empty() {
            continue;
        }
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(&cleaned);
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_caps_word_count() {
        assert_eq!(slugify_title("Fix the flaky worker pool test", Some(3)), "fix-the-flaky");
        assert_eq!(slugify_title("Fix the flaky worker pool test", None), "fix-the-flaky-worker-pool-test");
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify_title("Add `foo()` support!", Some(4)), "add-foo-support");
    }
}
