//! Config resolution (C1): locate `.mcp-tasks.edn` up the directory tree,
//! parse its flat keyword-map grammar, and resolve absolute paths for the
//! base directory, the main repository, and the tasks directory.

use crate::error::{Result, TaskError};
use std::fs;
use std::path::{Path, PathBuf};

mod parser;

pub use parser::{ConfigValue, ParsedConfig};

const CONFIG_FILE_NAME: &str = ".mcp-tasks.edn";
const DEFAULT_TASKS_DIR: &str = ".mcp-tasks";
const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_LOCK_POLL_INTERVAL_MS: u64 = 100;
const DEFAULT_BRANCH_TITLE_WORDS: u32 = 4;

/// Maximum title words used in derived branch/worktree names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchTitleWords {
    Limited(u32),
    Unlimited,
}

impl Default for BranchTitleWords {
    fn default() -> Self {
        Self::Limited(DEFAULT_BRANCH_TITLE_WORDS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorktreePrefix {
    ProjectName,
    None,
}

impl Default for WorktreePrefix {
    fn default() -> Self {
        Self::ProjectName
    }
}

/// Settled configuration: raw options plus resolved absolute paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub use_git: bool,
    pub branch_management: bool,
    pub worktree_management: bool,
    pub worktree_prefix: WorktreePrefix,
    pub base_branch: Option<String>,
    pub branch_title_words: BranchTitleWords,
    pub lock_timeout_ms: u64,
    pub lock_poll_interval_ms: u64,
    pub enable_git_sync: bool,

    pub base_dir: PathBuf,
    pub main_repo_dir: PathBuf,
    pub resolved_tasks_dir: PathBuf,
}

impl ResolvedConfig {
    pub fn tasks_file(&self) -> PathBuf {
        self.resolved_tasks_dir.join("tasks.ednl")
    }

    pub fn complete_file(&self) -> PathBuf {
        self.resolved_tasks_dir.join("complete.ednl")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.resolved_tasks_dir.join(".mcp-tasks.lock")
    }
}

/// Walk from `start_dir` up through its canonicalized ancestors looking for
/// `.mcp-tasks.edn`. Returns the parsed config and the directory it lives
/// in, or `None` if no config file exists anywhere above `start_dir`.
fn find_config(start_dir: &Path) -> Result<Option<(ParsedConfig, PathBuf)>> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            let contents = fs::read_to_string(&candidate).map_err(|e| {
                TaskError::validation(
                    "resolve_config",
                    format!("failed to read {}: {e}", candidate.display()),
                )
            })?;
            let parsed = parser::parse(&contents).map_err(|e| {
                TaskError::validation(
                    "resolve_config",
                    format!("malformed config at {}: {e}", candidate.display()),
                )
            })?;
            return Ok(Some((parsed, dir)));
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => return Ok(None),
        }
    }
}

/// Does `dir` look like the root of a main git repository (`.git` is a
/// directory, not a pointer file)?
fn is_main_repo_root(dir: &Path) -> bool {
    let git = dir.join(".git");
    git.is_dir()
}

/// Does `dir` look like a worktree checkout (`.git` is a pointer file)?
fn is_worktree_root(dir: &Path) -> bool {
    let git = dir.join(".git");
    git.is_file()
}

/// Extract the main repository root from a worktree's `.git` pointer file,
/// which contains a single line `gitdir: /path/to/main/.git/worktrees/name`.
fn main_repo_from_worktree_pointer(dir: &Path) -> Result<PathBuf> {
    let pointer = dir.join(".git");
    let contents = fs::read_to_string(&pointer).map_err(|e| {
        TaskError::validation(
            "resolve_config",
            format!("failed to read worktree pointer {}: {e}", pointer.display()),
        )
    })?;
    let gitdir_line = contents
        .lines()
        .find_map(|l| l.strip_prefix("gitdir:"))
        .ok_or_else(|| {
            TaskError::validation(
                "resolve_config",
                format!("malformed worktree pointer: {}", pointer.display()),
            )
        })?;
    let gitdir = PathBuf::from(gitdir_line.trim());
    // gitdir looks like <main-repo>/.git/worktrees/<name>; walk up two levels
    // from there, past "worktrees/<name>" and ".git".
    let main_git = gitdir
        .parent()
        .and_then(Path::parent)
        .ok_or_else(|| {
            TaskError::validation(
                "resolve_config",
                format!("malformed worktree gitdir: {}", gitdir.display()),
            )
        })?;
    let main_repo = main_git.parent().ok_or_else(|| {
        TaskError::validation(
            "resolve_config",
            format!("malformed worktree gitdir: {}", gitdir.display()),
        )
    })?;
    if !main_repo.exists() || !main_repo.join(".git").is_dir() {
        return Err(TaskError::validation(
            "resolve_config",
            format!("worktree points at non-existent main repo: {}", main_repo.display()),
        ));
    }
    Ok(main_repo.to_path_buf())
}

/// Search `dir`'s immediate children for a `*-main` or `bare` directory
/// containing `.git`.
fn find_main_repo_sibling(dir: &Path) -> Result<Option<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Ok(None),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if (name.ends_with("-main") || name == "bare") && path.join(".git").is_dir() {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Resolve the main repository root from a starting directory (spec.md
/// §4.1 "Main-repo resolution").
fn resolve_main_repo_dir(start_dir: &Path) -> Result<PathBuf> {
    if is_worktree_root(start_dir) {
        return main_repo_from_worktree_pointer(start_dir);
    }
    if is_main_repo_root(start_dir) {
        return Ok(start_dir.to_path_buf());
    }
    if let Some(sibling) = find_main_repo_sibling(start_dir)? {
        return Ok(sibling);
    }
    Ok(start_dir.to_path_buf())
}

/// Resolve a complete configuration starting from `start_dir` (the process
/// working directory in practice).
pub fn resolve(start_dir: &Path) -> Result<ResolvedConfig> {
    let base_dir = fs::canonicalize(start_dir).map_err(|e| {
        TaskError::validation(
            "resolve_config",
            format!("start directory does not exist: {} ({e})", start_dir.display()),
        )
    })?;

    let found = find_config(&base_dir)?;
    let (parsed, config_dir) = match found {
        Some((parsed, dir)) => (parsed, dir),
        None => (ParsedConfig::default(), base_dir.clone()),
    };

    let main_repo_dir = resolve_main_repo_dir(&base_dir)?;

    let resolved_tasks_dir = match parsed.get_string("tasks-dir") {
        Some(raw) => {
            let candidate = PathBuf::from(raw);
            let candidate = if candidate.is_absolute() {
                candidate
            } else {
                config_dir.join(candidate)
            };
            if !candidate.exists() {
                return Err(TaskError::validation(
                    "resolve_config",
                    format!("configured tasks-dir does not exist: {}", candidate.display()),
                ));
            }
            candidate
        }
        None => config_dir.join(DEFAULT_TASKS_DIR),
    };

    let use_git = match parsed.get_bool("use-git?") {
        Some(v) => v,
        None => resolved_tasks_dir.join(".git").exists(),
    };

    if use_git && !resolved_tasks_dir.join(".git").exists() {
        return Err(TaskError::validation(
            "resolve_config",
            format!(
                "use-git? is enabled but {} has no .git",
                resolved_tasks_dir.display()
            ),
        ));
    }

    let worktree_management = parsed.get_bool("worktree-management?").unwrap_or(false);
    // worktree-management? implies branch-management? (spec.md §4.1).
    let branch_management =
        worktree_management || parsed.get_bool("branch-management?").unwrap_or(false);

    let worktree_prefix = match parsed.get_string("worktree-prefix") {
        Some("none") => WorktreePrefix::None,
        Some("project-name") | None => WorktreePrefix::ProjectName,
        Some(other) => {
            return Err(TaskError::validation(
                "resolve_config",
                format!("unknown worktree-prefix value: {other}"),
            ))
        }
    };

    let branch_title_words = match parsed.get("branch-title-words") {
        None => BranchTitleWords::default(),
        Some(ConfigValue::Nil) => BranchTitleWords::Unlimited,
        Some(ConfigValue::Int(n)) if *n > 0 => BranchTitleWords::Limited(*n as u32),
        Some(_) => {
            return Err(TaskError::validation(
                "resolve_config",
                "branch-title-words must be a positive integer or nil".to_string(),
            ))
        }
    };

    let lock_timeout_ms = parsed
        .get_int("lock-timeout-ms")
        .map(|n| n as u64)
        .unwrap_or(DEFAULT_LOCK_TIMEOUT_MS);
    let lock_poll_interval_ms = parsed
        .get_int("lock-poll-interval-ms")
        .map(|n| n as u64)
        .unwrap_or(DEFAULT_LOCK_POLL_INTERVAL_MS);

    // Open question (SPEC_FULL.md §E.1): when use-git? is true but
    // enable-git-sync? is explicitly false, commits still run and pulls are
    // skipped.
    let enable_git_sync = parsed.get_bool("enable-git-sync?").unwrap_or(use_git);

    Ok(ResolvedConfig {
        use_git,
        branch_management,
        worktree_management,
        worktree_prefix,
        base_branch: parsed.get_string("base-branch").map(str::to_string),
        branch_title_words,
        lock_timeout_ms,
        lock_poll_interval_ms,
        enable_git_sync,
        base_dir,
        main_repo_dir,
        resolved_tasks_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_when_no_config_file_exists() {
        let dir = tempdir().unwrap();
        let resolved = resolve(dir.path()).unwrap();
        assert!(!resolved.use_git);
        assert_eq!(resolved.branch_title_words, BranchTitleWords::Limited(4));
        assert_eq!(resolved.lock_timeout_ms, DEFAULT_LOCK_TIMEOUT_MS);
        assert_eq!(
            resolved.resolved_tasks_dir,
            resolved.base_dir.join(DEFAULT_TASKS_DIR)
        );
    }

    #[test]
    fn finds_config_file_in_an_ancestor() {
        let root = tempdir().unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            r#"{:use-git? false :lock-timeout-ms 5000}"#,
        )
        .unwrap();
        let child = root.path().join("a/b/c");
        fs::create_dir_all(&child).unwrap();

        let resolved = resolve(&child).unwrap();
        assert!(!resolved.use_git);
        assert_eq!(resolved.lock_timeout_ms, 5000);
    }

    #[test]
    fn rejects_a_nonexistent_explicit_tasks_dir() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{:tasks-dir "./nope"}"#,
        )
        .unwrap();
        assert!(resolve(dir.path()).is_err());
    }

    #[test]
    fn unlimited_branch_title_words_via_nil() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{:branch-title-words nil}"#,
        )
        .unwrap();
        let resolved = resolve(dir.path()).unwrap();
        assert_eq!(resolved.branch_title_words, BranchTitleWords::Unlimited);
    }
}
