//! In-memory task repository engine (C4): the active/complete indexes, id
//! allocation, blocking-status traversal, and query semantics. Persistence
//! (loading/saving the two EDNL streams under a cross-process lock) lives in
//! `tasks-store`; this module is pure in-memory logic so it is trivial to
//! unit test without touching the filesystem.

use crate::error::{Result, TaskError};
use crate::models::{
    BlockedStatus, NewTask, QueryResult, Relation, RelationType, SessionEvent, StatusFilter, Task,
    TaskFilter, TaskStatus, TaskType, UpdateTask,
};
use crate::validation::TaskValidator;
use std::collections::{HashMap, HashSet};

/// Holds every task currently known to the process: the active stream
/// (`tasks.ednl`) and the archive stream (`complete.ednl`), each indexed by
/// id for O(1) lookup while preserving the on-disk insertion order.
#[derive(Debug, Clone, Default)]
pub struct TaskRepository {
    active: Vec<Task>,
    complete: Vec<Task>,
    active_index: HashMap<u64, usize>,
    complete_index: HashMap<u64, usize>,
    next_relation_id: u64,
}

impl TaskRepository {
    /// Build a repository from the two streams as loaded from disk. Rejects
    /// an id appearing in both streams (SPEC_FULL.md §E.2).
    pub fn from_streams(active: Vec<Task>, complete: Vec<Task>) -> Result<Self> {
        let mut active_index = HashMap::with_capacity(active.len());
        for (i, task) in active.iter().enumerate() {
            if active_index.insert(task.id, i).is_some() {
                return Err(TaskError::state(
                    "load",
                    format!("duplicate id {} within tasks.ednl", task.id),
                ));
            }
        }
        let mut complete_index = HashMap::with_capacity(complete.len());
        for (i, task) in complete.iter().enumerate() {
            if complete_index.insert(task.id, i).is_some() {
                return Err(TaskError::state(
                    "load",
                    format!("duplicate id {} within complete.ednl", task.id),
                ));
            }
            if active_index.contains_key(&task.id) {
                return Err(TaskError::state(
                    "load",
                    format!("duplicate id {} across tasks.ednl and complete.ednl", task.id),
                ));
            }
        }

        let next_relation_id = active
            .iter()
            .chain(complete.iter())
            .flat_map(|t| t.relations.iter())
            .map(|r| r.id)
            .max()
            .map(|n| n + 1)
            .unwrap_or(1);

        Ok(Self {
            active,
            complete,
            active_index,
            complete_index,
            next_relation_id,
        })
    }

    pub fn active_tasks(&self) -> &[Task] {
        &self.active
    }

    pub fn complete_tasks(&self) -> &[Task] {
        &self.complete
    }

    fn next_id(&self) -> u64 {
        self.active
            .iter()
            .chain(self.complete.iter())
            .map(|t| t.id)
            .max()
            .map(|n| n + 1)
            .unwrap_or(1)
    }

    fn allocate_relation_id(&mut self) -> u64 {
        let id = self.next_relation_id;
        self.next_relation_id += 1;
        id
    }

    /// Set an active task's status directly, bypassing [`Self::update`]'s
    /// partial-field semantics. Used for the `in-progress` transition that
    /// `work-on` applies, which isn't expressed as an `UpdateTask`.
    pub fn set_status(&mut self, id: u64, status: TaskStatus) -> Result<Task> {
        let &idx = self
            .active_index
            .get(&id)
            .ok_or_else(|| TaskError::not_found_id("set_status", id))?;
        self.active[idx].status = status;
        Ok(self.active[idx].clone())
    }

    pub fn get(&self, id: u64) -> Result<&Task> {
        if let Some(&idx) = self.active_index.get(&id) {
            return Ok(&self.active[idx]);
        }
        if let Some(&idx) = self.complete_index.get(&id) {
            return Ok(&self.complete[idx]);
        }
        Err(TaskError::not_found_id("get", id))
    }

    /// Create a new active task. `prepend` controls whether it is inserted
    /// at the front or appended to the end of the active stream (spec.md §3
    /// `add`'s position option).
    pub fn add(&mut self, new: NewTask) -> Result<Task> {
        let id = self.next_id();
        let mut relations = new.relations;
        for relation in relations.iter_mut().filter(|r| r.id == 0) {
            relation.id = self.allocate_relation_id();
        }

        let task = Task {
            id,
            parent_id: new.parent_id,
            status: TaskStatus::Open,
            title: new.title,
            description: new.description,
            design: new.design,
            category: new.category,
            task_type: new.task_type.unwrap_or(TaskType::Task),
            meta: new.meta,
            relations,
            shared_context: Vec::new(),
            session_events: Vec::new(),
            code_reviewed: None,
            pr_num: None,
        };

        if new.prepend {
            self.active.insert(0, task.clone());
            self.reindex_active();
        } else {
            self.active_index.insert(task.id, self.active.len());
            self.active.push(task.clone());
        }

        Ok(task)
    }

    fn reindex_active(&mut self) {
        self.active_index = self
            .active
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();
    }

    fn reindex_complete(&mut self) {
        self.complete_index = self
            .complete
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();
    }

    /// Apply a partial update to an active task. List-valued fields are
    /// overwritten wholesale, never merged (spec.md §3).
    pub fn update(&mut self, id: u64, update: UpdateTask) -> Result<Task> {
        let &idx = self
            .active_index
            .get(&id)
            .ok_or_else(|| TaskError::not_found_id("update", id))?;

        if let Some(title) = update.title {
            self.active[idx].title = title;
        }
        if let Some(description) = update.description {
            self.active[idx].description = description;
        }
        if let Some(design) = update.design {
            self.active[idx].design = design;
        }
        if let Some(category) = update.category {
            self.active[idx].category = category;
        }
        if let Some(task_type) = update.task_type {
            self.active[idx].task_type = task_type;
        }
        if let Some(meta) = update.meta {
            self.active[idx].meta = meta;
        }
        if let Some(mut relations) = update.relations {
            for relation in relations.iter_mut().filter(|r| r.id == 0) {
                relation.id = self.allocate_relation_id();
            }
            self.active[idx].relations = relations;
        }
        if let Some(code_reviewed) = update.code_reviewed {
            self.active[idx].code_reviewed = Some(code_reviewed);
        }
        if let Some(pr_num) = update.pr_num {
            self.active[idx].pr_num = Some(pr_num);
        }

        Ok(self.active[idx].clone())
    }

    /// Appends one entry to `shared_context` (I5/P5: rejects the append if
    /// the list's total serialized size would cross
    /// [`crate::models::APPEND_LOG_MAX_BYTES`] rather than truncating).
    /// `entry` is expected to already carry the `"Task N: "` prefix (I6)
    /// when one applies; prefixing depends on execution state, which this
    /// purely in-memory repository has no access to.
    pub fn append_shared_context(&mut self, id: u64, entry: String) -> Result<Task> {
        let &idx = self
            .active_index
            .get(&id)
            .ok_or_else(|| TaskError::not_found_id("append_shared_context", id))?;
        let mut shared_context = self.active[idx].shared_context.clone();
        shared_context.push(entry);
        let serialized_len = serde_json::to_vec(&shared_context)
            .map(|bytes| bytes.len())
            .unwrap_or(usize::MAX);
        TaskValidator::validate_append_log_size("shared_context", serialized_len)?;
        self.active[idx].shared_context = shared_context;
        Ok(self.active[idx].clone())
    }

    /// Appends one entry to `session_events` under the same size ceiling as
    /// `append_shared_context`.
    pub fn append_session_event(&mut self, id: u64, event: SessionEvent) -> Result<Task> {
        let &idx = self
            .active_index
            .get(&id)
            .ok_or_else(|| TaskError::not_found_id("append_session_event", id))?;
        let mut session_events = self.active[idx].session_events.clone();
        session_events.push(event);
        let serialized_len = serde_json::to_vec(&session_events)
            .map(|bytes| bytes.len())
            .unwrap_or(usize::MAX);
        TaskValidator::validate_append_log_size("session_events", serialized_len)?;
        self.active[idx].session_events = session_events;
        Ok(self.active[idx].clone())
    }

    /// Move a task from the active stream to the archive, assigning the
    /// given terminal status (`Closed` for `complete`, `Deleted` for
    /// `delete`).
    fn archive(&mut self, id: u64, status: TaskStatus, op: &str) -> Result<Task> {
        let &idx = self
            .active_index
            .get(&id)
            .ok_or_else(|| TaskError::not_found_id(op, id))?;
        let mut task = self.active.remove(idx);
        task.status = status;
        self.reindex_active();

        self.complete_index.insert(task.id, self.complete.len());
        self.complete.push(task.clone());
        Ok(task)
    }

    pub fn complete(&mut self, id: u64) -> Result<Task> {
        self.archive(id, TaskStatus::Closed, "complete")
    }

    pub fn delete(&mut self, id: u64) -> Result<Task> {
        self.archive(id, TaskStatus::Deleted, "delete")
    }

    /// Move a task back from the archive to the active stream as `Open`.
    pub fn reopen(&mut self, id: u64) -> Result<Task> {
        let &idx = self
            .complete_index
            .get(&id)
            .ok_or_else(|| TaskError::not_found_id("reopen", id))?;
        let mut task = self.complete.remove(idx);
        self.reindex_complete();

        task.status = TaskStatus::Open;
        self.active_index.insert(task.id, self.active.len());
        self.active.push(task.clone());
        Ok(task)
    }

    pub fn children_of(&self, parent_id: u64) -> Vec<&Task> {
        self.active
            .iter()
            .chain(self.complete.iter())
            .filter(|t| t.parent_id == Some(parent_id))
            .collect()
    }

    /// Walk a task's `blocked-by` relations depth-first, reporting whichever
    /// of the outcomes spec.md §4.4 names applies: blocked by an incomplete
    /// task, caught in a cycle, or referencing a missing task. A closed or
    /// deleted blocker no longer blocks.
    pub fn is_blocked(&self, id: u64) -> Result<BlockedStatus> {
        let mut status = BlockedStatus::default();
        let mut visiting = Vec::new();
        let mut seen = HashSet::new();
        self.walk_blockers(id, &mut visiting, &mut seen, &mut status);
        status.blocked = !status.blocking_ids.is_empty() || status.circular_dependency.is_some();
        Ok(status)
    }

    fn walk_blockers(
        &self,
        id: u64,
        visiting: &mut Vec<u64>,
        seen: &mut HashSet<u64>,
        status: &mut BlockedStatus,
    ) {
        if let Some(pos) = visiting.iter().position(|&v| v == id) {
            let mut cycle = visiting[pos..].to_vec();
            cycle.push(id);
            status.circular_dependency = Some(cycle);
            return;
        }
        if !seen.insert(id) {
            return;
        }

        visiting.push(id);
        let blockers: Vec<u64> = match self.get(id) {
            Ok(task) => task
                .relations
                .iter()
                .filter(|r| r.as_type == RelationType::BlockedBy)
                .map(|r| r.relates_to)
                .collect(),
            Err(_) => {
                visiting.pop();
                status.missing_ids.push(id);
                return;
            }
        };

        for blocker_id in blockers {
            match self.get(blocker_id) {
                Ok(blocker) if blocker.status.is_blocking() => {
                    status.blocking_ids.push(blocker_id);
                    self.walk_blockers(blocker_id, visiting, seen, status);
                }
                Ok(_) => {}
                Err(_) => status.missing_ids.push(blocker_id),
            }
            if status.circular_dependency.is_some() {
                break;
            }
        }

        visiting.pop();
    }

    /// Run a [`TaskFilter`] against the active stream, or the combined
    /// streams when the filter's status allows archived tasks through.
    pub fn query(&self, filter: &TaskFilter) -> Result<QueryResult> {
        let candidates: Vec<&Task> = match filter.status {
            Some(StatusFilter::Any) => self.active.iter().chain(self.complete.iter()).collect(),
            Some(StatusFilter::Exact(s)) if s.is_archived() => self.complete.iter().collect(),
            _ => self.active.iter().collect(),
        };

        let title_matcher = filter
            .title_pattern
            .as_deref()
            .map(build_title_matcher)
            .transpose()?;

        let matches: Vec<Task> = candidates
            .into_iter()
            .filter(|t| filter.id.map_or(true, |id| t.id == id))
            .filter(|t| filter.category.as_deref().map_or(true, |c| t.category == c))
            .filter(|t| filter.parent_id.map_or(true, |p| t.parent_id == Some(p)))
            .filter(|t| filter.task_type.map_or(true, |ty| t.task_type == ty))
            .filter(|t| match &filter.status {
                None | Some(StatusFilter::NonArchived) => !t.status.is_archived(),
                Some(StatusFilter::Exact(s)) => t.status == *s,
                Some(StatusFilter::Any) => true,
            })
            .filter(|t| title_matcher.as_ref().map_or(true, |m| m.is_match(&t.title)))
            .cloned()
            .collect();

        let completed_child_count = filter.parent_id.map(|parent_id| {
            self.complete
                .iter()
                .filter(|t| t.parent_id == Some(parent_id))
                .count()
        });

        Ok(QueryResult {
            total_matches: matches.len(),
            tasks: matches,
            completed_child_count,
        })
    }
}

enum TitleMatcher {
    Regex(regex::Regex),
    Substring(String),
}

impl TitleMatcher {
    fn is_match(&self, title: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(title),
            Self::Substring(needle) => title.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// `title_pattern` is tried as a regex first; on parse failure it falls back
/// to a case-insensitive substring match (SPEC_FULL.md §E.3).
fn build_title_matcher(pattern: &str) -> Result<TitleMatcher> {
    match regex::Regex::new(pattern) {
        Ok(re) => Ok(TitleMatcher::Regex(re)),
        Err(_) => Ok(TitleMatcher::Substring(pattern.to_lowercase())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            category: "simple".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn add_allocates_sequential_ids() {
        let mut repo = TaskRepository::default();
        let a = repo.add(new_task("first")).unwrap();
        let b = repo.add(new_task("second")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[test]
    fn prepend_inserts_at_the_front() {
        let mut repo = TaskRepository::default();
        repo.add(new_task("first")).unwrap();
        let mut second = new_task("second");
        second.prepend = true;
        repo.add(second).unwrap();
        assert_eq!(repo.active_tasks()[0].title, "second");
    }

    #[test]
    fn append_shared_context_preserves_existing_entries() {
        let mut repo = TaskRepository::default();
        let task = repo.add(new_task("first")).unwrap();
        repo.append_shared_context(task.id, "first note".to_string()).unwrap();
        let updated = repo.append_shared_context(task.id, "second note".to_string()).unwrap();
        assert_eq!(updated.shared_context, vec!["first note", "second note"]);
    }

    #[test]
    fn append_shared_context_rejects_crossing_the_byte_ceiling() {
        let mut repo = TaskRepository::default();
        let task = repo.add(new_task("first")).unwrap();
        let oversized = "x".repeat(crate::models::APPEND_LOG_MAX_BYTES + 1);
        let result = repo.append_shared_context(task.id, oversized);
        assert!(result.is_err());
        assert!(repo.get(task.id).unwrap().shared_context.is_empty());
    }

    #[test]
    fn append_shared_context_rejects_an_unknown_id() {
        let mut repo = TaskRepository::default();
        assert!(repo.append_shared_context(999, "note".to_string()).is_err());
    }

    #[test]
    fn append_session_event_preserves_existing_entries() {
        let mut repo = TaskRepository::default();
        let task = repo.add(new_task("first")).unwrap();
        let timestamp = chrono::Utc::now();
        repo.append_session_event(
            task.id,
            crate::models::SessionEvent::SessionStart { timestamp, session_id: "s1".to_string() },
        )
        .unwrap();
        let updated = repo
            .append_session_event(
                task.id,
                crate::models::SessionEvent::UserPrompt { timestamp, content: "hi".to_string() },
            )
            .unwrap();
        assert_eq!(updated.session_events.len(), 2);
    }

    #[test]
    fn complete_moves_a_task_to_the_archive() {
        let mut repo = TaskRepository::default();
        let task = repo.add(new_task("first")).unwrap();
        let completed = repo.complete(task.id).unwrap();
        assert_eq!(completed.status, TaskStatus::Closed);
        assert!(repo.get(task.id).is_ok());
        assert!(repo.active_tasks().is_empty());
    }

    #[test]
    fn reopen_moves_a_task_back_to_active_as_open() {
        let mut repo = TaskRepository::default();
        let task = repo.add(new_task("first")).unwrap();
        repo.complete(task.id).unwrap();
        let reopened = repo.reopen(task.id).unwrap();
        assert_eq!(reopened.status, TaskStatus::Open);
        assert_eq!(repo.active_tasks().len(), 1);
        assert!(repo.complete_tasks().is_empty());
    }

    #[test]
    fn is_blocked_follows_blocked_by_relations() {
        let mut repo = TaskRepository::default();
        let blocker = repo.add(new_task("blocker")).unwrap();
        let mut dependent = new_task("dependent");
        dependent.relations.push(Relation {
            id: 0,
            relates_to: blocker.id,
            as_type: RelationType::BlockedBy,
        });
        let dependent = repo.add(dependent).unwrap();

        let status = repo.is_blocked(dependent.id).unwrap();
        assert!(status.blocked);
        assert_eq!(status.blocking_ids, vec![blocker.id]);

        repo.complete(blocker.id).unwrap();
        let status = repo.is_blocked(dependent.id).unwrap();
        assert!(!status.blocked);
    }

    #[test]
    fn is_blocked_detects_a_cycle() {
        let mut repo = TaskRepository::default();
        let a = repo.add(new_task("a")).unwrap();
        let b = repo.add(new_task("b")).unwrap();
        repo.update(
            a.id,
            UpdateTask {
                relations: Some(vec![Relation {
                    id: 0,
                    relates_to: b.id,
                    as_type: RelationType::BlockedBy,
                }]),
                ..Default::default()
            },
        )
        .unwrap();
        repo.update(
            b.id,
            UpdateTask {
                relations: Some(vec![Relation {
                    id: 0,
                    relates_to: a.id,
                    as_type: RelationType::BlockedBy,
                }]),
                ..Default::default()
            },
        )
        .unwrap();

        let status = repo.is_blocked(a.id).unwrap();
        assert!(status.circular_dependency.is_some());
    }

    #[test]
    fn is_blocked_reports_a_missing_blocker() {
        let mut repo = TaskRepository::default();
        let mut dependent = new_task("dependent");
        dependent.relations.push(Relation {
            id: 0,
            relates_to: 999,
            as_type: RelationType::BlockedBy,
        });
        let dependent = repo.add(dependent).unwrap();
        let status = repo.is_blocked(dependent.id).unwrap();
        assert_eq!(status.missing_ids, vec![999]);
    }

    #[test]
    fn query_excludes_archived_tasks_by_default() {
        let mut repo = TaskRepository::default();
        let task = repo.add(new_task("first")).unwrap();
        repo.complete(task.id).unwrap();
        let result = repo.query(&TaskFilter::default()).unwrap();
        assert_eq!(result.total_matches, 0);
    }

    #[test]
    fn query_title_pattern_falls_back_to_substring_on_bad_regex() {
        let mut repo = TaskRepository::default();
        repo.add(new_task("Fix the (unbalanced thing")).unwrap();
        let filter = TaskFilter {
            title_pattern: Some("(unbalanced".to_string()),
            ..Default::default()
        };
        let result = repo.query(&filter).unwrap();
        assert_eq!(result.total_matches, 1);
    }

    #[test]
    fn from_streams_rejects_duplicate_ids_across_streams() {
        let active = vec![Task {
            id: 1,
            parent_id: None,
            status: TaskStatus::Open,
            title: "a".to_string(),
            description: String::new(),
            design: String::new(),
            category: "simple".to_string(),
            task_type: TaskType::Task,
            meta: Default::default(),
            relations: vec![],
            shared_context: vec![],
            session_events: vec![],
            code_reviewed: None,
            pr_num: None,
        }];
        let mut complete = active.clone();
        complete[0].status = TaskStatus::Closed;
        assert!(TaskRepository::from_streams(active, complete).is_err());
    }
}
