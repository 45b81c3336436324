//! Fluent builders for constructing `Task`/`NewTask`/`UpdateTask`/`TaskFilter`
//! in tests without repeating every field.

use std::collections::HashMap;

use task_core::{NewTask, Relation, Task, TaskFilter, TaskStatus, TaskType, UpdateTask};

pub struct TaskBuilder {
    task: Task,
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            task: Task {
                id: 1,
                parent_id: None,
                status: TaskStatus::Open,
                title: "Test task".to_string(),
                description: String::new(),
                design: String::new(),
                category: "simple".to_string(),
                task_type: TaskType::Task,
                meta: HashMap::new(),
                relations: Vec::new(),
                shared_context: Vec::new(),
                session_events: Vec::new(),
                code_reviewed: None,
                pr_num: None,
            },
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.task.id = id;
        self
    }

    pub fn with_parent_id(mut self, parent_id: u64) -> Self {
        self.task.parent_id = Some(parent_id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.task.title = title.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.task.category = category.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn with_relations(mut self, relations: Vec<Relation>) -> Self {
        self.task.relations = relations;
        self
    }

    pub fn with_pr_num(mut self, pr_num: u64) -> Self {
        self.task.pr_num = Some(pr_num);
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

pub struct NewTaskBuilder {
    new_task: NewTask,
}

impl Default for NewTaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewTaskBuilder {
    pub fn new() -> Self {
        Self {
            new_task: NewTask {
                title: "New test task".to_string(),
                category: "simple".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.new_task.title = title.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.new_task.category = category.into();
        self
    }

    pub fn with_parent_id(mut self, parent_id: u64) -> Self {
        self.new_task.parent_id = Some(parent_id);
        self
    }

    pub fn with_relations(mut self, relations: Vec<Relation>) -> Self {
        self.new_task.relations = relations;
        self
    }

    pub fn prepend(mut self) -> Self {
        self.new_task.prepend = true;
        self
    }

    pub fn build(self) -> NewTask {
        self.new_task
    }
}

pub struct UpdateTaskBuilder {
    update: UpdateTask,
}

impl Default for UpdateTaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateTaskBuilder {
    pub fn new() -> Self {
        Self {
            update: UpdateTask::default(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.update.title = Some(title.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.update.category = Some(category.into());
        self
    }

    pub fn with_relations(mut self, relations: Vec<Relation>) -> Self {
        self.update.relations = Some(relations);
        self
    }

    pub fn with_pr_num(mut self, pr_num: u64) -> Self {
        self.update.pr_num = Some(pr_num);
        self
    }

    pub fn build(self) -> UpdateTask {
        self.update
    }
}

pub struct TaskFilterBuilder {
    filter: TaskFilter,
}

impl Default for TaskFilterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskFilterBuilder {
    pub fn new() -> Self {
        Self {
            filter: TaskFilter::default(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.filter.id = Some(id);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.filter.category = Some(category.into());
        self
    }

    pub fn with_parent_id(mut self, parent_id: u64) -> Self {
        self.filter.parent_id = Some(parent_id);
        self
    }

    pub fn with_title_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filter.title_pattern = Some(pattern.into());
        self
    }

    pub fn build(self) -> TaskFilter {
        self.filter
    }
}
