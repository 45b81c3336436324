//! Realistic random test data, for exercising the codec and validator with
//! more variety than the hand-written fixtures.

use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::Fake;
use proptest::prelude::*;
use rand::Rng;
use task_core::{NewTask, TaskStatus, TaskType};

const CATEGORIES: &[&str] = &["simple", "standard", "complex", "research", "spike"];

pub fn generate_category() -> String {
    CATEGORIES[rand::thread_rng().gen_range(0..CATEGORIES.len())].to_string()
}

pub fn generate_title() -> String {
    Sentence(3..8).fake()
}

pub fn generate_description() -> String {
    Paragraph(1..4).fake()
}

pub fn generate_status() -> TaskStatus {
    match rand::thread_rng().gen_range(0..5) {
        0 => TaskStatus::Open,
        1 => TaskStatus::InProgress,
        2 => TaskStatus::Blocked,
        3 => TaskStatus::Closed,
        _ => TaskStatus::Deleted,
    }
}

pub fn generate_new_task() -> NewTask {
    NewTask {
        title: generate_title(),
        description: generate_description(),
        design: String::new(),
        category: generate_category(),
        task_type: Some(TaskType::Task),
        ..Default::default()
    }
}

/// A `proptest` strategy producing syntactically valid titles within the
/// validator's length bound, for property tests over `TaskValidator`.
pub fn arb_title() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 ]{1,200}".prop_filter("must not be blank", |s| !s.trim().is_empty())
}

pub fn arb_category() -> impl Strategy<Value = String> {
    prop::sample::select(CATEGORIES).prop_map(str::to_string)
}
