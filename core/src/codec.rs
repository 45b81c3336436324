//! Line-delimited record codec (C2).
//!
//! Each line of `tasks.ednl` / `complete.ednl` is one self-contained
//! `serde_json` object; blank and whitespace-only lines are skipped on
//! read. Encoding always emits fields in the struct's declaration order so
//! diffs stay small when a single task changes.

use crate::error::{Result, TaskError};
use crate::models::Task;

/// Encode a single task as one line (no trailing newline).
pub fn encode_task(task: &Task) -> Result<String> {
    serde_json::to_string(task)
        .map_err(|e| TaskError::internal("encode_task", format!("serialization failed: {e}")))
}

/// Decode a single non-blank line into a task.
pub fn decode_task(line: &str) -> Result<Task> {
    serde_json::from_str(line)
        .map_err(|e| TaskError::internal("decode_task", format!("malformed record: {e}")))
}

/// Parse a whole file's contents into the tasks it contains, skipping blank
/// lines. Preserves line order, which is insertion order for the active
/// stream and completion order for the archive stream.
pub fn decode_stream(contents: &str) -> Result<Vec<Task>> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(decode_task)
        .collect()
}

/// Render a full stream back to file contents, one record per line,
/// terminated by a trailing newline so appends are a pure byte-append.
pub fn encode_stream(tasks: &[Task]) -> Result<String> {
    let mut out = String::new();
    for task in tasks {
        out.push_str(&encode_task(task)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskStatus, TaskType};
    use std::collections::HashMap;

    fn sample(id: u64) -> Task {
        Task {
            id,
            parent_id: None,
            status: TaskStatus::Open,
            title: "Do the thing".to_string(),
            description: String::new(),
            design: String::new(),
            category: "simple".to_string(),
            task_type: TaskType::Task,
            meta: HashMap::new(),
            relations: vec![],
            shared_context: vec![],
            session_events: vec![],
            code_reviewed: None,
            pr_num: None,
        }
    }

    #[test]
    fn round_trips_a_task() {
        let task = sample(7);
        let line = encode_task(&task).unwrap();
        assert_eq!(decode_task(&line).unwrap(), task);
    }

    #[test]
    fn skips_blank_lines_in_a_stream() {
        let a = sample(1);
        let b = sample(2);
        let contents = format!(
            "{}\n\n   \n{}\n",
            encode_task(&a).unwrap(),
            encode_task(&b).unwrap()
        );
        let tasks = decode_stream(&contents).unwrap();
        assert_eq!(tasks, vec![a, b]);
    }

    #[test]
    fn encode_stream_is_append_friendly() {
        let a = sample(1);
        let first_pass = encode_stream(&[a.clone()]).unwrap();
        let b = sample(2);
        let appended = format!("{first_pass}{}\n", encode_task(&b).unwrap());
        let full = encode_stream(&[a, b]).unwrap();
        assert_eq!(appended, full);
    }
}
