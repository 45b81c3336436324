//! Cross-process advisory locking over a single lock file, polled rather
//! than blocked on, so a timeout can surface as a structured error instead
//! of hanging the caller forever.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::thread::sleep;
use std::time::{Duration, Instant};
use task_core::error::{Result, TaskError};

pub struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Acquire an exclusive lock on `lock_path`, polling every
/// `poll_interval_ms` until `timeout_ms` elapses. The lock file is created
/// if it doesn't exist; its contents are never read or written, only used
/// as a lock target.
pub fn acquire(
    lock_path: &Path,
    timeout_ms: u64,
    poll_interval_ms: u64,
    op: &str,
) -> Result<LockGuard> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .open(lock_path)
        .map_err(|e| {
            TaskError::internal(op, format!("failed to open lock file {}: {e}", lock_path.display()))
        })?;

    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(poll_interval_ms.max(1));

    loop {
        match file.try_lock_exclusive() {
            Ok(()) => return Ok(LockGuard { file }),
            Err(_) if Instant::now() >= deadline => {
                return Err(TaskError::lock_timeout(op, timeout_ms));
            }
            Err(_) => sleep(poll_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn acquires_an_uncontended_lock() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".lock");
        let guard = acquire(&path, 1000, 10, "test").unwrap();
        drop(guard);
    }

    #[test]
    fn times_out_when_already_held() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".lock");
        let _held = acquire(&path, 1000, 10, "test").unwrap();
        let second = acquire(&path, 50, 10, "test");
        assert!(second.is_err());
    }
}
