//! Structured per-tool-call logging. The stdio transport has no HTTP
//! middleware stack to hang this on, so each `#[tool]` method wraps its body
//! in [`log_call`] instead, keeping the single-line "name, duration, outcome"
//! shape the teacher's HTTP middleware used.

use std::time::Instant;

const MAX_PARAM_LENGTH: usize = 30;

/// Truncate `value`'s debug representation for logging, the way long
/// parameter values were elided in the teacher's request log line.
pub fn truncate(value: &str) -> String {
    if value.len() <= MAX_PARAM_LENGTH {
        value.to_string()
    } else {
        format!("{}...", &value[..MAX_PARAM_LENGTH])
    }
}

pub async fn log_call<T, E: std::fmt::Display>(
    name: &str,
    params: impl std::fmt::Debug,
    body: impl std::future::Future<Output = Result<T, E>>,
) -> Result<T, E> {
    let start = Instant::now();
    let result = body.await;
    let duration_ms = start.elapsed().as_millis();
    match &result {
        Ok(_) => tracing::info!(tool = name, params = ?params, duration_ms, "tool call succeeded"),
        Err(e) => tracing::warn!(tool = name, params = ?params, duration_ms, error = %e, "tool call failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_values() {
        let long = "x".repeat(50);
        assert_eq!(truncate(&long).len(), MAX_PARAM_LENGTH + 3);
        assert_eq!(truncate("short"), "short");
    }
}
