use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::{LogFormat, LoggingConfig};

/// Initialize the tracing subscriber. Stdio MCP transport owns stdout for the
/// JSON-RPC stream, so every format writes to stderr.
pub fn init_telemetry(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("invalid log level configuration")?;

    let registry = Registry::default().with(env_filter);

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true);

            registry.with(fmt_layer).init();
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_list(true)
                .flatten_event(true);

            registry.with(fmt_layer).init();
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false);

            registry.with(fmt_layer).init();
        }
    }

    tracing::info!(
        log_level = %config.level,
        log_format = ?config.format,
        "telemetry initialized"
    );

    Ok(())
}

/// Span for `tasks-store` file/lock operations.
#[macro_export]
macro_rules! store_span {
    ($operation:expr) => {
        tracing::info_span!("store_operation", operation = $operation)
    };
    ($operation:expr, $($key:expr => $value:expr),*) => {
        tracing::info_span!("store_operation", operation = $operation, $($key = $value),*)
    };
}

/// Span for `workspace-orchestrator` git operations.
#[macro_export]
macro_rules! git_span {
    ($operation:expr) => {
        tracing::info_span!("git_operation", operation = $operation)
    };
    ($operation:expr, $($key:expr => $value:expr),*) => {
        tracing::info_span!("git_operation", operation = $operation, $($key = $value),*)
    };
}

/// Span for MCP tool calls.
#[macro_export]
macro_rules! mcp_span {
    ($function:expr) => {
        tracing::info_span!("mcp_function", function = $function)
    };
    ($function:expr, $($key:expr => $value:expr),*) => {
        tracing::info_span!("mcp_function", function = $function, $($key = $value),*)
    };
}

pub fn log_startup_info(tasks_dir: &std::path::Path) {
    tracing::info!(tasks_dir = %tasks_dir.display(), "mcp-tasks server starting up");
}

pub fn log_shutdown_info() {
    tracing::info!("mcp-tasks server shutting down gracefully");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_logging_config_is_compact_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(matches!(config.format, LogFormat::Compact));
    }
}
