//! mcp-server: binds the task-core operation surface to an MCP stdio
//! transport. Process wiring, CLI parsing, and telemetry live here; the
//! actual tool router is `mcp-protocol` and the engine is
//! `workspace-orchestrator`.

pub mod config;
pub mod telemetry;

pub use config::LoggingConfig;
pub use telemetry::init_telemetry;
