//! Drives the built `mcp-tasks` binary over its stdio MCP transport with the
//! official `rmcp` client SDK, the way the teacher's rmcp-based integration
//! tests drove the HTTP server.

use std::time::Duration;

use anyhow::{Context, Result};
use rmcp::model::CallToolRequestParam;
use rmcp::service::ServiceExt;
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use serde_json::{json, Value};
use tempfile::tempdir;
use tokio::process::Command;
use tokio::time::timeout;

fn tool_text(result: &rmcp::model::CallToolResult) -> Result<&str> {
    match result.content.first().map(|c| &c.raw) {
        Some(rmcp::model::RawContent::Text(text)) => Ok(&text.text),
        _ => anyhow::bail!("expected text content in tool response"),
    }
}

#[tokio::test]
async fn stdio_server_serves_the_operation_surface_as_mcp_tools() -> Result<()> {
    let dir = tempdir().unwrap();

    let mut command = Command::new(assert_cmd::cargo::cargo_bin("mcp-tasks"));
    command.arg("--dir").arg(dir.path());
    let transport = TokioChildProcess::new(command.configure(|_| {}))
        .context("failed to spawn mcp-tasks as a child process")?;

    let service = timeout(Duration::from_secs(10), ().serve(transport))
        .await
        .context("timed out connecting to mcp-tasks")?
        .context("failed to start rmcp client service")?;

    let add_result = timeout(
        Duration::from_secs(10),
        service.peer().call_tool(CallToolRequestParam {
            name: "add_task".into(),
            arguments: Some(
                json!({"title": "Investigate flaky CI", "category": "simple"})
                    .as_object()
                    .unwrap()
                    .clone(),
            ),
        }),
    )
    .await
    .context("timed out waiting for add_task")??;

    let task: Value = serde_json::from_str(tool_text(&add_result)?)?;
    let task_id = task["id"].as_u64().context("task id missing from add_task response")?;
    assert_eq!(task["status"], "open");

    let select_result = timeout(
        Duration::from_secs(10),
        service.peer().call_tool(CallToolRequestParam {
            name: "select_tasks".into(),
            arguments: Some(json!({"id": task_id}).as_object().unwrap().clone()),
        }),
    )
    .await
    .context("timed out waiting for select_tasks")??;

    let query: Value = serde_json::from_str(tool_text(&select_result)?)?;
    assert_eq!(query["total_matches"], 1);

    let append_result = timeout(
        Duration::from_secs(10),
        service.peer().call_tool(CallToolRequestParam {
            name: "append_shared_context".into(),
            arguments: Some(
                json!({"id": task_id, "entry": "narrowed it down to a race in the retry loop"})
                    .as_object()
                    .unwrap()
                    .clone(),
            ),
        }),
    )
    .await
    .context("timed out waiting for append_shared_context")??;

    let appended: Value = serde_json::from_str(tool_text(&append_result)?)?;
    assert_eq!(
        appended["shared_context"][0],
        "narrowed it down to a race in the retry loop"
    );

    service.cancel().await?;
    Ok(())
}
