mod config;
mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing::{error, info};

use config::LoggingConfig;
use mcp_protocol::TaskToolHandler;
use task_core::models::SessionEvent;
use task_core::protocol::{
    AddTaskParams, AppendSessionEventParams, AppendSharedContextParams, CleanupParams,
    CompleteTaskParams, DeleteTaskParams, ReopenTaskParams, SelectTasksParams, TaskOperations,
    UpdateTaskParams, WorkOnParams,
};
use workspace_orchestrator::TaskEngine;

#[derive(Parser)]
#[command(name = "mcp-tasks")]
#[command(about = "MCP task tracker for coding agents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Directory to resolve `.mcp-tasks.edn` from (defaults to cwd)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Log level (trace/debug/info/warn/error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log format
    #[arg(long, global = true, default_value = "compact")]
    log_format: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the MCP tool router over stdio (default when no subcommand given)
    Serve,
    AddTask {
        title: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        design: String,
        #[arg(long)]
        parent_id: Option<u64>,
        #[arg(long)]
        prepend: bool,
    },
    UpdateTask {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        design: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    SelectTasks {
        #[arg(long)]
        id: Option<u64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        parent_id: Option<u64>,
        #[arg(long)]
        title_pattern: Option<String>,
        #[arg(long)]
        include_archived: bool,
    },
    CompleteTask {
        id: u64,
        #[arg(long)]
        pr_num: Option<u64>,
    },
    DeleteTask {
        id: u64,
    },
    ReopenTask {
        id: u64,
    },
    WorkOn {
        id: u64,
    },
    Cleanup {
        id: u64,
    },
    ExecutionState,
    IsBlocked {
        id: u64,
    },
    AppendSharedContext {
        id: u64,
        #[arg(long)]
        entry: String,
    },
    AppendSessionEvent {
        id: u64,
        /// user-prompt, compaction, or session-start
        #[arg(long)]
        event_type: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        trigger: Option<String>,
        #[arg(long)]
        session_id: Option<String>,
    },
}

fn print_result(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_command(engine: &TaskEngine, command: Command) -> Result<()> {
    match command {
        Command::Serve => unreachable!("serve is handled before dispatch"),
        Command::AddTask {
            title,
            category,
            description,
            design,
            parent_id,
            prepend,
        } => {
            let task = engine
                .add_task(AddTaskParams {
                    title,
                    description,
                    design,
                    category,
                    task_type: None,
                    parent_id,
                    relations: Vec::new(),
                    prepend,
                })
                .await?;
            print_result(&task)
        }
        Command::UpdateTask { id, title, description, design, category } => {
            let task = engine
                .update_task(UpdateTaskParams {
                    id,
                    title,
                    description,
                    design,
                    category,
                    task_type: None,
                    relations: None,
                })
                .await?;
            print_result(&task)
        }
        Command::SelectTasks { id, category, parent_id, title_pattern, include_archived } => {
            let result = engine
                .select_tasks(SelectTasksParams {
                    id,
                    category,
                    parent_id,
                    title_pattern,
                    task_type: None,
                    include_archived,
                })
                .await?;
            print_result(&result)
        }
        Command::CompleteTask { id, pr_num } => {
            let task = engine.complete_task(CompleteTaskParams { id, pr_num }).await?;
            print_result(&task)
        }
        Command::DeleteTask { id } => {
            let task = engine.delete_task(DeleteTaskParams { id }).await?;
            print_result(&task)
        }
        Command::ReopenTask { id } => {
            let task = engine.reopen_task(ReopenTaskParams { id }).await?;
            print_result(&task)
        }
        Command::WorkOn { id } => {
            let result = engine.work_on(WorkOnParams { id }).await?;
            print_result(&result)
        }
        Command::Cleanup { id } => {
            let task = engine.cleanup(CleanupParams { id }).await?;
            print_result(&task)
        }
        Command::ExecutionState => {
            let state = engine.execution_state().await?;
            print_result(&state)
        }
        Command::IsBlocked { id } => {
            let status = engine.is_blocked(id).await?;
            print_result(&status)
        }
        Command::AppendSharedContext { id, entry } => {
            let task = engine.append_shared_context(AppendSharedContextParams { id, entry }).await?;
            print_result(&task)
        }
        Command::AppendSessionEvent { id, event_type, content, trigger, session_id } => {
            let timestamp = chrono::Utc::now();
            let event = match event_type.as_str() {
                "user-prompt" => SessionEvent::UserPrompt {
                    timestamp,
                    content: content.context("user-prompt requires --content")?,
                },
                "compaction" => SessionEvent::Compaction {
                    timestamp,
                    trigger: trigger.context("compaction requires --trigger")?,
                },
                "session-start" => SessionEvent::SessionStart {
                    timestamp,
                    session_id: session_id.context("session-start requires --session-id")?,
                },
                other => anyhow::bail!("unknown event type: {other}"),
            };
            let task = engine.append_session_event(AppendSessionEventParams { id, event }).await?;
            print_result(&task)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: cli.log_level.clone(),
        format: cli.log_format.parse().unwrap_or(config::LogFormat::Compact),
    };
    telemetry::init_telemetry(&logging).context("failed to initialize telemetry")?;

    let dir = match cli.dir {
        Some(d) => d,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let resolved = task_core::config::resolve(&dir).context("failed to resolve .mcp-tasks.edn")?;
    let engine = TaskEngine::open(resolved).context("failed to open task store")?;

    match cli.command {
        None | Some(Command::Serve) => serve(engine).await,
        Some(command) => match run_command(&engine, command).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "command failed");
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        },
    }
}

async fn serve(engine: TaskEngine) -> Result<()> {
    telemetry::log_startup_info(&engine.config().resolved_tasks_dir);
    let handler = TaskToolHandler::new(Arc::new(engine));

    let service = handler
        .serve(stdio())
        .await
        .context("failed to start stdio MCP transport")?;

    tokio::select! {
        result = service.waiting() => {
            result.context("MCP service loop error")?;
            info!("mcp-tasks server shut down cleanly");
        }
        _ = shutdown_signal() => {
            telemetry::log_shutdown_info();
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to register SIGTERM handler");
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
                .expect("failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, initiating graceful shutdown"),
            _ = sigint.recv() => info!("received SIGINT, initiating graceful shutdown"),
        }
    }

    #[cfg(windows)]
    {
        tokio::signal::ctrl_c().await.expect("failed to listen for ctrl_c");
        info!("received Ctrl+C, initiating graceful shutdown");
    }
}
