//! Taskboard command-line entry point.
//!
//! # Responsibility
//! - Preview recurrence results without touching storage.
//! - Drive the dashboard endpoints against the configured database.
//!
//! Database commands read `TASKBOARD_DB_PATH`, `WORKSPACE_TIMEZONE`,
//! `TASKBOARD_LOG_LEVEL` and `TASKBOARD_LOG_DIR` from the environment.

use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::info;
use uuid::Uuid;

use taskboard_core::{
    init_logging, next_after_completion, next_for_manual_reschedule, open_db, resolve_timezone,
    ApiResponse, Recurrence, RuntimeConfig, SystemClock, TaskboardApi,
};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Recurring tasks and ordered notes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check core linkage
    Ping,

    /// Compute the next due instant for a recurring task
    NextDue {
        /// Current due instant (RFC 3339); defaults to now
        #[arg(long)]
        due: Option<String>,

        /// Recurrence rule (daily, workday)
        #[arg(short, long)]
        recurrence: String,

        /// Evaluation instant (RFC 3339); defaults to the system clock
        #[arg(long)]
        now: Option<String>,

        /// IANA timezone name
        #[arg(long, env = "WORKSPACE_TIMEZONE")]
        timezone: Option<String>,

        /// Use manual reschedule semantics instead of completion
        #[arg(long)]
        reschedule: bool,
    },

    /// Move a note: {"movedNoteId", "positionMovedTo", "positionMovedFrom"}
    ReorderNotes {
        /// JSON request body
        payload: String,
    },

    /// Set a task's completion flag: {"id", "value"}
    UpdateTaskStatus {
        /// Caller identity
        #[arg(long, env = "TASKBOARD_OWNER_ID")]
        owner: Option<Uuid>,

        /// JSON request body
        payload: String,
    },

    /// Move a recurring task to its next open day: {"id"}
    RescheduleTask {
        /// Caller identity
        #[arg(long, env = "TASKBOARD_OWNER_ID")]
        owner: Option<Uuid>,

        /// JSON request body
        payload: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ping => {
            println!("taskboard_core ping={}", taskboard_core::ping());
            println!("taskboard_core version={}", taskboard_core::core_version());
            Ok(ExitCode::SUCCESS)
        }
        Commands::NextDue {
            due,
            recurrence,
            now,
            timezone,
            reschedule,
        } => {
            let recurrence = Recurrence::parse(recurrence.trim())
                .ok_or_else(|| anyhow!("unknown recurrence `{recurrence}`"))?;
            let due = due.as_deref().map(parse_instant).transpose()?;
            let now = match now.as_deref() {
                Some(value) => parse_instant(value)?,
                None => Utc::now(),
            };
            let timezone = resolve_timezone(timezone.as_deref());

            let next = if reschedule {
                next_for_manual_reschedule(due, recurrence, now, timezone)
            } else {
                next_after_completion(due, recurrence, now, timezone)
            };
            println!("next_due={}", next.to_rfc3339());
            println!("local={}", next.with_timezone(&timezone).to_rfc3339());
            Ok(ExitCode::SUCCESS)
        }
        Commands::ReorderNotes { payload } => with_api(|api| api.reorder_notes(&payload)),
        Commands::UpdateTaskStatus { owner, payload } => {
            with_api(|api| api.update_task_status(owner, &payload))
        }
        Commands::RescheduleTask { owner, payload } => {
            with_api(|api| api.reschedule_task(owner, &payload))
        }
    }
}

fn with_api(call: impl FnOnce(&TaskboardApi<'_, SystemClock>) -> ApiResponse) -> Result<ExitCode> {
    let config = RuntimeConfig::from_env().context("failed to load configuration")?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir).context("failed to initialize logging")?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    let api = TaskboardApi::new(&conn, SystemClock, config.workspace_timezone);

    let response = call(&api);
    info!("event=cli_call module=cli status={}", response.status.code());
    println!("status={}", response.status.code());
    if let Some(body) = response.body() {
        println!("{body}");
    }

    Ok(if response.status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .with_context(|| format!("invalid RFC 3339 instant `{value}`"))
}
