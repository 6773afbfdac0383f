//! Core domain logic for the taskboard dashboard.
//! Recurring task scheduling and dense note ordering live here; callers
//! (CLI, request handlers) only decode input and pick a status code.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use api::{ApiResponse, ApiStatus, TaskboardApi};
pub use config::{ConfigError, RuntimeConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryId, OwnerId};
pub use model::note::{Note, NoteId};
pub use model::ordering::PositionShift;
pub use model::task::{Recurrence, Task, TaskId, TaskState, TaskValidationError};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::note_repo::{NoteMove, NoteRepository, SqliteNoteRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use schedule::clock::{Clock, FixedClock, SystemClock};
pub use schedule::recurrence::{next_after_completion, next_for_manual_reschedule};
pub use schedule::timezone::{resolve_timezone, FALLBACK_TIMEZONE};
pub use service::category_service::{CategoryService, CategoryServiceError};
pub use service::note_service::{NoteService, NoteServiceError, ReorderOutcome, ReorderRequest};
pub use service::task_service::{TaskService, TaskServiceError, TaskTransition};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
