//! Task lifecycle use-case service.
//!
//! # Responsibility
//! - Apply status toggles and manual reschedules to one task.
//! - Call the recurrence engine with the injected clock and workspace
//!   timezone.
//!
//! # Invariants
//! - Completing a recurring task never leaves it completed: the write is
//!   `(status=false, due=next occurrence)`.
//! - Each operation commits at most one write of the `(status, due)` pair,
//!   conditional on the pair it read. A lost race is retried from a fresh
//!   read.
//! - `Err` always means nothing was committed.
//! - Foreign tasks are reported exactly like unknown tasks.

use crate::model::category::{CategoryId, OwnerId};
use crate::model::task::{Task, TaskId, TaskState, TaskValidationError};
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use crate::schedule::clock::Clock;
use crate::schedule::recurrence::{next_after_completion, next_for_manual_reschedule};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Attempts per operation before a write race is reported.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Errors from task lifecycle operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Task input failed validation.
    InvalidTask(TaskValidationError),
    /// Target category does not exist for this owner.
    CategoryNotFound(CategoryId),
    /// Task does not exist or is owned by someone else.
    TaskNotFound(TaskId),
    /// Operation is not valid for the task's current shape.
    InvalidOperation {
        task_id: TaskId,
        reason: &'static str,
    },
    /// Every write attempt lost a race with another writer.
    ConcurrentModification(TaskId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTask(err) => write!(f, "invalid task: {err}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidOperation { task_id, reason } => {
                write!(f, "invalid operation on task {task_id}: {reason}")
            }
            Self::ConcurrentModification(id) => {
                write!(f, "task {id} changed concurrently; no write committed")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidTask(err),
            RepoError::CategoryNotFound(id) => Self::CategoryNotFound(id),
            RepoError::TaskNotFound(id) => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Committed lifecycle write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTransition {
    pub task_id: TaskId,
    /// Pair read before the write.
    pub previous: TaskState,
    /// Pair now stored.
    pub next: TaskState,
    /// Whether `due` was moved by the recurrence engine.
    pub recurrence_advanced: bool,
}

struct PlannedWrite {
    next: TaskState,
    recurrence_advanced: bool,
}

/// Task lifecycle service over a repository, a clock and a timezone.
pub struct TaskService<R: TaskRepository, C: Clock> {
    repo: R,
    clock: C,
    timezone: Tz,
}

impl<R: TaskRepository, C: Clock> TaskService<R, C> {
    pub fn new(repo: R, clock: C, timezone: Tz) -> Self {
        Self {
            repo,
            clock,
            timezone,
        }
    }

    /// Workspace timezone used for calendar arithmetic.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Persists a new task.
    pub fn create_task(&self, task: &Task) -> Result<TaskId, TaskServiceError> {
        let task_id = self.repo.create_task(task)?;
        info!(
            "event=task_create module=service status=ok task_id={} recurring={}",
            task_id,
            task.recurrence.is_some()
        );
        Ok(task_id)
    }

    /// Loads one task owned by `owner_id`.
    pub fn get_task(&self, owner_id: OwnerId, task_id: TaskId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(owner_id, task_id)?
            .ok_or(TaskServiceError::TaskNotFound(task_id))
    }

    /// Sets the completion flag.
    ///
    /// Completing a task with a recognized recurrence advances `due` to the
    /// next occurrence and stores it as incomplete. Any other combination
    /// stores `value` and leaves `due` untouched.
    pub fn set_status(
        &self,
        owner_id: OwnerId,
        task_id: TaskId,
        value: bool,
    ) -> Result<TaskTransition, TaskServiceError> {
        let timezone = self.timezone;
        self.transition("task_status", owner_id, task_id, |task, now| {
            Ok(match (value, task.recurrence) {
                (true, Some(recurrence)) => PlannedWrite {
                    next: TaskState {
                        status: false,
                        due: Some(next_after_completion(task.due, recurrence, now, timezone)),
                    },
                    recurrence_advanced: true,
                },
                _ => PlannedWrite {
                    next: TaskState {
                        status: value,
                        due: task.due,
                    },
                    recurrence_advanced: false,
                },
            })
        })
    }

    /// Moves a recurring task to today, or the next day its rule allows, and
    /// marks it incomplete.
    ///
    /// # Errors
    /// - `InvalidOperation` when the task has no recognized recurrence.
    pub fn reschedule(
        &self,
        owner_id: OwnerId,
        task_id: TaskId,
    ) -> Result<TaskTransition, TaskServiceError> {
        let timezone = self.timezone;
        self.transition("task_reschedule", owner_id, task_id, |task, now| {
            let recurrence = task
                .recurrence
                .ok_or(TaskServiceError::InvalidOperation {
                    task_id: task.id,
                    reason: "task is not recurring",
                })?;
            Ok(PlannedWrite {
                next: TaskState {
                    status: false,
                    due: Some(next_for_manual_reschedule(
                        task.due, recurrence, now, timezone,
                    )),
                },
                recurrence_advanced: true,
            })
        })
    }

    fn transition(
        &self,
        event: &'static str,
        owner_id: OwnerId,
        task_id: TaskId,
        plan: impl Fn(&Task, DateTime<Utc>) -> Result<PlannedWrite, TaskServiceError>,
    ) -> Result<TaskTransition, TaskServiceError> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let task = self.get_task(owner_id, task_id)?;
            let previous = task.state();
            let planned = plan(&task, self.clock.now())?;

            if self
                .repo
                .compare_and_set_state(owner_id, task_id, previous, planned.next)?
            {
                info!(
                    "event={} module=service status=ok task_id={} recurrence_advanced={} attempt={}",
                    event, task_id, planned.recurrence_advanced, attempt
                );
                return Ok(TaskTransition {
                    task_id,
                    previous,
                    next: planned.next,
                    recurrence_advanced: planned.recurrence_advanced,
                });
            }

            warn!(
                "event={} module=service status=retry task_id={} attempt={}",
                event, task_id, attempt
            );
        }

        error!(
            "event={} module=service status=error task_id={} error_code=concurrent_modification",
            event, task_id
        );
        Err(TaskServiceError::ConcurrentModification(task_id))
    }
}
