//! Task domain model.
//!
//! # Responsibility
//! - Define the task record and its `(status, due)` lifecycle state.
//! - Define recurrence rules and their day-skipping predicates.
//!
//! # Invariants
//! - A recurring task carries a `due` timestamp.
//! - Stored recurrence values that are not recognized are treated as absent.
//! - `due` keeps millisecond precision; sub-millisecond parts are dropped by
//!   persistence.

use crate::model::category::{CategoryId, OwnerId};
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a task.
pub type TaskId = Uuid;

/// Rule describing how a task's due date advances.
///
/// New variants only need a name and a [`Recurrence::skips`] predicate; the
/// anchoring logic in `schedule` is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    /// Every calendar day.
    Daily,
    /// Monday through Friday in the workspace timezone.
    Workday,
}

impl Recurrence {
    /// All recognized variants in storage order.
    pub const ALL: [Recurrence; 2] = [Recurrence::Daily, Recurrence::Workday];

    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Workday => "workday",
        }
    }

    /// Parses one exact storage name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|recurrence| recurrence.as_str() == value)
    }

    /// Maps a raw, possibly legacy, stored value to a recognized rule.
    ///
    /// Missing and unknown values both mean "not recurring".
    pub fn normalize(value: Option<&str>) -> Option<Self> {
        value.and_then(Self::parse)
    }

    /// Returns whether a candidate local date must be skipped by this rule.
    pub fn skips(self, date: NaiveDate) -> bool {
        match self {
            Self::Daily => false,
            Self::Workday => is_weekend(date),
        }
    }
}

impl Display for Recurrence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The mutable lifecycle pair of a task.
///
/// Lifecycle writes always replace both fields together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskState {
    /// `true` once completed.
    pub status: bool,
    pub due: Option<DateTime<Utc>>,
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: OwnerId,
    pub category_id: CategoryId,
    /// Non-blank title.
    pub name: String,
    pub content: Option<String>,
    pub status: bool,
    pub due: Option<DateTime<Utc>>,
    pub recurrence: Option<Recurrence>,
}

/// Validation failures for task writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Name is empty after trimming.
    BlankName,
    /// A recurrence rule was set without a due timestamp.
    RecurringTaskRequiresDue,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "task name must not be blank"),
            Self::RecurringTaskRequiresDue => {
                write!(f, "recurring task requires a due timestamp")
            }
        }
    }
}

impl Error for TaskValidationError {}

impl Task {
    /// Creates an incomplete, unscheduled task with a generated stable ID.
    pub fn new(owner_id: OwnerId, category_id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category_id,
            name: name.into(),
            content: None,
            status: false,
            due: None,
            recurrence: None,
        }
    }

    /// Returns the current lifecycle pair.
    pub fn state(&self) -> TaskState {
        TaskState {
            status: self.status,
            due: self.due,
        }
    }

    /// Checks write-time invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.name.trim().is_empty() {
            return Err(TaskValidationError::BlankName);
        }
        if self.recurrence.is_some() && self.due.is_none() {
            return Err(TaskValidationError::RecurringTaskRequiresDue);
        }
        Ok(())
    }
}
