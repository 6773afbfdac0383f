//! Request-contract layer for dashboard endpoints.
//!
//! # Responsibility
//! - Decode raw JSON request bodies and validate them.
//! - Dispatch to the note and task services over one connection.
//! - Map service outcomes to stable status codes and messages.
//!
//! # Invariants
//! - Calls never panic; every outcome is an [`ApiResponse`].
//! - Task endpoints check caller identity before looking at the body.
//! - Internal failures are logged with context and reported with a fixed
//!   message that carries no detail.

use crate::model::category::OwnerId;
use crate::repo::note_repo::SqliteNoteRepository;
use crate::repo::task_repo::SqliteTaskRepository;
use crate::schedule::clock::Clock;
use crate::service::note_service::{NoteService, NoteServiceError, ReorderRequest};
use crate::service::task_service::{TaskService, TaskServiceError};
use chrono_tz::Tz;
use log::{error, warn};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

const UNAUTHORIZED: &str = "Unauthorized";
const INVALID_PAYLOAD: &str = "Invalid payload";
const TASK_ID_REQUIRED: &str = "Task id is required";
const TASK_NOT_FOUND: &str = "Task not found";
const TASK_NOT_RECURRING: &str = "Task is not recurring";
const NOTE_NOT_FOUND: &str = "Note not found";
const POSITION_MISMATCH: &str = "Note position changed";
const POSITION_OUT_OF_RANGE: &str = "Position out of range";
const UPDATE_FAILED: &str = "Unable to update task";
const RESCHEDULE_FAILED: &str = "Unable to reschedule task";
const REORDER_FAILED: &str = "Unable to reorder notes";

/// Response status of one contract call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    NoContent,
    BadRequest,
    Unauthorized,
    NotFound,
    InternalError,
}

impl ApiStatus {
    /// HTTP-compatible status code.
    pub fn code(self) -> u16 {
        match self {
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::NoContent)
    }
}

/// Status plus optional human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: ApiStatus,
    pub message: Option<String>,
}

impl ApiResponse {
    fn no_content() -> Self {
        Self {
            status: ApiStatus::NoContent,
            message: None,
        }
    }

    fn bare(status: ApiStatus) -> Self {
        Self {
            status,
            message: None,
        }
    }

    fn failure(status: ApiStatus, message: &str) -> Self {
        Self {
            status,
            message: Some(message.to_string()),
        }
    }

    /// JSON response body; `None` for bodiless responses.
    pub fn body(&self) -> Option<String> {
        self.message
            .as_ref()
            .map(|message| json!({ "message": message }).to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReorderNotesPayload {
    moved_note_id: String,
    position_moved_to: u32,
    position_moved_from: u32,
}

#[derive(Debug, Deserialize)]
struct UpdateTaskStatusPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    value: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RescheduleTaskPayload {
    #[serde(default)]
    id: Option<String>,
}

/// Endpoint facade bound to one connection, clock and workspace timezone.
pub struct TaskboardApi<'conn, C: Clock> {
    conn: &'conn Connection,
    clock: C,
    timezone: Tz,
}

impl<'conn, C: Clock> TaskboardApi<'conn, C> {
    pub fn new(conn: &'conn Connection, clock: C, timezone: Tz) -> Self {
        Self {
            conn,
            clock,
            timezone,
        }
    }

    /// `{movedNoteId, positionMovedTo, positionMovedFrom}` -> 204.
    ///
    /// Positions must be non-negative integers. Moving a note onto its own
    /// slot succeeds before the id is looked at or storage is touched.
    pub fn reorder_notes(&self, body: &str) -> ApiResponse {
        let Ok(payload) = serde_json::from_str::<ReorderNotesPayload>(body) else {
            return ApiResponse::bare(ApiStatus::BadRequest);
        };
        if payload.position_moved_to == payload.position_moved_from {
            return ApiResponse::no_content();
        }
        let Some(note_id) = parse_id(&payload.moved_note_id) else {
            return ApiResponse::bare(ApiStatus::NotFound);
        };

        let request = ReorderRequest {
            note_id,
            position_from: payload.position_moved_from,
            position_to: payload.position_moved_to,
            category_scope: None,
        };

        let outcome = SqliteNoteRepository::try_new(self.conn)
            .map_err(NoteServiceError::from)
            .and_then(|repo| NoteService::new(repo).reorder(&request));

        match outcome {
            Ok(_) => ApiResponse::no_content(),
            Err(NoteServiceError::NoteNotFound(_)) => {
                ApiResponse::failure(ApiStatus::NotFound, NOTE_NOT_FOUND)
            }
            Err(NoteServiceError::PositionMismatch { .. }) => {
                ApiResponse::failure(ApiStatus::BadRequest, POSITION_MISMATCH)
            }
            Err(NoteServiceError::PositionOutOfRange { .. }) => {
                ApiResponse::failure(ApiStatus::BadRequest, POSITION_OUT_OF_RANGE)
            }
            Err(err) => {
                error!(
                    "event=api_reorder_notes module=api status=error note_id={} error={}",
                    note_id, err
                );
                ApiResponse::failure(ApiStatus::InternalError, REORDER_FAILED)
            }
        }
    }

    /// `{id, value}` for the caller's task -> 204.
    pub fn update_task_status(&self, caller: Option<OwnerId>, body: &str) -> ApiResponse {
        let Some(owner_id) = caller else {
            return ApiResponse::failure(ApiStatus::Unauthorized, UNAUTHORIZED);
        };
        let (raw_id, value) = match serde_json::from_str::<UpdateTaskStatusPayload>(body) {
            Ok(UpdateTaskStatusPayload {
                id: Some(id),
                value: Some(value),
            }) if !id.trim().is_empty() => (id, value),
            _ => return ApiResponse::failure(ApiStatus::BadRequest, INVALID_PAYLOAD),
        };
        let Some(task_id) = parse_id(&raw_id) else {
            return ApiResponse::failure(ApiStatus::NotFound, TASK_NOT_FOUND);
        };

        let outcome = SqliteTaskRepository::try_new(self.conn)
            .map_err(TaskServiceError::from)
            .and_then(|repo| {
                TaskService::new(repo, &self.clock, self.timezone)
                    .set_status(owner_id, task_id, value)
            });
        task_response("api_update_task_status", task_id, outcome, UPDATE_FAILED)
    }

    /// `{id}` for the caller's recurring task -> 204.
    pub fn reschedule_task(&self, caller: Option<OwnerId>, body: &str) -> ApiResponse {
        let Some(owner_id) = caller else {
            return ApiResponse::failure(ApiStatus::Unauthorized, UNAUTHORIZED);
        };
        let raw_id = match serde_json::from_str::<RescheduleTaskPayload>(body) {
            Ok(payload) => payload.id.filter(|id| !id.trim().is_empty()),
            Err(_) => return ApiResponse::failure(ApiStatus::BadRequest, INVALID_PAYLOAD),
        };
        let Some(raw_id) = raw_id else {
            return ApiResponse::failure(ApiStatus::BadRequest, TASK_ID_REQUIRED);
        };
        let Some(task_id) = parse_id(&raw_id) else {
            return ApiResponse::failure(ApiStatus::NotFound, TASK_NOT_FOUND);
        };

        let outcome = SqliteTaskRepository::try_new(self.conn)
            .map_err(TaskServiceError::from)
            .and_then(|repo| {
                TaskService::new(repo, &self.clock, self.timezone).reschedule(owner_id, task_id)
            });
        task_response("api_reschedule_task", task_id, outcome, RESCHEDULE_FAILED)
    }
}

fn task_response<T>(
    event: &'static str,
    task_id: Uuid,
    outcome: Result<T, TaskServiceError>,
    failure_message: &str,
) -> ApiResponse {
    match outcome {
        Ok(_) => ApiResponse::no_content(),
        Err(TaskServiceError::TaskNotFound(_)) => {
            ApiResponse::failure(ApiStatus::NotFound, TASK_NOT_FOUND)
        }
        Err(TaskServiceError::InvalidOperation { .. }) => {
            ApiResponse::failure(ApiStatus::BadRequest, TASK_NOT_RECURRING)
        }
        Err(TaskServiceError::ConcurrentModification(_)) => {
            warn!(
                "event={} module=api status=error task_id={} error_code=concurrent_modification",
                event, task_id
            );
            ApiResponse::failure(ApiStatus::InternalError, failure_message)
        }
        Err(err) => {
            error!(
                "event={} module=api status=error task_id={} error={}",
                event, task_id, err
            );
            ApiResponse::failure(ApiStatus::InternalError, failure_message)
        }
    }
}

fn parse_id(value: &str) -> Option<Uuid> {
    Uuid::parse_str(value.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::{ApiResponse, ApiStatus};

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(ApiStatus::NoContent.code(), 204);
        assert_eq!(ApiStatus::BadRequest.code(), 400);
        assert_eq!(ApiStatus::Unauthorized.code(), 401);
        assert_eq!(ApiStatus::NotFound.code(), 404);
        assert_eq!(ApiStatus::InternalError.code(), 500);
        assert!(ApiStatus::NoContent.is_success());
        assert!(!ApiStatus::NotFound.is_success());
    }

    #[test]
    fn body_is_json_message_or_empty() {
        assert_eq!(ApiResponse::no_content().body(), None);
        assert_eq!(
            ApiResponse::failure(ApiStatus::BadRequest, "Invalid payload").body(),
            Some(r#"{"message":"Invalid payload"}"#.to_string())
        );
    }
}
