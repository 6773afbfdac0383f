//! Note ordering use-case service.
//!
//! # Responsibility
//! - Validate reorder requests and hand the shift plan to the repository.
//! - Provide create/list/delete entry points that respect dense ordering.
//!
//! # Invariants
//! - `from == to` is a successful no-op that touches no storage.
//! - The moved note's category is taken from its record, never from the
//!   caller.
//! - The caller's `from` must match the stored position at transaction time.

use crate::model::category::CategoryId;
use crate::model::note::{Note, NoteId};
use crate::model::ordering::PositionShift;
use crate::repo::note_repo::{NoteMove, NoteRepository};
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Note name is blank after trim.
    InvalidName,
    /// Target category does not exist.
    CategoryNotFound(CategoryId),
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Caller's `from` disagrees with the stored position.
    PositionMismatch {
        note_id: NoteId,
        expected: u32,
        actual: u32,
    },
    /// Target slot is outside the category.
    PositionOutOfRange { position: u32, len: u32 },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "note name must not be blank"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::PositionMismatch {
                note_id,
                expected,
                actual,
            } => write!(
                f,
                "note {note_id} is at position {actual}, request expected {expected}"
            ),
            Self::PositionOutOfRange { position, len } => {
                write!(f, "position {position} is outside 0..{len}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::CategoryNotFound(id) => Self::CategoryNotFound(id),
            RepoError::NoteNotFound(id) => Self::NoteNotFound(id),
            RepoError::PositionMismatch {
                note_id,
                expected,
                actual,
            } => Self::PositionMismatch {
                note_id,
                expected,
                actual,
            },
            RepoError::PositionOutOfRange { position, len } => {
                Self::PositionOutOfRange { position, len }
            }
            other => Self::Repo(other),
        }
    }
}

/// One drag-reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderRequest {
    pub note_id: NoteId,
    pub position_from: u32,
    pub position_to: u32,
    /// Category the caller believes the note is in. Informational only.
    pub category_scope: Option<CategoryId>,
}

/// Result of a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// `from == to`; nothing was read or written.
    Unchanged,
    /// The move committed.
    Moved(NoteMove),
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends a note to the end of `category_id`.
    pub fn create_note(
        &self,
        category_id: CategoryId,
        name: impl Into<String>,
        content: Option<String>,
    ) -> Result<Note, NoteServiceError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(NoteServiceError::InvalidName);
        }

        let note = self
            .repo
            .create_note(category_id, trimmed, content.as_deref())?;
        info!(
            "event=note_create module=service status=ok note_id={} category_id={} position={}",
            note.id, category_id, note.position
        );
        Ok(note)
    }

    /// Gets one note by id.
    pub fn get_note(&self, note_id: NoteId) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(note_id)?
            .ok_or(NoteServiceError::NoteNotFound(note_id))
    }

    /// Lists one category in position order.
    pub fn list_notes(&self, category_id: CategoryId) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes(category_id)?)
    }

    /// Deletes one note; trailing notes move up one slot.
    pub fn delete_note(&self, note_id: NoteId) -> Result<(), NoteServiceError> {
        self.repo.delete_note(note_id)?;
        info!("event=note_delete module=service status=ok note_id={note_id}");
        Ok(())
    }

    /// Moves one note inside its category and shifts the notes in between.
    pub fn reorder(&self, request: &ReorderRequest) -> Result<ReorderOutcome, NoteServiceError> {
        let Some(shift) = PositionShift::between(request.position_from, request.position_to)
        else {
            info!(
                "event=note_reorder module=service status=noop note_id={}",
                request.note_id
            );
            return Ok(ReorderOutcome::Unchanged);
        };

        let moved = self.repo.move_note(request.note_id, shift)?;
        if let Some(scope) = request.category_scope {
            if scope != moved.category_id {
                warn!(
                    "event=note_reorder module=service status=scope_mismatch note_id={} requested_category={} actual_category={}",
                    request.note_id, scope, moved.category_id
                );
            }
        }

        info!(
            "event=note_reorder module=service status=ok note_id={} category_id={} from={} to={} displaced={}",
            request.note_id,
            moved.category_id,
            shift.from(),
            shift.to(),
            moved.displaced
        );
        Ok(ReorderOutcome::Moved(moved))
    }
}
