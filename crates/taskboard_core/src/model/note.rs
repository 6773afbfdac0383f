//! Note domain model.
//!
//! # Invariants
//! - `position` is the note's slot in its category's dense ordering.
//! - Only the note repository writes `position`.

use crate::model::category::CategoryId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a note.
pub type NoteId = Uuid;

/// Note read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub category_id: CategoryId,
    pub name: String,
    pub content: Option<String>,
    /// Zero-based slot inside `category_id`.
    pub position: u32,
}
