//! Category and ownership identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a category.
pub type CategoryId = Uuid;

/// Opaque identity of the workspace member that owns categories and tasks.
///
/// Resolved by the surrounding authentication layer; core never inspects it
/// beyond equality.
pub type OwnerId = Uuid;

/// Grouping record that scopes tasks and the ordered note list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub owner_id: OwnerId,
    /// Unique per owner. Stored trimmed.
    pub name: String,
}

impl Category {
    /// Creates a category with a generated stable ID.
    pub fn new(owner_id: OwnerId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
        }
    }
}
