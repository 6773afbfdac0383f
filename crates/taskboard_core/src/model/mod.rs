//! Domain model for the task/notes core.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep recurrence rules and ordering plans free of storage concerns.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Note positions inside one category form a dense `0..N` permutation.

pub mod category;
pub mod note;
pub mod ordering;
pub mod task;
