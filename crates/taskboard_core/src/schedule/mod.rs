//! Due-date scheduling for recurring tasks.
//!
//! # Responsibility
//! - Compute next due timestamps from `(due, recurrence, now, timezone)`.
//! - Provide the injectable clock and timezone resolution used by services.
//!
//! # Invariants
//! - Computation is pure: "now" and the timezone are always parameters.
//! - Results never land before "now".

pub mod clock;
pub mod recurrence;
pub mod timezone;
