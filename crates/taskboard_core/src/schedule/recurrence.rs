//! Recurrence engine.
//!
//! # Responsibility
//! - `next_after_completion`: the due date a recurring task moves to when it
//!   is completed. Always at least one day ahead of the anchor.
//! - `next_for_manual_reschedule`: the "today, or the next possible day"
//!   correction used when a recurring task was missed.
//!
//! # Invariants
//! - Both operations are total and free of I/O.
//! - Calendar arithmetic happens on the local date in the given timezone and
//!   keeps the template's wall-clock time-of-day, including sub-seconds.
//! - `next_after_completion(..) > now`; `next_for_manual_reschedule(..) >= now`.
//! - Dates rejected by `Recurrence::skips` are never returned.

use crate::model::task::Recurrence;
use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

/// Upper bound on consecutive skipped days for any rule.
const MAX_SKIPPED_DAYS: usize = 7;

/// Computes the next due timestamp after a recurring task is completed.
///
/// The result is one calendar day after the anchor, rolled forward past days
/// the rule skips.
pub fn next_after_completion(
    current_due: Option<DateTime<Utc>>,
    recurrence: Recurrence,
    now: DateTime<Utc>,
    timezone: Tz,
) -> DateTime<Utc> {
    let anchor = Anchor::compute(current_due, now, timezone);
    anchor
        .slot
        .next_day()
        .skip(recurrence)
        .resolve(timezone)
        .with_timezone(&Utc)
}

/// Computes the due timestamp for an explicit "reschedule" action.
///
/// Offers today at the template's time-of-day when that instant has not
/// passed, otherwise tomorrow; then rolls past days the rule skips.
///
/// The today-or-tomorrow offer only applies to overdue or missing due
/// dates. A due date still in the future is not pulled back to today; it is
/// kept as is unless the rule skips its day.
pub fn next_for_manual_reschedule(
    current_due: Option<DateTime<Utc>>,
    recurrence: Recurrence,
    now: DateTime<Utc>,
    timezone: Tz,
) -> DateTime<Utc> {
    let anchor = Anchor::compute(current_due, now, timezone);
    if !recurrence.skips(anchor.slot.date) {
        return anchor.instant;
    }
    anchor
        .slot
        .skip(recurrence)
        .resolve(timezone)
        .with_timezone(&Utc)
}

/// Reference point both operations advance from.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    slot: LocalSlot,
    instant: DateTime<Utc>,
}

impl Anchor {
    fn compute(current_due: Option<DateTime<Utc>>, now: DateTime<Utc>, timezone: Tz) -> Self {
        let template = current_due.unwrap_or(now);
        let template_local = template.with_timezone(&timezone);
        if template >= now {
            return Self {
                slot: LocalSlot::of(&template_local),
                instant: template,
            };
        }

        let today = LocalSlot {
            date: now.with_timezone(&timezone).date_naive(),
            time: template_local.time(),
        };
        let slot = if today.resolve(timezone) < now {
            today.next_day()
        } else {
            today
        };
        Self {
            slot,
            instant: slot.resolve(timezone).with_timezone(&Utc),
        }
    }
}

/// Wall-clock date and time in the workspace timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LocalSlot {
    date: NaiveDate,
    time: NaiveTime,
}

impl LocalSlot {
    fn of(instant: &DateTime<Tz>) -> Self {
        Self {
            date: instant.date_naive(),
            time: instant.time(),
        }
    }

    fn next_day(self) -> Self {
        Self {
            date: self.date.succ_opt().unwrap_or(self.date),
            ..self
        }
    }

    fn skip(self, recurrence: Recurrence) -> Self {
        let mut slot = self;
        for _ in 0..MAX_SKIPPED_DAYS {
            if !recurrence.skips(slot.date) {
                break;
            }
            slot = slot.next_day();
        }
        slot
    }

    /// Maps the wall time to an instant.
    ///
    /// Ambiguous times (DST fold) take the earlier instant. Nonexistent times
    /// (DST gap) move forward by the length of the gap.
    fn resolve(self, timezone: Tz) -> DateTime<Tz> {
        let local = self.date.and_time(self.time);
        match timezone.from_local_datetime(&local) {
            LocalResult::Single(instant) => instant,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => resolve_in_gap(timezone, local),
        }
    }
}

fn resolve_in_gap(timezone: Tz, local: NaiveDateTime) -> DateTime<Tz> {
    let before_gap = local - TimeDelta::days(1);
    let offset = timezone
        .offset_from_local_datetime(&before_gap)
        .earliest()
        .map(|offset| offset.fix())
        .unwrap_or_else(|| timezone.offset_from_utc_datetime(&local).fix());
    let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    Utc.from_utc_datetime(&utc).with_timezone(&timezone)
}
