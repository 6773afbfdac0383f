//! Workspace timezone resolution.

use chrono_tz::Tz;

/// Timezone used when none is configured or the configured name is unknown.
pub const FALLBACK_TIMEZONE: Tz = Tz::UTC;

/// Resolves an IANA timezone name, falling back to UTC.
///
/// Blank, missing and unknown names never fail; they resolve to
/// [`FALLBACK_TIMEZONE`].
pub fn resolve_timezone(value: Option<&str>) -> Tz {
    value
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(FALLBACK_TIMEZONE)
}
