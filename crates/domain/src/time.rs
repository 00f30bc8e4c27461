//! Time and timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};

/// UTC timestamp used for `created_at`, `last_executed_at`, audit times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Format a timestamp as fixed-width RFC 3339 (microsecond precision, `Z`).
///
/// Every value has the same width, so lexical order equals time order.
#[must_use]
pub fn to_sortable(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
