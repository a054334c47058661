// studiolog - core/time.rs
//
// Timestamp parsing and date-range containment for log entries.
//
// Entry timestamps are carried around as the original strings; parsing to
// chrono types happens only when a date filter is active. Parse failure is
// never an error; a timestamp that matches none of the known formats
// simply yields None.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// The fixed timestamp formats, tried in order. First success wins.
///
/// 1. Millisecond-precision ISO with trailing zone marker (the native
///    Studio log format, e.g. `2026-02-03T08:52:02.095Z`).
/// 2. Second-precision ISO with trailing zone marker.
/// 3. ISO without zone marker.
/// 4. Date only.
const FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse a timestamp string against the known formats.
///
/// Returns `None` on failure, never an error.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let trimmed = s.trim();
    for format in FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(ndt.and_utc());
        }
    }
    // Date-only: midnight UTC.
    if let Ok(nd) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return nd.and_hms_opt(0, 0, 0).map(|ndt| ndt.and_utc());
    }
    None
}

/// Whether `s` is a bare date with no time component.
fn is_date_only(s: &str) -> bool {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok()
}

/// A parsed, inclusive date-range filter.
///
/// Bound semantics are deliberately asymmetric: a date-only END bound
/// expands to 23:59:59.999999 of that day (inclusive-day), while a
/// date-only START bound stays at literal midnight. Callers paging through
/// "logs for 2026-02-03" expect the whole day on both ends, and midnight
/// already is the start of the day.
#[derive(Debug, Clone, Default)]
pub struct TimeRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Parse optional bound strings. An unparseable bound is treated as
    /// absent (and logged), keeping the scan well-formed.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Self {
        let start = start.and_then(|s| {
            let parsed = parse_timestamp(s);
            if parsed.is_none() {
                tracing::warn!(bound = s, "Unparseable start bound ignored");
            }
            parsed
        });
        let end = end.and_then(|s| {
            let parsed = if is_date_only(s) {
                NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999))
                    .map(|ndt| ndt.and_utc())
            } else {
                parse_timestamp(s)
            };
            if parsed.is_none() {
                tracing::warn!(bound = s, "Unparseable end bound ignored");
            }
            parsed
        });
        Self { start, end }
    }

    /// True when neither bound is active.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether the entry timestamp string falls inside the range.
    ///
    /// Both bounds absent → always true. With a bound active, an entry
    /// whose timestamp cannot be parsed is excluded.
    pub fn contains(&self, timestamp: &str) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(ts) = parse_timestamp(timestamp) else {
            return false;
        };
        if let Some(start) = self.start {
            if ts < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if ts > end {
                return false;
            }
        }
        true
    }
}
