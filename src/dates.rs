use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Storage format for every timestamp column.
pub const DB_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn to_db(dt: &NaiveDateTime) -> String {
    dt.format(DB_FORMAT).to_string()
}

pub fn from_db(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DB_FORMAT).ok()
}

/// Parses an ISO date or date-time sent by a client.
///
/// Accepts RFC 3339 (converted to UTC), `YYYY-MM-DDTHH:MM[:SS]`,
/// `YYYY-MM-DD HH:MM[:SS]` and a bare `YYYY-MM-DD` (midnight).
pub fn parse_input(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Half-open `[start, end)` bounds covering whole days `from..=to`.
pub fn day_bounds(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    let start = from.and_then(|d| d.and_hms_opt(0, 0, 0));
    let end = to
        .and_then(|d| d.checked_add_signed(Duration::days(1)))
        .and_then(|d| d.and_hms_opt(0, 0, 0));
    (start, end)
}
