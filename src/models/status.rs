use std::fmt;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Lifecycle status shared by bookings and invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Success,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Pending,
        Status::Confirmed,
        Status::InProgress,
        Status::Completed,
        Status::Success,
        Status::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Confirmed => "confirmed",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
            Status::Success => "success",
            Status::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Status::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Statuses reachable in one step.
    pub fn allowed_next(&self) -> &'static [Status] {
        match self {
            Status::Pending => &[Status::Confirmed, Status::InProgress, Status::Cancelled],
            Status::Confirmed => &[Status::InProgress, Status::Cancelled],
            Status::InProgress => &[Status::Completed],
            Status::Completed => &[Status::Success],
            Status::Success | Status::Cancelled => &[],
        }
    }

    /// Staying on the same status is always permitted.
    pub fn can_transition_to(&self, next: Status) -> bool {
        *self == next || self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Status::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown status: {s}").into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_are_snake_case() {
        assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"in_progress\"");
        let parsed: Status = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(parsed, Status::Success);
        for status in Status::ALL {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
        assert_eq!(Status::parse("done"), None);
    }

    #[test]
    fn test_forward_path_is_allowed() {
        let path = [
            Status::Pending,
            Status::Confirmed,
            Status::InProgress,
            Status::Completed,
            Status::Success,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_cancel_only_from_early_states() {
        assert!(Status::Pending.can_transition_to(Status::Cancelled));
        assert!(Status::Confirmed.can_transition_to(Status::Cancelled));
        assert!(!Status::InProgress.can_transition_to(Status::Cancelled));
        assert!(!Status::Completed.can_transition_to(Status::Cancelled));
    }

    #[test]
    fn test_terminal_states() {
        assert!(Status::Success.is_terminal());
        assert!(Status::Cancelled.is_terminal());
        assert!(!Status::Cancelled.can_transition_to(Status::Pending));
        assert!(Status::Cancelled.can_transition_to(Status::Cancelled));
        assert!(!Status::Pending.can_transition_to(Status::Success));
    }
}
