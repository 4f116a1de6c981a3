pub mod sqlite;
pub mod repository;

pub use sqlite::*;
pub use repository::*;

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Corrupt column {column}: {reason}")]
    CorruptColumn { column: &'static str, reason: String },
}

/// Fixed-width timestamp format so text ordering matches time ordering.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(
    column: &'static str,
    raw: &str,
) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| {
        DatabaseError::CorruptColumn {
            column,
            reason: e.to_string(),
        }
    })
}

pub(crate) fn parse_uuid(column: &'static str, raw: &str) -> Result<uuid::Uuid, DatabaseError> {
    uuid::Uuid::parse_str(raw).map_err(|e| DatabaseError::CorruptColumn {
        column,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_sort_lexically() {
        let earlier = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let later = earlier + chrono::Duration::microseconds(500);
        let (a, b) = (format_timestamp(&earlier), format_timestamp(&later));
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn timestamp_round_trip_keeps_microseconds() {
        let now = chrono::Utc::now().naive_utc();
        let parsed = parse_timestamp("created_at", &format_timestamp(&now)).unwrap();
        assert_eq!(parsed.and_utc().timestamp_micros(), now.and_utc().timestamp_micros());
    }

    #[test]
    fn corrupt_timestamp_reports_column() {
        let err = parse_timestamp("date", "yesterday").unwrap_err();
        assert!(err.to_string().contains("date"));
    }
}
