use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::StudyStats;

/// Add `delta` to a student's completed count for `date`. Never drops below zero.
pub fn record_completion(
    conn: &Connection,
    owner_id: &Uuid,
    date: NaiveDate,
    delta: i64,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO study_stats (owner_id, date, completed_count) VALUES (?1, ?2, MAX(0, ?3))
         ON CONFLICT(owner_id, date)
         DO UPDATE SET completed_count = MAX(0, completed_count + ?3)",
        params![owner_id.to_string(), date.to_string(), delta],
    )?;
    Ok(())
}

pub fn get_study_stats(
    conn: &Connection,
    owner_id: &Uuid,
    date: NaiveDate,
) -> Result<Option<StudyStats>, DatabaseError> {
    let count = conn
        .query_row(
            "SELECT completed_count FROM study_stats WHERE owner_id = ?1 AND date = ?2",
            params![owner_id.to_string(), date.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    Ok(count.map(|completed_count| StudyStats {
        owner_id: *owner_id,
        date,
        completed_count,
    }))
}
