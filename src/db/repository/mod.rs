//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per table; all public functions are re-exported here.

mod account;
mod course;
mod graph;
mod student;
mod study_stats;
mod task;

pub use account::*;
pub use course::*;
pub use graph::*;
pub use student::*;
pub use study_stats::*;
pub use task::*;

use super::DatabaseError;

/// Map a UNIQUE/CHECK failure to `ConstraintViolation`, everything else passes through.
pub(crate) fn map_constraint(err: rusqlite::Error, detail: &str) -> DatabaseError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(detail.to_string())
        }
        _ => DatabaseError::Sqlite(err),
    }
}
