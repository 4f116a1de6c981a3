pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod health;
pub mod students;
pub mod tasks;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, StudentContext};
use crate::models::Student;

/// Load the authenticated student's row, recreating it if it went missing.
pub(crate) fn load_student(
    conn: &rusqlite::Connection,
    session: &StudentContext,
) -> Result<Student, ApiError> {
    Ok(crate::db::get_or_create_student(conn, &session.username)?)
}

/// Open a connection and load the student in one step.
pub(crate) fn open_for_student(
    ctx: &ApiContext,
    session: &StudentContext,
) -> Result<(rusqlite::Connection, Student), ApiError> {
    let conn = ctx.core.open_db()?;
    let student = load_student(&conn, session)?;
    Ok((conn, student))
}
