use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::map_constraint;
use crate::db::{format_timestamp, parse_timestamp, parse_uuid, DatabaseError};
use crate::models::enums::ThinkingType;
use crate::models::Student;

const STUDENT_COLUMNS: &str = "id, username, thinking_type, carrots, created_at";

struct StudentRow {
    id: String,
    username: String,
    thinking_type: String,
    carrots: i64,
    created_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StudentRow> {
    Ok(StudentRow {
        id: row.get(0)?,
        username: row.get(1)?,
        thinking_type: row.get(2)?,
        carrots: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn student_from_row(row: StudentRow) -> Result<Student, DatabaseError> {
    Ok(Student {
        id: parse_uuid("user.id", &row.id)?,
        username: row.username,
        thinking_type: row.thinking_type.parse()?,
        carrots: row.carrots,
        created_at: parse_timestamp("user.created_at", &row.created_at)?,
    })
}

pub fn insert_student(conn: &Connection, student: &Student) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO user (id, username, thinking_type, carrots, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            student.id.to_string(),
            student.username,
            student.thinking_type.as_str(),
            student.carrots,
            format_timestamp(&student.created_at),
        ],
    )
    .map_err(|e| map_constraint(e, "Username exists"))?;
    Ok(())
}

pub fn get_student(conn: &Connection, id: &Uuid) -> Result<Option<Student>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {STUDENT_COLUMNS} FROM user WHERE id = ?1"),
            params![id.to_string()],
            read_row,
        )
        .optional()?;
    row.map(student_from_row).transpose()
}

pub fn get_student_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<Student>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {STUDENT_COLUMNS} FROM user WHERE username = ?1"),
            params![username],
            read_row,
        )
        .optional()?;
    row.map(student_from_row).transpose()
}

/// Fetch the student for `username`, creating a default one when missing.
pub fn get_or_create_student(conn: &Connection, username: &str) -> Result<Student, DatabaseError> {
    if let Some(student) = get_student_by_username(conn, username)? {
        return Ok(student);
    }
    let student = Student::new(username);
    insert_student(conn, &student)?;
    tracing::info!(username, "Created missing student record");
    Ok(student)
}

pub fn update_thinking_type(
    conn: &Connection,
    id: &Uuid,
    thinking_type: ThinkingType,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE user SET thinking_type = ?2 WHERE id = ?1",
        params![id.to_string(), thinking_type.as_str()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Student".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Add `delta` carrots (may be negative); the counter never drops below zero.
pub fn adjust_carrots(conn: &Connection, id: &Uuid, delta: i64) -> Result<i64, DatabaseError> {
    let rows = conn.execute(
        "UPDATE user SET carrots = MAX(0, carrots + ?2) WHERE id = ?1",
        params![id.to_string(), delta],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Student".into(),
            id: id.to_string(),
        });
    }
    let carrots = conn.query_row(
        "SELECT carrots FROM user WHERE id = ?1",
        params![id.to_string()],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(carrots)
}
