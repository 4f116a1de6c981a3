use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::{format_timestamp, parse_timestamp, parse_uuid, DatabaseError};
use crate::models::Task;

/// Size of the batch shown on the dashboard and checked for completion.
pub const TASK_BATCH_SIZE: usize = 5;

const TASK_COLUMNS: &str = "id, content, status, course_id, owner_id, date, is_completed";

struct TaskRow {
    id: String,
    content: String,
    status: String,
    course_id: String,
    owner_id: String,
    date: String,
    is_completed: bool,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        content: row.get(1)?,
        status: row.get(2)?,
        course_id: row.get(3)?,
        owner_id: row.get(4)?,
        date: row.get(5)?,
        is_completed: row.get(6)?,
    })
}

fn task_from_row(row: TaskRow) -> Result<Task, DatabaseError> {
    Ok(Task {
        id: parse_uuid("task.id", &row.id)?,
        content: row.content,
        status: row.status.parse()?,
        course_id: parse_uuid("task.course_id", &row.course_id)?,
        owner_id: parse_uuid("task.owner_id", &row.owner_id)?,
        date: parse_timestamp("task.date", &row.date)?,
        is_completed: row.is_completed,
    })
}

fn collect_tasks(
    rows: impl Iterator<Item = rusqlite::Result<TaskRow>>,
) -> Result<Vec<Task>, DatabaseError> {
    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(task_from_row(row?)?);
    }
    Ok(tasks)
}

pub fn insert_task(conn: &Connection, task: &Task) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO task (id, content, status, course_id, owner_id, date, is_completed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            task.id.to_string(),
            task.content,
            task.status.as_str(),
            task.course_id.to_string(),
            task.owner_id.to_string(),
            format_timestamp(&task.date),
            task.is_completed,
        ],
    )?;
    Ok(())
}

pub fn get_task(conn: &Connection, id: &Uuid) -> Result<Option<Task>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM task WHERE id = ?1"),
            params![id.to_string()],
            read_row,
        )
        .optional()?;
    row.map(task_from_row).transpose()
}

/// Persist `status` and `is_completed` for an existing task.
pub fn update_task_status(conn: &Connection, task: &Task) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE task SET status = ?2, is_completed = ?3 WHERE id = ?1",
        params![task.id.to_string(), task.status.as_str(), task.is_completed],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Task".into(),
            id: task.id.to_string(),
        });
    }
    Ok(())
}

/// Newest `limit` tasks of a course.
pub fn latest_tasks_for_course(
    conn: &Connection,
    course_id: &Uuid,
    limit: usize,
) -> Result<Vec<Task>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM task WHERE course_id = ?1
         ORDER BY date DESC, rowid DESC LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![course_id.to_string(), limit as i64], read_row)?;
    collect_tasks(rows)
}

/// Newest `limit` completed tasks across all of a student's courses.
pub fn latest_completed_tasks_for_owner(
    conn: &Connection,
    owner_id: &Uuid,
    limit: usize,
) -> Result<Vec<Task>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM task WHERE owner_id = ?1 AND is_completed = 1
         ORDER BY date DESC, rowid DESC LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![owner_id.to_string(), limit as i64], read_row)?;
    collect_tasks(rows)
}
