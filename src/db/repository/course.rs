use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::{format_timestamp, parse_timestamp, parse_uuid, DatabaseError};
use crate::models::Course;

const COURSE_COLUMNS: &str =
    "id, name, icon, outline_text, refined_text, extracted_concepts, owner_id, created_at";

struct CourseRow {
    id: String,
    name: String,
    icon: String,
    outline_text: String,
    refined_text: Option<String>,
    extracted_concepts: String,
    owner_id: String,
    created_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CourseRow> {
    Ok(CourseRow {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        outline_text: row.get(3)?,
        refined_text: row.get(4)?,
        extracted_concepts: row.get(5)?,
        owner_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn course_from_row(row: CourseRow) -> Result<Course, DatabaseError> {
    let extracted_concepts: Vec<String> =
        serde_json::from_str(&row.extracted_concepts).map_err(|e| DatabaseError::CorruptColumn {
            column: "course.extracted_concepts",
            reason: e.to_string(),
        })?;

    Ok(Course {
        id: parse_uuid("course.id", &row.id)?,
        name: row.name,
        icon: row.icon,
        outline_text: row.outline_text,
        refined_text: row.refined_text,
        extracted_concepts,
        owner_id: parse_uuid("course.owner_id", &row.owner_id)?,
        created_at: parse_timestamp("course.created_at", &row.created_at)?,
    })
}

fn concepts_json(concepts: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(concepts).map_err(|e| DatabaseError::CorruptColumn {
        column: "course.extracted_concepts",
        reason: e.to_string(),
    })
}

pub fn insert_course(conn: &Connection, course: &Course) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO course (id, name, icon, outline_text, refined_text, extracted_concepts,
         owner_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            course.id.to_string(),
            course.name,
            course.icon,
            course.outline_text,
            course.refined_text,
            concepts_json(&course.extracted_concepts)?,
            course.owner_id.to_string(),
            format_timestamp(&course.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_course(conn: &Connection, id: &Uuid) -> Result<Option<Course>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {COURSE_COLUMNS} FROM course WHERE id = ?1"),
            params![id.to_string()],
            read_row,
        )
        .optional()?;
    row.map(course_from_row).transpose()
}

/// Most recently uploaded course for a student.
pub fn latest_course_for_owner(
    conn: &Connection,
    owner_id: &Uuid,
) -> Result<Option<Course>, DatabaseError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {COURSE_COLUMNS} FROM course WHERE owner_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT 1"
            ),
            params![owner_id.to_string()],
            read_row,
        )
        .optional()?;
    row.map(course_from_row).transpose()
}

/// A student's other courses that already carry extracted concepts, oldest first.
pub fn list_other_courses_with_concepts(
    conn: &Connection,
    owner_id: &Uuid,
    exclude: &Uuid,
) -> Result<Vec<Course>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COURSE_COLUMNS} FROM course
         WHERE owner_id = ?1 AND id != ?2 AND extracted_concepts != '[]'
         ORDER BY created_at ASC, rowid ASC"
    ))?;
    let rows = stmt.query_map(params![owner_id.to_string(), exclude.to_string()], read_row)?;

    let mut courses = Vec::new();
    for row in rows {
        let course = course_from_row(row?)?;
        if !course.extracted_concepts.is_empty() {
            courses.push(course);
        }
    }
    Ok(courses)
}

pub fn update_course_concepts(
    conn: &Connection,
    id: &Uuid,
    concepts: &[String],
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE course SET extracted_concepts = ?2 WHERE id = ?1",
        params![id.to_string(), concepts_json(concepts)?],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Course".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::fixtures;

    #[test]
    fn insert_and_fetch_round_trip() {
        let conn = open_memory_database().unwrap();
        let owner = fixtures::student(&conn, "ari");
        let course = fixtures::course(&conn, &owner, "Chemistry");

        let fetched = get_course(&conn, &course.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Chemistry");
        assert_eq!(fetched.icon, "dumpling");
        assert!(fetched.refined_text.is_none());
        assert!(fetched.extracted_concepts.is_empty());
    }

    #[test]
    fn latest_course_uses_creation_order() {
        let conn = open_memory_database().unwrap();
        let owner = fixtures::student(&conn, "ari");
        fixtures::course(&conn, &owner, "First");
        let second = fixtures::course(&conn, &owner, "Second");

        let latest = latest_course_for_owner(&conn, &owner.id).unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[test]
    fn latest_course_scoped_to_owner() {
        let conn = open_memory_database().unwrap();
        let owner = fixtures::student(&conn, "ari");
        let other = fixtures::student(&conn, "bo");
        fixtures::course(&conn, &other, "Theirs");
        assert!(latest_course_for_owner(&conn, &owner.id).unwrap().is_none());
    }

    #[test]
    fn concepts_attach_once_and_filter_other_courses() {
        let conn = open_memory_database().unwrap();
        let owner = fixtures::student(&conn, "ari");
        let old = fixtures::course(&conn, &owner, "Biology");
        let bare = fixtures::course(&conn, &owner, "History");
        let current = fixtures::course(&conn, &owner, "Chemistry");

        update_course_concepts(&conn, &old.id, &["Cell".into(), "Enzyme".into()]).unwrap();
        update_course_concepts(&conn, &current.id, &["Reaction".into()]).unwrap();

        let others = list_other_courses_with_concepts(&conn, &owner.id, &current.id).unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].id, old.id);
        assert_eq!(others[0].extracted_concepts, vec!["Cell", "Enzyme"]);
        assert!(others.iter().all(|c| c.id != bare.id));
    }

    #[test]
    fn update_concepts_unknown_course() {
        let conn = open_memory_database().unwrap();
        let err = update_course_concepts(&conn, &Uuid::new_v4(), &[]).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
