use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::{format_timestamp, parse_timestamp, parse_uuid, DatabaseError};
use crate::models::{Graph, GraphRecord};

fn records_json(column: &'static str, records: &[GraphRecord]) -> Result<String, DatabaseError> {
    serde_json::to_string(records).map_err(|e| DatabaseError::CorruptColumn {
        column,
        reason: e.to_string(),
    })
}

fn records_from_json(column: &'static str, raw: &str) -> Result<Vec<GraphRecord>, DatabaseError> {
    serde_json::from_str(raw).map_err(|e| DatabaseError::CorruptColumn {
        column,
        reason: e.to_string(),
    })
}

pub fn insert_graph(conn: &Connection, graph: &Graph) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO graph (id, course_id, owner_id, nodes, edges, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            graph.id.to_string(),
            graph.course_id.to_string(),
            graph.owner_id.to_string(),
            records_json("graph.nodes", &graph.nodes)?,
            records_json("graph.edges", &graph.edges)?,
            format_timestamp(&graph.created_at),
        ],
    )?;
    Ok(())
}

/// Most recent graph generated for a course.
pub fn latest_graph_for_course(
    conn: &Connection,
    course_id: &Uuid,
) -> Result<Option<Graph>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, course_id, owner_id, nodes, edges, created_at FROM graph
             WHERE course_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
            params![course_id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    row.map(|(id, course_id, owner_id, nodes, edges, created_at)| {
        Ok(Graph {
            id: parse_uuid("graph.id", &id)?,
            course_id: parse_uuid("graph.course_id", &course_id)?,
            owner_id: parse_uuid("graph.owner_id", &owner_id)?,
            nodes: records_from_json("graph.nodes", &nodes)?,
            edges: records_from_json("graph.edges", &edges)?,
            created_at: parse_timestamp("graph.created_at", &created_at)?,
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::fixtures;
    use serde_json::json;

    fn record(value: serde_json::Value) -> GraphRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn latest_graph_returns_newest() {
        let conn = open_memory_database().unwrap();
        let owner = fixtures::student(&conn, "ari");
        let course = fixtures::course(&conn, &owner, "Optics");

        for label in ["old", "new"] {
            insert_graph(
                &conn,
                &Graph {
                    id: Uuid::new_v4(),
                    course_id: course.id,
                    owner_id: owner.id,
                    nodes: vec![record(json!({"id": "1", "label": label}))],
                    edges: vec![record(json!({"from": "1", "to": "1", "dashes": true}))],
                    created_at: chrono::Utc::now().naive_utc(),
                },
            )
            .unwrap();
        }

        let graph = latest_graph_for_course(&conn, &course.id).unwrap().unwrap();
        assert_eq!(graph.nodes[0]["label"], "new");
        assert_eq!(graph.edges[0]["dashes"], true);
    }

    #[test]
    fn no_graph_yet() {
        let conn = open_memory_database().unwrap();
        let owner = fixtures::student(&conn, "ari");
        let course = fixtures::course(&conn, &owner, "Optics");
        assert!(latest_graph_for_course(&conn, &course.id).unwrap().is_none());
    }
}
