use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{Graph, Student, Task};
use crate::pipeline::graph::{
    merge_cross_links, normalize_edges, normalize_nodes, placeholder_graph, placeholder_tasks,
};
use crate::pipeline::llm::{CourseAi, CourseConcepts};

pub const DEFAULT_TASK_COUNT: usize = 3;
pub const MAX_TASK_COUNT: usize = 20;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("No course found")]
    NoCourse,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for PlanError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.into())
    }
}

/// Identifiers of what one generation run persisted.
#[derive(Debug, Clone)]
pub struct StudyPlan {
    pub graph_id: Uuid,
    pub task_ids: Vec<Uuid>,
}

/// Requested task count, defaulted and clamped to `1..=MAX_TASK_COUNT`.
pub fn clamp_task_count(requested: Option<i64>) -> usize {
    match requested {
        None => DEFAULT_TASK_COUNT,
        Some(n) => n.clamp(1, MAX_TASK_COUNT as i64) as usize,
    }
}

/// Build a graph and a task batch for the student's latest course.
///
/// Runs the model calls in sequence (structure, cross-links, tasks) and
/// falls back to placeholder content for anything the model did not supply.
/// Tasks and the graph are written in one transaction.
pub fn generate_study_plan(
    conn: &mut Connection,
    ai: &CourseAi,
    student: &Student,
    count: usize,
) -> Result<StudyPlan, PlanError> {
    let course = db::latest_course_for_owner(conn, &student.id)?.ok_or(PlanError::NoCourse)?;
    tracing::info!(
        course_id = %course.id,
        thinking_type = %student.thinking_type,
        refined = course.refined_text.is_some(),
        "Generating study plan"
    );

    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut contents = Vec::new();

    if let Some(structure) =
        ai.extract_course_structure(course.analysis_source(), student.thinking_type)
    {
        nodes = normalize_nodes(structure.nodes);
        edges = normalize_edges(structure.edges);
        db::update_course_concepts(conn, &course.id, &structure.concepts)?;

        let others: Vec<CourseConcepts> =
            db::list_other_courses_with_concepts(conn, &student.id, &course.id)?
                .into_iter()
                .map(|c| CourseConcepts {
                    name: c.name,
                    concepts: c.extracted_concepts,
                })
                .collect();
        if !others.is_empty() {
            let links = ai.find_cross_connections(&course.name, &structure.concepts, &others);
            merge_cross_links(&mut nodes, &mut edges, &links);
        }

        contents = ai
            .generate_smart_tasks(&course.name, &nodes, count)
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    } else {
        tracing::warn!(course_id = %course.id, "No structure from model, using placeholders");
    }

    if contents.is_empty() {
        contents = placeholder_tasks(&course.name, count);
    }
    if nodes.is_empty() {
        (nodes, edges) = placeholder_graph(&course.name);
    }

    let tasks: Vec<Task> = contents
        .iter()
        .map(|content| Task::pending(content, course.id, student.id))
        .collect();
    let graph = Graph {
        id: Uuid::new_v4(),
        course_id: course.id,
        owner_id: student.id,
        nodes,
        edges,
        created_at: chrono::Utc::now().naive_utc(),
    };

    let tx = conn.transaction()?;
    for task in &tasks {
        db::insert_task(&tx, task)?;
    }
    db::insert_graph(&tx, &graph)?;
    tx.commit()?;

    tracing::info!(
        course_id = %course.id,
        graph_id = %graph.id,
        tasks = tasks.len(),
        nodes = graph.nodes.len(),
        "Study plan saved"
    );

    Ok(StudyPlan {
        graph_id: graph.id,
        task_ids: tasks.iter().map(|t| t.id).collect(),
    })
}
