use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::endpoints::open_for_student;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, StudentContext};
use crate::db::{self, TASK_BATCH_SIZE};
use crate::models::enums::{TaskStatus, ThinkingType};
use crate::models::GraphRecord;

#[derive(Serialize)]
pub struct DashboardCourse {
    pub id: String,
    pub name: String,
    pub icon: String,
}

#[derive(Serialize, Default)]
pub struct DashboardGraph {
    pub nodes: Vec<GraphRecord>,
    pub edges: Vec<GraphRecord>,
}

#[derive(Serialize)]
pub struct DashboardTask {
    pub id: String,
    pub content: String,
    pub status: TaskStatus,
    pub is_completed: bool,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub status: &'static str,
    pub thinking_type: ThinkingType,
    pub course: DashboardCourse,
    pub graph: DashboardGraph,
    pub tasks: Vec<DashboardTask>,
}

/// `GET /api/get_dashboard_data`: latest course, its newest graph and task batch.
pub async fn get_dashboard_data(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<StudentContext>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let (conn, student) = open_for_student(&ctx, &session)?;
    let course = db::latest_course_for_owner(&conn, &student.id)?
        .ok_or_else(|| ApiError::NotFound("No course".into()))?;

    let graph = db::latest_graph_for_course(&conn, &course.id)?
        .map(|g| DashboardGraph {
            nodes: g.nodes,
            edges: g.edges,
        })
        .unwrap_or_default();

    let tasks = db::latest_tasks_for_course(&conn, &course.id, TASK_BATCH_SIZE)?
        .into_iter()
        .map(|t| DashboardTask {
            id: t.id.to_string(),
            content: t.content,
            status: t.status,
            is_completed: t.is_completed,
        })
        .collect();

    Ok(Json(DashboardResponse {
        status: "success",
        thinking_type: student.thinking_type,
        course: DashboardCourse {
            id: course.id.to_string(),
            name: course.name,
            icon: course.icon,
        },
        graph,
        tasks,
    }))
}
