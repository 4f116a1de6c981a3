//! Study-task generation, lookup and completion.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::{load_student, open_for_student};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, StudentContext};
use crate::db::{self, TASK_BATCH_SIZE};
use crate::models::enums::TaskStatus;
use crate::models::{Student, Task};
use crate::pipeline::planner::{clamp_task_count, generate_study_plan};

#[derive(Deserialize, Default)]
pub struct GenerateRequest {
    pub count: Option<i64>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub status: &'static str,
    pub graph_id: String,
    pub task_ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct TaskQuery {
    pub id: Option<String>,
}

#[derive(Serialize)]
pub struct TaskDetails {
    pub id: String,
    pub content: String,
    pub status: TaskStatus,
    pub course_name: String,
    pub course_icon: String,
}

#[derive(Serialize)]
pub struct TaskDetailsResponse {
    pub status: &'static str,
    pub task: TaskDetails,
}

#[derive(Deserialize)]
pub struct CompleteRequest {
    pub task_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct CompleteResponse {
    pub status: &'static str,
    /// Every task in the course's latest batch is completed or skipped.
    pub all_done: bool,
}

fn parse_task_id(raw: Option<&str>) -> Result<Uuid, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::BadRequest("Task id required".into()))?;
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest("Invalid task id".into()))
}

/// The task, provided it belongs to `student`.
fn owned_task(conn: &Connection, student: &Student, id: &Uuid) -> Result<Task, ApiError> {
    db::get_task(conn, id)?
        .filter(|task| task.owner_id == student.id)
        .ok_or_else(|| ApiError::NotFound("Task not found".into()))
}

/// `POST /api/generate_tasks`: optional body `{"count": n}`.
pub async fn generate_tasks(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<StudentContext>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let req: GenerateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        GenerateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?
    };
    let count = clamp_task_count(req.count);

    let core = ctx.core.clone();
    let plan = tokio::task::spawn_blocking(move || {
        let mut conn = core.open_db()?;
        let student = load_student(&conn, &session)?;
        Ok::<_, ApiError>(generate_study_plan(&mut conn, core.ai(), &student, count)?)
    })
    .await??;

    Ok(Json(GenerateResponse {
        status: "success",
        graph_id: plan.graph_id.to_string(),
        task_ids: plan.task_ids.iter().map(Uuid::to_string).collect(),
    }))
}

/// `GET /api/get_task_details?id=`
pub async fn get_task_details(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<StudentContext>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<TaskDetailsResponse>, ApiError> {
    let id = parse_task_id(query.id.as_deref())?;
    let (conn, student) = open_for_student(&ctx, &session)?;
    let task = owned_task(&conn, &student, &id)?;
    let course = db::get_course(&conn, &task.course_id)?
        .ok_or_else(|| ApiError::NotFound("Course not found".into()))?;

    Ok(Json(TaskDetailsResponse {
        status: "success",
        task: TaskDetails {
            id: task.id.to_string(),
            content: task.content,
            status: task.status,
            course_name: course.name,
            course_icon: course.icon,
        },
    }))
}

/// `POST /api/complete_task`: `{"task_id": ..., "status": "completed" | "skipped" | "pending"}`.
///
/// Moving a task into or out of `completed` adjusts the student's carrots
/// and today's study stats in the same transaction.
pub async fn complete_task(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<StudentContext>,
    ApiJson(req): ApiJson<CompleteRequest>,
) -> Result<Json<CompleteResponse>, ApiError> {
    let id = parse_task_id(req.task_id.as_deref())?;
    let status = match req.status.as_deref().map(str::trim) {
        None | Some("") => TaskStatus::Completed,
        Some(raw) => raw
            .parse::<TaskStatus>()
            .map_err(|_| ApiError::BadRequest(format!("Unknown task status: {raw}")))?,
    };

    let (mut conn, student) = open_for_student(&ctx, &session)?;
    let tx = conn.transaction()?;
    let mut task = owned_task(&tx, &student, &id)?;
    let was_completed = task.is_completed;
    task.set_status(status);
    db::update_task_status(&tx, &task)?;

    let delta = match (was_completed, task.is_completed) {
        (false, true) => 1,
        (true, false) => -1,
        _ => 0,
    };
    if delta != 0 {
        db::record_completion(&tx, &student.id, chrono::Utc::now().date_naive(), delta)?;
        db::adjust_carrots(&tx, &student.id, delta)?;
    }

    let batch = db::latest_tasks_for_course(&tx, &task.course_id, TASK_BATCH_SIZE)?;
    let all_done = batch.iter().all(|t| t.status.is_settled());
    tx.commit()?;

    tracing::info!(task_id = %task.id, status = %task.status, all_done, "Task status updated");
    Ok(Json(CompleteResponse {
        status: "success",
        all_done,
    }))
}
