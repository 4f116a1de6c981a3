use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::endpoints::open_for_student;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, StudentContext};
use crate::db::{self, TASK_BATCH_SIZE};
use crate::models::enums::ThinkingType;

#[derive(Deserialize)]
pub struct ThinkingTypeRequest {
    pub thinking_type: Option<String>,
}

#[derive(Serialize)]
pub struct ThinkingTypeResponse {
    pub status: &'static str,
    pub thinking_type: ThinkingType,
}

#[derive(Serialize)]
pub struct ResultsResponse {
    pub status: &'static str,
    /// Completed tasks among the student's latest batch.
    pub carrots: usize,
    pub total_carrots: i64,
    pub completed_today: i64,
}

/// `POST /api/set_thinking_type`
pub async fn set_thinking_type(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<StudentContext>,
    ApiJson(req): ApiJson<ThinkingTypeRequest>,
) -> Result<Json<ThinkingTypeResponse>, ApiError> {
    let raw = req
        .thinking_type
        .ok_or_else(|| ApiError::BadRequest("thinking_type required".into()))?;
    let thinking_type: ThinkingType = raw
        .trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown thinking type: {raw}")))?;

    let (conn, student) = open_for_student(&ctx, &session)?;
    db::update_thinking_type(&conn, &student.id, thinking_type)?;
    tracing::info!(username = %session.username, %thinking_type, "Thinking type updated");

    Ok(Json(ThinkingTypeResponse {
        status: "success",
        thinking_type,
    }))
}

/// `GET /api/get_results`
pub async fn get_results(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<StudentContext>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let (conn, student) = open_for_student(&ctx, &session)?;
    let earned = db::latest_completed_tasks_for_owner(&conn, &student.id, TASK_BATCH_SIZE)?.len();
    let today = chrono::Utc::now().date_naive();
    let completed_today = db::get_study_stats(&conn, &student.id, today)?
        .map(|s| s.completed_count)
        .unwrap_or(0);

    Ok(Json(ResultsResponse {
        status: "success",
        carrots: earned,
        total_carrots: student.carrots,
        completed_today,
    }))
}
