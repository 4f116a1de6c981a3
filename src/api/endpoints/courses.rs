//! Syllabus upload.

use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, StudentContext};
use crate::db;
use crate::models::{course_name_from_file, Course, DEFAULT_COURSE_ICON};
use crate::pipeline::extraction::{extract_upload_text, truncate_chars, OUTLINE_MAX_CHARS};

#[derive(Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub course_id: String,
    pub course_name: String,
    /// Whether the refiner produced a cleaned-up outline.
    pub refined: bool,
}

/// `POST /api/upload_course`: multipart `file` field.
///
/// Extraction never fails: unreadable documents are stored with a failure
/// marker as their outline so the student still gets a course.
pub async fn upload_course(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<StudentContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Read error: {e}")))?;
            upload = Some((file_name, bytes));
            break;
        }
    }
    let Some((file_name, bytes)) = upload else {
        return Err(ApiError::BadRequest("No file uploaded".into()));
    };

    tracing::info!(
        username = %session.username,
        file_name = %file_name,
        size = bytes.len(),
        "Course upload received"
    );

    let core = ctx.core.clone();
    let course = tokio::task::spawn_blocking(move || {
        let text = extract_upload_text(&file_name, &bytes);
        let refined_text = core.ai().refine_syllabus(&text);

        let conn = core.open_db()?;
        let student = db::get_or_create_student(&conn, &session.username)?;
        let course = Course {
            id: uuid::Uuid::new_v4(),
            name: course_name_from_file(&file_name),
            icon: DEFAULT_COURSE_ICON.to_string(),
            outline_text: truncate_chars(&text, OUTLINE_MAX_CHARS).to_string(),
            refined_text,
            extracted_concepts: Vec::new(),
            owner_id: student.id,
            created_at: chrono::Utc::now().naive_utc(),
        };
        db::insert_course(&conn, &course)?;
        Ok::<_, ApiError>(course)
    })
    .await??;

    tracing::info!(
        course_id = %course.id,
        outline_chars = course.outline_text.chars().count(),
        refined = course.refined_text.is_some(),
        "Course saved"
    );

    Ok(Json(UploadResponse {
        status: "success",
        course_id: course.id.to_string(),
        refined: course.refined_text.is_some(),
        course_name: course.name,
    }))
}
