//! Registration, login and session endpoints.

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{
    cleared_session_cookie, session_cookie, session_token, ApiContext, ApiJson,
};
use crate::crypto::{hash_password, verify_password, CryptoError};
use crate::db;
use crate::models::enums::ThinkingType;
use crate::models::Account;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub major: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub status: &'static str,
    pub username: String,
    pub complaint: String,
    pub token: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub username: String,
    pub thinking_type: ThinkingType,
    pub token: String,
}

#[derive(Serialize)]
pub struct CheckAuthResponse {
    pub status: &'static str,
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_type: Option<ThinkingType>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Piggy's remark about a new student's major.
pub fn piggy_complaint(major: Option<&str>) -> String {
    let major = major.map(str::trim).filter(|m| !m.is_empty()).unwrap_or("mystery major");
    format!("Wow, {major}? Sounds tasty but tough!")
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

/// `POST /api/register`: create account and student, then log in.
pub async fn register(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Response, ApiError> {
    let (Some(username), Some(password)) = (required(req.username), required(req.password))
    else {
        return Err(ApiError::BadRequest("Username and password required".into()));
    };
    let username = username.trim().to_string();

    let core = ctx.core.clone();
    let name = username.clone();
    tokio::task::spawn_blocking(move || -> Result<(), ApiError> {
        let mut conn = core.open_db()?;
        if db::account_exists(&conn, &name)? {
            return Err(ApiError::Conflict("Username exists".into()));
        }
        let account = Account {
            username: name.clone(),
            password_hash: hash_password(&password, core.password_iterations()),
            created_at: chrono::Utc::now().naive_utc(),
        };

        let tx = conn.transaction()?;
        db::insert_account(&tx, &account)?;
        db::get_or_create_student(&tx, &name)?;
        tx.commit()?;
        Ok(())
    })
    .await??;

    let token = ctx.sessions()?.create(&username);
    tracing::info!(username = %username, "Student registered");

    let body = RegisterResponse {
        status: "success",
        complaint: piggy_complaint(req.major.as_deref()),
        username,
        token: token.clone(),
    };
    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Json(body),
    )
        .into_response())
}

/// `POST /api/login`: verify password, open a session.
pub async fn login(
    State(ctx): State<ApiContext>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(username), Some(password)) = (required(req.username), required(req.password))
    else {
        return Err(ApiError::InvalidCredentials);
    };
    let username = username.trim().to_string();

    let core = ctx.core.clone();
    let name = username.clone();
    let student = tokio::task::spawn_blocking(move || {
        let conn = core.open_db()?;
        let account = db::get_account(&conn, &name)?.ok_or(ApiError::InvalidCredentials)?;
        verify_password(&password, &account.password_hash).map_err(|e| match e {
            CryptoError::WrongPassword => ApiError::InvalidCredentials,
            CryptoError::MalformedHash => {
                ApiError::Internal(format!("stored password hash for {name} is malformed"))
            }
        })?;
        Ok::<_, ApiError>(db::get_or_create_student(&conn, &name)?)
    })
    .await??;

    let token = ctx.sessions()?.create(&username);
    tracing::info!(username = %username, "Student logged in");

    let body = LoginResponse {
        status: "success",
        username,
        thinking_type: student.thinking_type,
        token: token.clone(),
    };
    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Json(body),
    )
        .into_response())
}

/// `POST /api/logout`: drop the session if there is one.
pub async fn logout(State(ctx): State<ApiContext>, headers: HeaderMap) -> Result<Response, ApiError> {
    if let Some(token) = session_token(&headers) {
        ctx.sessions()?.revoke(&token);
    }
    Ok((
        AppendHeaders([(header::SET_COOKIE, cleared_session_cookie())]),
        Json(StatusResponse { status: "success" }),
    )
        .into_response())
}

/// `GET /api/check_auth`: report whether the request carries a live session.
pub async fn check_auth(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
) -> Result<Json<CheckAuthResponse>, ApiError> {
    let username = match session_token(&headers) {
        Some(token) => ctx.sessions()?.resolve(&token),
        None => None,
    };
    let Some(username) = username else {
        return Ok(Json(CheckAuthResponse {
            status: "success",
            is_authenticated: false,
            username: None,
            thinking_type: None,
        }));
    };

    let conn = ctx.core.open_db()?;
    let thinking_type = db::get_student_by_username(&conn, &username)?.map(|s| s.thinking_type);
    Ok(Json(CheckAuthResponse {
        status: "success",
        is_authenticated: true,
        username: Some(username),
        thinking_type,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complaint_mentions_major() {
        assert_eq!(
            piggy_complaint(Some("Physics")),
            "Wow, Physics? Sounds tasty but tough!"
        );
        assert_eq!(
            piggy_complaint(Some("  ")),
            "Wow, mystery major? Sounds tasty but tough!"
        );
        assert_eq!(piggy_complaint(None), "Wow, mystery major? Sounds tasty but tough!");
    }
}
