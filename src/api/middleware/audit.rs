//! Request audit logging. Runs innermost, after auth has injected
//! `StudentContext`, so the user is known on protected routes.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::StudentContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let user = req
        .extensions()
        .get::<StudentContext>()
        .map(|s| s.username.clone());

    let started = std::time::Instant::now();
    let response = next.run(req).await;

    tracing::info!(
        target: "piggychef::audit",
        %method,
        path = %path,
        user = user.as_deref().unwrap_or("-"),
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "API access"
    );
    response
}
