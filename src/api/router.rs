//! HTTP router for the `/api` surface.
//!
//! Middleware stack (outermost → innermost):
//! 1. Trace layer → 2. Context extension → 3. Auth (protected routes only) → 4. Audit logger

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the API router with all endpoints under `/api/`.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

/// Build router from a pre-constructed `ApiContext`, so tests can reach
/// the session store directly.
#[cfg(test)]
pub(crate) fn api_router_with_ctx(ctx: ApiContext) -> Router {
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    let upload_limit = DefaultBodyLimit::max(ctx.core.max_upload_bytes() + MULTIPART_OVERHEAD);

    // Layers apply bottom-up: Extension must be outermost so the auth
    // middleware can extract ApiContext.
    let protected = Router::new()
        .route(
            "/upload_course",
            post(endpoints::courses::upload_course).layer(upload_limit),
        )
        .route(
            "/set_thinking_type",
            post(endpoints::students::set_thinking_type),
        )
        .route("/generate_tasks", post(endpoints::tasks::generate_tasks))
        .route("/get_task_details", get(endpoints::tasks::get_task_details))
        .route(
            "/get_dashboard_data",
            get(endpoints::dashboard::get_dashboard_data),
        )
        .route("/complete_task", post(endpoints::tasks::complete_task))
        .route("/get_results", get(endpoints::students::get_results))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/register", post(endpoints::auth::register))
        .route("/login", post(endpoints::auth::login))
        .route("/logout", post(endpoints::auth::logout))
        .route("/check_auth", get(endpoints::auth::check_auth))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected.merge(public))
        .layer(TraceLayer::new_for_http())
}
