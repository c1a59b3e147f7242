//! Router assembly

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::{Any, AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{avatar, documents, students};
use crate::state::AppState;

// Multipart framing overhead on top of the per-file cap; individual files
// are still limited to max_upload_bytes by validation.
const BODY_LIMIT_FILES: usize = 12;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes * BODY_LIMIT_FILES;

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/students",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/api/students/{id}",
            put(students::update_student).delete(students::delete_student),
        )
        .route("/api/students/{id}/files", post(documents::add_files))
        .route("/api/students/{id}/avatar", post(avatar::replace_avatar))
        .route(
            "/api/documents/{id}",
            post(documents::replace_file).delete(documents::delete_file),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
