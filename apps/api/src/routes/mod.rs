pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/keywords", get(handlers::handle_keywords))
        .route("/api/v1/auth/login", post(handlers::handle_login))
        .route("/api/v1/auth/me", get(handlers::handle_me))
        // Editing sessions
        .route(
            "/api/v1/sessions/:user_id",
            get(handlers::handle_open_session),
        )
        .route(
            "/api/v1/sessions/:user_id/fields",
            patch(handlers::handle_update_field),
        )
        .route(
            "/api/v1/sessions/:user_id/sections/:section",
            post(handlers::handle_add_item),
        )
        .route(
            "/api/v1/sessions/:user_id/sections/:section/:index",
            delete(handlers::handle_remove_item),
        )
        .route(
            "/api/v1/sessions/:user_id/job-description",
            put(handlers::handle_set_job_description),
        )
        .route(
            "/api/v1/sessions/:user_id/keywords/toggle",
            post(handlers::handle_toggle_keyword),
        )
        // Analysis
        .route(
            "/api/v1/sessions/:user_id/analyze",
            post(handlers::handle_analyze),
        )
        .route(
            "/api/v1/sessions/:user_id/analysis",
            get(handlers::handle_latest_analysis),
        )
        .route(
            "/api/v1/sessions/:user_id/validation",
            get(handlers::handle_validation),
        )
        // Persistence, optimization and export
        .route("/api/v1/sessions/:user_id/save", post(handlers::handle_save))
        .route(
            "/api/v1/sessions/:user_id/optimize",
            post(handlers::handle_optimize),
        )
        .route(
            "/api/v1/sessions/:user_id/export/json",
            get(handlers::handle_export_json),
        )
        .with_state(state)
}
