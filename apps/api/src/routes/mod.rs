pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::ideas::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ideas API
        .route("/api/v1/ideas", get(handlers::handle_list_ideas))
        .route("/api/v1/ideas/generate", post(handlers::handle_generate))
        .route(
            "/api/v1/ideas/:id/feedback",
            put(handlers::handle_set_feedback),
        )
        .route(
            "/api/v1/ideas/:id/regenerate",
            post(handlers::handle_regenerate),
        )
        .route("/api/v1/ideas/:id/copy", post(handlers::handle_copy))
        // Profile API
        .route("/api/v1/profile", get(handlers::handle_get_profile))
        .with_state(state)
}
