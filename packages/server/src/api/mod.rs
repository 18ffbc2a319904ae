use axum::{routing::get, Router};

use kiln_storage::DbState;

pub mod health;

/// Assembles the full application router over shared database state
pub fn create_router(state: DbState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/status", get(health::status_check))
        .nest(
            "/api/document-templates",
            kiln_api::create_templates_router(),
        )
        .with_state(state)
}
