// ABOUTME: HTTP API layer for Kiln providing REST endpoints and routing
// ABOUTME: Integration layer that depends on the numbering and storage packages

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use kiln_storage::DbState;

pub mod pagination;
pub mod response;
pub mod template_handlers;

/// Creates the document templates API router
pub fn create_templates_router() -> Router<DbState> {
    Router::new()
        .route("/", get(template_handlers::list_templates))
        .route("/", post(template_handlers::create_template))
        .route("/{id}", get(template_handlers::get_template))
        .route("/{id}", put(template_handlers::update_template))
        .route("/{id}", delete(template_handlers::delete_template))
        // Numbering operations
        .route("/{id}/generate", post(template_handlers::generate_number))
        .route(
            "/{id}/increment",
            post(template_handlers::increment_sequence),
        )
        .route("/{id}/reset", post(template_handlers::reset_sequence))
        .route("/{id}/reserve", post(template_handlers::reserve_number))
        .route("/{id}/commit", post(template_handlers::commit_reservation))
}
