// ABOUTME: Shared API response types and error mapping
// ABOUTME: Provides consistent response format across all API endpoints

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use kiln_numbering::NumberingError;
use kiln_storage::StorageError;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// 200 with the value, or the storage error's HTTP mapping
pub fn storage_result<T: Serialize>(result: Result<T, StorageError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, ResponseJson(ApiResponse::success(value))).into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// 201 with the value, or the storage error's HTTP mapping
pub fn storage_created<T: Serialize>(result: Result<T, StorageError>) -> Response {
    match result {
        Ok(value) => (
            StatusCode::CREATED,
            ResponseJson(ApiResponse::success(value)),
        )
            .into_response(),
        Err(e) => storage_error_response(e),
    }
}

/// 200 with the value, or the numbering error's HTTP mapping
pub fn numbering_result<T: Serialize>(result: Result<T, NumberingError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, ResponseJson(ApiResponse::success(value))).into_response(),
        Err(e) => numbering_error_response(e),
    }
}

/// 400 with a logged context message
pub fn bad_request<E: std::fmt::Display>(error: E, context: &str) -> Response {
    warn!("{}: {}", context, error);
    (
        StatusCode::BAD_REQUEST,
        ResponseJson(ApiResponse::<()>::error(error.to_string())),
    )
        .into_response()
}

/// Convert storage errors to HTTP responses
fn storage_error_response(error: StorageError) -> Response {
    let (status, message) = match &error {
        StorageError::NotFound => (StatusCode::NOT_FOUND, error.to_string()),
        StorageError::DuplicateTemplate { .. } => (StatusCode::CONFLICT, error.to_string()),
        _ => {
            error!("storage failure: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            )
        }
    };

    (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
}

/// Convert numbering errors to HTTP responses
fn numbering_error_response(error: NumberingError) -> Response {
    let (status, message) = match &error {
        NumberingError::TemplateNotFound => (StatusCode::NOT_FOUND, error.to_string()),
        NumberingError::InvalidFormat(_) | NumberingError::Validation { .. } => {
            (StatusCode::BAD_REQUEST, error.to_string())
        }
        // Transient: the caller may simply try again
        NumberingError::ConcurrentModification | NumberingError::StaleReservation(_) => {
            (StatusCode::CONFLICT, error.to_string())
        }
        NumberingError::Storage(_) => {
            error!("numbering storage failure: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
}
