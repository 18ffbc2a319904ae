// ABOUTME: Error taxonomy for document number generation
// ABOUTME: Every failure is surfaced to the caller; nothing here panics

use thiserror::Error;

use crate::token::FormatError;

/// Numbering errors
#[derive(Error, Debug)]
pub enum NumberingError {
    #[error("Document template not found")]
    TemplateNotFound,
    #[error("Invalid number format: {0}")]
    InvalidFormat(#[from] FormatError),
    #[error("Sequence counter was modified concurrently")]
    ConcurrentModification,
    #[error("Reservation is stale: sequence {0} is no longer next")]
    StaleReservation(i64),
    #[error("{field}: {message}")]
    Validation { field: String, message: String },
    #[error("Storage error: {0}")]
    Storage(String),
}

impl NumberingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        NumberingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type NumberingResult<T> = Result<T, NumberingError>;
