// ABOUTME: Data layer and persistence for Kiln document numbering
// ABOUTME: SQLite-backed template store plus shared database state

use thiserror::Error;

// Re-export modules
pub mod db;
pub mod sqlite;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Document template not found")]
    NotFound,
    #[error("A {document_type} template already exists for company {company_id}")]
    DuplicateTemplate {
        company_id: String,
        document_type: String,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Filter for querying document templates
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub company_id: Option<String>,
    pub document_type: Option<kiln_core::DocumentType>,
    pub keyword: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Generate a unique template ID
pub fn generate_template_id() -> String {
    use uuid::Uuid;
    Uuid::new_v4().to_string()
}

// Re-export main types
pub use db::DbState;
pub use sqlite::SqliteTemplateStore;
