// ABOUTME: SQLite implementation of template persistence
// ABOUTME: CRUD, filtered listing, and the conditional update backing sequence increments

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use kiln_core::{
    DocumentTemplate, DocumentType, ResetPolicy, TemplateCreateInput, TemplateUpdateInput,
};
use kiln_numbering::{NumberingError, TemplateStore};

use super::{generate_template_id, StorageError, StorageResult, TemplateFilter};

/// SQLite-backed store for document templates
pub struct SqliteTemplateStore {
    pool: SqlitePool,
}

impl SqliteTemplateStore {
    /// Create a new store over an existing connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run migrations and post-migration optimizations
    pub async fn initialize(&self) -> StorageResult<()> {
        info!("Initializing template storage with migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;

        sqlx::query("ANALYZE")
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        Ok(())
    }

    /// Convert a database row to a DocumentTemplate
    fn row_to_template(&self, row: &SqliteRow) -> StorageResult<DocumentTemplate> {
        let document_type_str: String = row.try_get("document_type")?;
        let document_type = document_type_str
            .parse::<DocumentType>()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let reset_policy_str: String = row.try_get("reset_policy")?;
        let reset_policy = reset_policy_str
            .parse::<ResetPolicy>()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let created_at_str: String = row.try_get("created_at")?;
        let updated_at_str: String = row.try_get("updated_at")?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|_| StorageError::Database("Invalid created_at timestamp".to_string()))?
            .with_timezone(&Utc);

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map_err(|_| StorageError::Database("Invalid updated_at timestamp".to_string()))?
            .with_timezone(&Utc);

        Ok(DocumentTemplate {
            id: row.try_get("id")?,
            company_id: row.try_get("company_id")?,
            document_type,
            format: row.try_get("format")?,
            last_number: row.try_get("last_number")?,
            reset_policy,
            created_at,
            updated_at,
        })
    }

    /// Create a new template; the (company, document type) pair must be unique
    pub async fn create_template(
        &self,
        input: TemplateCreateInput,
    ) -> StorageResult<DocumentTemplate> {
        let id = generate_template_id();
        let now = Utc::now();
        let last_number = input.last_number.unwrap_or(0);
        let reset_policy = input.reset_policy.unwrap_or(ResetPolicy::None);

        let result = sqlx::query(
            r#"
            INSERT INTO document_templates
                (id, company_id, document_type, format, last_number, reset_policy, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.company_id)
        .bind(input.document_type.as_str())
        .bind(&input.format)
        .bind(last_number)
        .bind(reset_policy.as_str())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                debug!(template_id = %id, "created document template");
                self.get_template(&id).await
            }
            Err(e) => {
                let unique_violation = e
                    .as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false);

                if unique_violation {
                    Err(StorageError::DuplicateTemplate {
                        company_id: input.company_id,
                        document_type: input.document_type.as_str().to_string(),
                    })
                } else {
                    Err(StorageError::Sqlx(e))
                }
            }
        }
    }

    /// Get a template by ID
    pub async fn get_template(&self, id: &str) -> StorageResult<DocumentTemplate> {
        let row = sqlx::query("SELECT * FROM document_templates WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.row_to_template(&row),
            None => Err(StorageError::NotFound),
        }
    }

    /// List templates matching the filter, returning (page, total count)
    pub async fn list_templates(
        &self,
        filter: TemplateFilter,
    ) -> StorageResult<(Vec<DocumentTemplate>, i64)> {
        let mut conditions = String::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(ref company_id) = filter.company_id {
            conditions.push_str(" AND company_id = ?");
            binds.push(company_id.clone());
        }

        if let Some(document_type) = filter.document_type {
            conditions.push_str(" AND document_type = ?");
            binds.push(document_type.as_str().to_string());
        }

        if let Some(ref keyword) = filter.keyword {
            let keyword = keyword.trim();
            if !keyword.is_empty() {
                conditions.push_str(" AND (format LIKE ? OR document_type LIKE ?)");
                let pattern = format!("%{}%", keyword);
                binds.push(pattern.clone());
                binds.push(pattern);
            }
        }

        let count_sql = format!(
            "SELECT COUNT(*) FROM document_templates WHERE 1=1{}",
            conditions
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in &binds {
            count_query = count_query.bind(bind);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let mut select_sql = format!(
            "SELECT * FROM document_templates WHERE 1=1{} ORDER BY company_id, document_type",
            conditions
        );
        if let Some(limit) = filter.limit {
            select_sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = filter.offset {
            select_sql.push_str(&format!(" OFFSET {}", offset));
        }

        let mut query = sqlx::query(&select_sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let templates = rows
            .iter()
            .map(|row| self.row_to_template(row))
            .collect::<StorageResult<Vec<_>>>()?;

        Ok((templates, total))
    }

    /// Update template fields; absent fields are left unchanged
    pub async fn update_template(
        &self,
        id: &str,
        input: TemplateUpdateInput,
    ) -> StorageResult<DocumentTemplate> {
        // Ensure the template exists before touching individual fields
        self.get_template(id).await?;

        if let Some(ref format) = input.format {
            sqlx::query("UPDATE document_templates SET format = ? WHERE id = ?")
                .bind(format)
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        if let Some(last_number) = input.last_number {
            sqlx::query("UPDATE document_templates SET last_number = ? WHERE id = ?")
                .bind(last_number)
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        if let Some(reset_policy) = input.reset_policy {
            sqlx::query("UPDATE document_templates SET reset_policy = ? WHERE id = ?")
                .bind(reset_policy.as_str())
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        sqlx::query("UPDATE document_templates SET updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.get_template(id).await
    }

    /// Delete a template; already-issued document numbers are unaffected
    pub async fn delete_template(&self, id: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM document_templates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        debug!(template_id = %id, "deleted document template");
        Ok(())
    }

    /// Conditionally advance the sequence counter.
    ///
    /// The single conditional UPDATE is what makes concurrent increments
    /// linearizable: two callers observing the same `last_number` cannot
    /// both match the WHERE clause.
    pub async fn try_swap_last_number(
        &self,
        id: &str,
        expected: i64,
        next: i64,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            "UPDATE document_templates SET last_number = ?, updated_at = ? WHERE id = ? AND last_number = ?",
        )
        .bind(next)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Unconditionally reset the sequence counter to 0
    pub async fn reset_sequence(&self, id: &str) -> StorageResult<()> {
        let result = sqlx::query(
            "UPDATE document_templates SET last_number = 0, updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

fn into_numbering_error(error: StorageError) -> NumberingError {
    match error {
        StorageError::NotFound => NumberingError::TemplateNotFound,
        other => NumberingError::Storage(other.to_string()),
    }
}

#[async_trait]
impl TemplateStore for SqliteTemplateStore {
    async fn load(&self, template_id: &str) -> Result<DocumentTemplate, NumberingError> {
        self.get_template(template_id)
            .await
            .map_err(into_numbering_error)
    }

    async fn compare_and_swap_last_number(
        &self,
        template_id: &str,
        expected: i64,
        next: i64,
    ) -> Result<bool, NumberingError> {
        let swapped = self
            .try_swap_last_number(template_id, expected, next)
            .await
            .map_err(into_numbering_error)?;

        if !swapped {
            // Distinguish a lost swap from a template that vanished
            self.get_template(template_id)
                .await
                .map_err(into_numbering_error)?;
        }

        Ok(swapped)
    }

    async fn reset_last_number(&self, template_id: &str) -> Result<(), NumberingError> {
        self.reset_sequence(template_id)
            .await
            .map_err(into_numbering_error)
    }
}
