// ABOUTME: HTTP request handlers for document numbering templates
// ABOUTME: CRUD plus the preview/increment/reset/reserve/commit operations

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use kiln_core::{
    validate_template_data, validate_template_update, DocumentType, GenerationContext,
    TemplateCreateInput, TemplateUpdateInput, ValidationError,
};
use kiln_numbering::{validate_format, NumberReservation};
use kiln_storage::{DbState, TemplateFilter};

use super::pagination::{PaginatedResponse, PaginationParams, DEFAULT_PAGE_SIZE};
use super::response::{bad_request, numbering_result, storage_created, storage_result};

/// Query parameters for the template listing
#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    pub company_id: Option<String>,
    pub document_type: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Request body for the generate/reserve operations.
///
/// Fields are optional at the serde level so that missing or malformed
/// values surface as structured validation failures rather than a bare 422.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub company_code: Option<String>,
    pub branch_code: Option<String>,
    pub issued_date: Option<String>,
}

#[derive(Serialize)]
pub struct SequenceResponse {
    pub last_number: i64,
}

fn joined(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// List document templates with optional filtering and pagination
pub async fn list_templates(
    State(db): State<DbState>,
    Query(params): Query<ListTemplatesQuery>,
) -> Response {
    info!(
        "Listing document templates (document_type: {:?}, keyword: {:?})",
        params.document_type, params.keyword
    );

    // Empty query values are treated as absent filters
    let document_type = match params.document_type.as_deref() {
        Some(raw) if !raw.is_empty() => match raw.parse::<DocumentType>() {
            Ok(document_type) => Some(document_type),
            Err(e) => return bad_request(e, "Invalid document type filter"),
        },
        _ => None,
    };

    let pagination = PaginationParams::with_page_and_size(
        params.page.unwrap_or(1),
        params.size.unwrap_or(DEFAULT_PAGE_SIZE),
    );
    let (limit, offset) = pagination.validate();

    let filter = TemplateFilter {
        company_id: params.company_id.filter(|c| !c.is_empty()),
        document_type,
        keyword: params.keyword,
        limit: Some(limit),
        offset: Some(offset),
    };

    let result = db.templates.list_templates(filter).await;
    storage_result(result.map(|(templates, total)| {
        PaginatedResponse::new(templates, &pagination, total)
    }))
}

/// Get a specific document template by ID
pub async fn get_template(State(db): State<DbState>, Path(template_id): Path<String>) -> Response {
    info!("Getting document template: {}", template_id);

    storage_result(db.templates.get_template(&template_id).await)
}

/// Create a new document template
pub async fn create_template(
    State(db): State<DbState>,
    Json(request): Json<TemplateCreateInput>,
) -> Response {
    info!(
        "Creating document template: {} for company {}",
        request.document_type, request.company_id
    );

    // Validate input
    let errors = validate_template_data(&request);
    if !errors.is_empty() {
        return bad_request(joined(&errors), "Invalid template data");
    }

    // Unknown tokens are rejected before the format is persisted
    if let Err(e) = validate_format(&request.format) {
        return bad_request(e, "Invalid format string");
    }

    storage_created(db.templates.create_template(request).await)
}

/// Update an existing document template
pub async fn update_template(
    State(db): State<DbState>,
    Path(template_id): Path<String>,
    Json(request): Json<TemplateUpdateInput>,
) -> Response {
    info!("Updating document template: {}", template_id);

    let errors = validate_template_update(&request);
    if !errors.is_empty() {
        return bad_request(joined(&errors), "Invalid template update");
    }

    if let Some(ref format) = request.format {
        if let Err(e) = validate_format(format) {
            return bad_request(e, "Invalid format string");
        }
    }

    storage_result(db.templates.update_template(&template_id, request).await)
}

/// Delete a document template.
/// Already-issued document numbers are unaffected.
pub async fn delete_template(
    State(db): State<DbState>,
    Path(template_id): Path<String>,
) -> Response {
    info!("Deleting document template: {}", template_id);

    storage_result(db.templates.delete_template(&template_id).await)
}

fn generation_context(request: GenerateRequest) -> Result<GenerationContext, Response> {
    let company_code = match request.company_code {
        Some(code) if !code.trim().is_empty() => code,
        _ => {
            return Err(bad_request(
                "company_code is required",
                "Invalid generation request",
            ))
        }
    };

    let issued_date = match request.issued_date {
        Some(ref raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                return Err(bad_request(
                    "issued_date must be formatted as YYYY-MM-DD",
                    "Invalid generation request",
                ))
            }
        },
        None => {
            return Err(bad_request(
                "issued_date is required",
                "Invalid generation request",
            ))
        }
    };

    Ok(GenerationContext {
        company_code,
        branch_code: request.branch_code.unwrap_or_default(),
        issued_date,
    })
}

/// Preview the next document number without consuming it
pub async fn generate_number(
    State(db): State<DbState>,
    Path(template_id): Path<String>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    info!("Generating document number preview: {}", template_id);

    let context = match generation_context(request) {
        Ok(context) => context,
        Err(response) => return response,
    };

    numbering_result(db.numbering.preview(&template_id, &context).await)
}

/// Advance the sequence counter after a document has been durably created
pub async fn increment_sequence(
    State(db): State<DbState>,
    Path(template_id): Path<String>,
) -> Response {
    info!("Incrementing sequence: {}", template_id);

    let result = db.numbering.increment(&template_id, None).await;
    numbering_result(result.map(|last_number| SequenceResponse { last_number }))
}

/// Administrative reset of the sequence counter to 0
pub async fn reset_sequence(
    State(db): State<DbState>,
    Path(template_id): Path<String>,
) -> Response {
    info!("Resetting sequence: {}", template_id);

    let result = db.numbering.reset(&template_id).await;
    numbering_result(result.map(|last_number| SequenceResponse { last_number }))
}

/// Reserve the next document number for a two-phase create flow
pub async fn reserve_number(
    State(db): State<DbState>,
    Path(template_id): Path<String>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    info!("Reserving document number: {}", template_id);

    let context = match generation_context(request) {
        Ok(context) => context,
        Err(response) => return response,
    };

    numbering_result(db.numbering.reserve(&template_id, &context).await)
}

/// Commit a previously reserved document number
pub async fn commit_reservation(
    State(db): State<DbState>,
    Path(template_id): Path<String>,
    Json(reservation): Json<NumberReservation>,
) -> Response {
    info!(
        "Committing reservation {} for template {}",
        reservation.sequence, template_id
    );

    if reservation.template_id != template_id {
        return bad_request(
            "reservation does not belong to this template",
            "Invalid reservation",
        );
    }

    let result = db.numbering.commit(&reservation).await;
    numbering_result(result.map(|last_number| SequenceResponse { last_number }))
}
