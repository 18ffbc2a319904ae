// ABOUTME: Document template type definitions
// ABOUTME: Structures governing how document numbers are formatted and sequenced

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing enum values from their stored representation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),
    #[error("Unknown reset policy: {0}")]
    UnknownResetPolicy(String),
}

/// Kind of business document a template issues numbers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Invoice,
    PurchaseOrder,
    Receipt,
    Quotation,
    DeliveryNote,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "INVOICE",
            DocumentType::PurchaseOrder => "PURCHASE_ORDER",
            DocumentType::Receipt => "RECEIPT",
            DocumentType::Quotation => "QUOTATION",
            DocumentType::DeliveryNote => "DELIVERY_NOTE",
        }
    }
}

impl FromStr for DocumentType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INVOICE" => Ok(DocumentType::Invoice),
            "PURCHASE_ORDER" => Ok(DocumentType::PurchaseOrder),
            "RECEIPT" => Ok(DocumentType::Receipt),
            "QUOTATION" => Ok(DocumentType::Quotation),
            "DELIVERY_NOTE" => Ok(DocumentType::DeliveryNote),
            _ => Err(TypeError::UnknownDocumentType(s.to_string())),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar boundary at which a template's sequence counter restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResetPolicy {
    None,
    Daily,
    Monthly,
    Yearly,
}

impl ResetPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetPolicy::None => "NONE",
            ResetPolicy::Daily => "DAILY",
            ResetPolicy::Monthly => "MONTHLY",
            ResetPolicy::Yearly => "YEARLY",
        }
    }
}

impl FromStr for ResetPolicy {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(ResetPolicy::None),
            "DAILY" => Ok(ResetPolicy::Daily),
            "MONTHLY" => Ok(ResetPolicy::Monthly),
            "YEARLY" => Ok(ResetPolicy::Yearly),
            _ => Err(TypeError::UnknownResetPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ResetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-company, per-document-type numbering configuration.
///
/// `updated_at` records the last sequence mutation and drives
/// reset-boundary detection for DAILY/MONTHLY/YEARLY policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub id: String,
    pub company_id: String,
    pub document_type: DocumentType,
    pub format: String,
    pub last_number: i64,
    pub reset_policy: ResetPolicy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateCreateInput {
    pub company_id: String,
    pub document_type: DocumentType,
    pub format: String,
    pub last_number: Option<i64>,
    pub reset_policy: Option<ResetPolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateUpdateInput {
    pub format: Option<String>,
    pub last_number: Option<i64>,
    pub reset_policy: Option<ResetPolicy>,
}

/// Caller-supplied values substituted into a format string at generation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    pub company_code: String,
    pub branch_code: String,
    pub issued_date: NaiveDate,
}
