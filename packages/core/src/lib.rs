// ABOUTME: Core types, constants, and validation for Kiln document numbering
// ABOUTME: Foundational package shared by the storage, numbering, and API layers

pub mod constants;
pub mod types;
pub mod validation;

// Re-export main types
pub use types::{
    DocumentTemplate, DocumentType, GenerationContext, ResetPolicy, TemplateCreateInput,
    TemplateUpdateInput, TypeError,
};

// Re-export constants
pub use constants::{database_file, kiln_dir};

// Re-export validation
pub use validation::{validate_template_data, validate_template_update, ValidationError};
