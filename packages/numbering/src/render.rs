// ABOUTME: Renders a parsed token sequence into a document number
// ABOUTME: Pure substitution; no storage or clock access

use chrono::Datelike;

use kiln_core::{DocumentType, GenerationContext};

use crate::token::Token;

/// Substitutes every token with its contextual value.
///
/// `sequence` is the candidate value to print, already resolved by the
/// caller (`last_number + 1` for previews). `{####}` pads to four digits and
/// widens beyond 9999 rather than truncating.
pub fn render(
    tokens: &[Token],
    document_type: DocumentType,
    context: &GenerationContext,
    sequence: i64,
) -> String {
    let date = context.issued_date;
    let mut out = String::new();

    for token in tokens {
        match token {
            Token::CompanyCode => out.push_str(&context.company_code),
            Token::DocumentType => out.push_str(document_type.as_str()),
            Token::YearFull => out.push_str(&format!("{:04}", date.year())),
            Token::YearShort => out.push_str(&format!("{:02}", date.year() % 100)),
            Token::Month => out.push_str(&format!("{:02}", date.month())),
            Token::Day => out.push_str(&format!("{:02}", date.day())),
            Token::PaddedSequence => out.push_str(&format!("{:04}", sequence)),
            Token::Sequence => out.push_str(&sequence.to_string()),
            Token::BranchCode => out.push_str(&context.branch_code),
            Token::Literal(text) => out.push_str(text),
        }
    }

    out
}
