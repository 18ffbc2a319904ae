// ABOUTME: Token grammar and pure parser for document number format strings
// ABOUTME: Write-time validation rejects unknown tokens; the parser never fails

use thiserror::Error;

/// A single element of a parsed format string.
///
/// Placeholders are drawn from a closed set; everything else in the format
/// (dashes, custom separators, prefixes) is carried as literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `{COMP}` - caller-supplied company code, verbatim
    CompanyCode,
    /// `{TYPE}` - the template's document type, verbatim
    DocumentType,
    /// `{YYYY}` - 4-digit year from the issued date
    YearFull,
    /// `{YY}` - last two digits of the year
    YearShort,
    /// `{MM}` - zero-padded month, 01-12
    Month,
    /// `{DD}` - zero-padded day, 01-31
    Day,
    /// `{####}` - sequence zero-padded to 4 digits; width grows past 9999
    PaddedSequence,
    /// `{SEQ}` - sequence with no padding
    Sequence,
    /// `{BRANCH}` - caller-supplied branch code, verbatim
    BranchCode,
    /// Literal text emitted unchanged
    Literal(String),
}

/// Errors raised when validating a format string against the token grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Format string is empty")]
    Empty,
    #[error("Unrecognized token {token} in format string")]
    UnknownToken { token: String },
    #[error("Unterminated '{{' in format string")]
    UnterminatedBrace,
}

fn placeholder(name: &str) -> Option<Token> {
    match name {
        "COMP" => Some(Token::CompanyCode),
        "TYPE" => Some(Token::DocumentType),
        "YYYY" => Some(Token::YearFull),
        "YY" => Some(Token::YearShort),
        "MM" => Some(Token::Month),
        "DD" => Some(Token::Day),
        "####" => Some(Token::PaddedSequence),
        "SEQ" => Some(Token::Sequence),
        "BRANCH" => Some(Token::BranchCode),
        _ => None,
    }
}

/// Parses a format string into a token sequence.
///
/// This is a total function: unrecognized `{...}` runs and an unterminated
/// `{` are consumed as literal text rather than rejected, so a stored format
/// always renders. Strictness belongs to [`validate_format`], which is
/// applied before a format is persisted.
pub fn parse_format(format: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = format;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after_open = &rest[open..];
        match after_open.find('}') {
            Some(close) => {
                let name = &after_open[1..close];
                match placeholder(name) {
                    Some(token) => {
                        if !literal.is_empty() {
                            tokens.push(Token::Literal(std::mem::take(&mut literal)));
                        }
                        tokens.push(token);
                    }
                    None => literal.push_str(&after_open[..=close]),
                }
                rest = &after_open[close + 1..];
            }
            None => {
                // No closing brace anywhere ahead: the remainder is literal
                literal.push_str(after_open);
                rest = "";
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    tokens
}

/// Validates a format string against the token grammar.
///
/// Unknown `{...}` tokens and unterminated braces are rejected here so they
/// never reach the store.
pub fn validate_format(format: &str) -> Result<(), FormatError> {
    if format.trim().is_empty() {
        return Err(FormatError::Empty);
    }

    let mut rest = format;
    while let Some(open) = rest.find('{') {
        let after_open = &rest[open..];
        let close = after_open.find('}').ok_or(FormatError::UnterminatedBrace)?;
        let name = &after_open[1..close];
        if placeholder(name).is_none() {
            return Err(FormatError::UnknownToken {
                token: after_open[..=close].to_string(),
            });
        }
        rest = &after_open[close + 1..];
    }

    Ok(())
}
