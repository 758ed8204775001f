use thiserror::Error;

/// Result type for tool parser operations
pub type ParserResult<T> = Result<T, ParserError>;

/// Errors that can occur while scanning model output or evaluating literals.
///
/// None of these escape the public decode entry points; the extractor turns
/// them into diagnostics and an empty result.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Parsing failed: {0}")]
    ParsingFailed(String),

    #[error("Parse depth exceeded: max {0}")]
    DepthExceeded(usize),

    #[error("Unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}
