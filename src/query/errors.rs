//! Query errors
//!
//! `ParseError` covers malformed query text and is surfaced at parse time —
//! no partial term list is ever returned. `QueryError` covers misuse of the
//! term model and operators the in-memory evaluator does not support; those
//! are programmer/configuration errors, failed immediately and never retried.

use thiserror::Error;

use super::ast::QueryOperator;

/// Result type for query parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for query building and evaluation
pub type QueryResult<T> = Result<T, QueryError>;

/// Malformed query text. Byte offsets point into the original query string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected end of query at byte {at}")]
    UnexpectedEnd { at: usize },

    #[error("expected a field name at byte {at}")]
    ExpectedField { at: usize },

    #[error("expected a space at byte {at}")]
    ExpectedSpace { at: usize },

    #[error("unknown operator '{word}' at byte {at}")]
    UnknownOperator { word: String, at: usize },

    #[error("expected 'and' between clauses at byte {at}, found '{word}'")]
    ExpectedAnd { word: String, at: usize },

    #[error("unterminated string literal starting at byte {at}")]
    UnterminatedString { at: usize },

    #[error("invalid escape sequence '\\{escape}' at byte {at}")]
    InvalidEscape { escape: char, at: usize },

    #[error("malformed numeric literal '{text}' at byte {at}")]
    InvalidNumber { text: String, at: usize },

    #[error("expected a literal at byte {at}")]
    ExpectedLiteral { at: usize },
}

/// Term-model misuse and unsupported evaluation paths
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Ordering on references, or IN in the in-memory evaluator
    #[error("operator '{0}' is not supported here")]
    UnsupportedOperator(QueryOperator),

    /// Term was built with a value list; the single-value accessor was called
    #[error("query term holds a value list, not a single value")]
    SingleValueExpected,

    /// Term was built with a single value; the list accessor was called
    #[error("query term holds a single value, not a value list")]
    ValueListExpected,

    /// Value lists are bounded to 1..=99 entries
    #[error("value list must contain between 1 and 99 values, got {0}")]
    InvalidListLength(usize),
}
