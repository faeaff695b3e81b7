//! Error types for Zinc, JSON and Hayson encoding and decoding operations.

use thiserror::Error;

/// Errors that can occur while reading or building Haystack values.
#[derive(Error, Debug)]
pub enum HaystackError {
    /// The Zinc input could not be split into tokens (unterminated string,
    /// bad escape, malformed date, ...). Includes the 1-based line number.
    #[error("Zinc lex error at line {line}: {message}")]
    Lex { line: usize, message: String },

    /// The token stream did not match the Zinc grammar, or a tag name broke
    /// a naming rule. Includes the 1-based line number.
    #[error("Zinc parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A dict tag or column name did not start with a lowercase ASCII letter,
    /// or contained characters other than ASCII letters, digits and `_`.
    #[error("invalid tag name '{0}': must start with a lowercase ASCII letter")]
    InvalidName(String),

    /// A scalar was constructed from out-of-range parts (month 13, minute 61, ...).
    #[error("invalid {kind}: {message}")]
    InvalidValue { kind: &'static str, message: String },

    /// A grid builder was given the same column name twice.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// A row was added before the grid had any columns to hold it.
    #[error("cannot add a row to a grid with no columns")]
    NoColumns,

    /// A positional row held more cells than the grid has columns.
    #[error("row has {found} cells but the grid has {expected} columns")]
    RowLength { expected: usize, found: usize },

    /// The input string was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Valid JSON that does not describe a Haystack value.
    #[error("invalid JSON value: {0}")]
    JsonValue(String),
}

/// Convenience alias used throughout haystack-core.
pub type Result<T> = std::result::Result<T, HaystackError>;
