use thiserror::Error;

/// Errors that can occur when compiling filter specs.
///
/// All of them are fatal: a run with a broken filter never starts.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Filter expression is invalid: '{0}'. Expected '<field> <operator> <value>'")]
    Malformed(String),

    #[error(
        "Unknown filter operator '{operator}' in '{spec}'. Valid operators are: > >= < <= == ==* != !=* =~ !~ =~* !~*"
    )]
    UnknownOperator { operator: String, spec: String },

    #[error("Filter value '{literal}' in '{spec}' is not a number")]
    NonNumericLiteral {
        literal: String,
        spec: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("Invalid regular expression in '{spec}': {source}")]
    InvalidRegex {
        spec: String,
        #[source]
        source: regex::Error,
    },
}
