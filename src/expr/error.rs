use thiserror::Error;

/// Errors raised while compiling or evaluating an expression spec
#[derive(Debug, Error, PartialEq)]
pub enum ExprError {
    #[error("Expression is invalid: '{0}'. Expected '<key> = <expression>'")]
    MissingAssignment(String),

    #[error("Expression has an empty output key: '{0}'")]
    EmptyKey(String),

    #[error("Unexpected character '{found}' at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("Unexpected token '{found}', expected {expected}")]
    UnexpectedToken { found: String, expected: &'static str },

    #[error("Unexpected end of expression, expected {0}")]
    UnexpectedEnd(&'static str),

    #[error("Unknown variable name '{0}'")]
    UnknownVariable(String),

    #[error("Variable '{name}' must be numeric, got '{value}'")]
    NonNumericVariable { name: String, value: String },

    #[error("Variable '{name}' value '{value}' is outside the decimal range")]
    OutOfRange { name: String, value: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow")]
    Overflow,
}
