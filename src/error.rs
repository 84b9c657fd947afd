//! Typed engine errors.
//!
//! Validation failures surface before any PMF is produced; the engine never
//! panics on well-typed input. The HTTP layer maps every variant to a 400.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    /// An attacks string that fails the dice grammar.
    #[error("invalid dice expression: '{expr}'")]
    InvalidDiceExpression { expr: String },

    /// A defending unit with no models or no wounds per model.
    #[error("{field} must be greater than zero, got {value}")]
    InvalidUnit { field: &'static str, value: i32 },

    /// A characteristic outside the bounds the dice math is defined for.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i32 },
}
