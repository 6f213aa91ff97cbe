//! Error types for identifier and amount parsing
//!
//! Comprehensive error taxonomy using thiserror

use thiserror::Error;

/// Errors raised while building identifiers or amounts from external input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Name too long: {len} bytes, at most {max} allowed")]
    NameTooLong { len: usize, max: usize },

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("Amount must be non-negative: {0}")]
    NegativeAmount(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
