//! Error types for parsing user-facing codes.

use thiserror::Error;

/// Errors raised when a currency or card issuer code is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Currency code outside the supported set.
    #[error("Unsupported currency: {0}")]
    UnknownCurrency(String),

    /// Card issuer code outside the fee table.
    #[error("Unknown card issuer: {0}")]
    UnknownCardIssuer(String),
}
