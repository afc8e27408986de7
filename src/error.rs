//! Error types for the pricing library
//!
//! The pricing engine itself never fails: "nothing to price" and
//! "no finite price" are result values. These errors cover the fee store,
//! plan lookup and fee editing.

use thiserror::Error;

/// Result type alias using PricingError
pub type Result<T> = std::result::Result<T, PricingError>;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Unknown delivery plan: {0}")]
    UnknownPlan(String),

    #[error("Invalid fee: {0}")]
    InvalidFee(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
