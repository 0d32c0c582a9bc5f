//! Error types for the flexpay-rs library.
//!
//! Every error is detected synchronously, before a signature is computed, and
//! names the field that caused it. None of them are worth retrying: the
//! pipeline is deterministic, so the caller has to fix the input instead.

use thiserror::Error;

/// Main error type for URL construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Amount is negative, non-finite, unparsable or too precise for its currency
    #[error("Invalid amount in `{field}`: {reason}")]
    InvalidAmount {
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Currency code outside the supported set
    #[error("Unsupported currency in `{field}`: {code}")]
    UnsupportedCurrency {
        /// Name of the offending field
        field: String,
        /// The code that was rejected
        code: String,
    },

    /// Reference (description) is empty or too long
    #[error("Invalid reference in `{field}`: {reason}")]
    InvalidReference {
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Any other parameter that breaks the gateway's rules
    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// A builder was finished without a required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Merchant id or shared secret is unusable
    #[error("Invalid credentials: `{field}` {reason}")]
    InvalidCredentials {
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// The keyed-hash primitive refused to run
    #[error("Signing failed: {0}")]
    SigningFailure(String),

    /// Unknown signature algorithm name
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The base path cannot prefix a query string
    #[error("Cannot assemble URL from `{field}`: {reason}")]
    AssemblyFailure {
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

impl GatewayError {
    /// Returns the name of the field that caused the error, if there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            GatewayError::InvalidAmount { field, .. }
            | GatewayError::UnsupportedCurrency { field, .. }
            | GatewayError::InvalidReference { field, .. }
            | GatewayError::InvalidParameter { field, .. }
            | GatewayError::InvalidCredentials { field, .. }
            | GatewayError::AssemblyFailure { field, .. } => Some(field.as_str()),
            GatewayError::MissingField(field) => Some(field.as_str()),
            GatewayError::SigningFailure(_) | GatewayError::UnsupportedAlgorithm(_) => None,
        }
    }

    pub(crate) fn invalid_amount(field: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::InvalidAmount {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_parameter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        GatewayError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for flexpay operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
