//! # Flow Error Types
//!
//! Error types for configuration and payment submission.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Flow Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────────┐        ┌──────────────────────────────────┐   │
//! │  │   FlowError         │        │   SubmitError                    │   │
//! │  │   (startup)         │        │   (per submission)               │   │
//! │  │                     │        │                                  │   │
//! │  │  InvalidConfig      │        │  Validation      → field marks   │   │
//! │  │  InvalidUrl         │        │  Rejected        → banner        │   │
//! │  │  ConfigLoadFailed   │        │  SdnCheckFailed  → redirect      │   │
//! │  │  Logging            │        │  Unclassified    → generic fail  │   │
//! │  └─────────────────────┘        └──────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use checkout_core::{FieldErrors, NormalizedError, RequestError};
use thiserror::Error;

/// Result type alias for startup operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors raised while setting up the checkout flow.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Invalid checkout configuration.
    #[error("Invalid checkout configuration: {0}")]
    InvalidConfig(String),

    /// A configured URL could not be parsed.
    #[error("Invalid URL for {setting}: {reason}")]
    InvalidUrl { setting: String, reason: String },

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to install the tracing subscriber.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl From<std::io::Error> for FlowError {
    fn from(err: std::io::Error) -> Self {
        FlowError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for FlowError {
    fn from(err: toml::de::Error) -> Self {
        FlowError::ConfigLoadFailed(err.to_string())
    }
}

/// Why a submission did not go through.
///
/// Every variant except `Unclassified` is a recognized outcome the page knows
/// how to present.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The form failed local validation; nothing was sent.
    #[error("Form has {} invalid field(s)", .0.len())]
    Validation(FieldErrors),

    /// The backend or processor rejected the payment with a known error shape.
    #[error("Payment rejected")]
    Rejected(NormalizedError),

    /// The cardholder failed the sanctions screening.
    #[error("This card holder did not pass the SDN check.")]
    SdnCheckFailed { redirect_url: String },

    /// Unrecognized failure. The caller aborts and shows a generic error.
    #[error("Payment failed: {0}")]
    Unclassified(#[source] RequestError),
}

impl From<NormalizedError> for SubmitError {
    fn from(normalized: NormalizedError) -> Self {
        match normalized.into_result() {
            Ok(recognized) => SubmitError::Rejected(recognized),
            Err(original) => SubmitError::Unclassified(original),
        }
    }
}

/// Result type alias for submissions.
pub type SubmitResult<T> = Result<T, SubmitError>;
