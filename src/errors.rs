/*!
 * Error types for the kobisplit library.
 *
 * This module contains custom error types for the different layers of the
 * segmentation engine, using the thiserror crate for ergonomic error definitions:
 *
 * - `ProviderError`: raw failures from an HTTP provider client
 * - `GenerationFailure`: a provider failure after classification
 * - `SplitError`: everything a segmentation strategy can fail with
 * - `AppError`: top-level wrapper used by the binary
 */

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),
}

/// Closed taxonomy of classified generation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing or invalid credential
    Auth,
    /// Rate limit or budget exhausted
    Quota,
    /// The call did not finish within the caller's deadline
    Timeout,
    /// The response could not be parsed into the required JSON shape
    MalformedOutput,
    /// Provider is down, overloaded, or unreachable
    ProviderUnavailable,
    /// Anything else
    Unknown,
}

impl FailureKind {
    /// Whether re-issuing the same request can reasonably succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureKind::Timeout | FailureKind::Quota | FailureKind::ProviderUnavailable
        )
    }

    /// Whether this kind means the chosen provider/model should be swapped out
    pub fn suggests_alternative(&self) -> bool {
        matches!(
            self,
            FailureKind::Auth | FailureKind::Quota | FailureKind::ProviderUnavailable
        )
    }

    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Auth => "auth",
            FailureKind::Quota => "quota",
            FailureKind::Timeout => "timeout",
            FailureKind::MalformedOutput => "malformed_output",
            FailureKind::ProviderUnavailable => "provider_unavailable",
            FailureKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified error from an external model call
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind} failure from {provider} ({model}): {message}")]
pub struct GenerationFailure {
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable message
    pub message: String,
    /// Provider the call was routed to
    pub provider: String,
    /// Model that was requested
    pub model: String,
    /// Suggested model to retry with, if the provider looks unsuitable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_model: Option<String>,
    /// Whether a plain retry may succeed
    pub retryable: bool,
}

impl GenerationFailure {
    /// Create a failure whose retryability follows its kind
    pub fn new(
        kind: FailureKind,
        message: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: provider.into(),
            model: model.into(),
            alternative_model: None,
            retryable: kind.is_retryable(),
        }
    }

    /// Attach a suggested alternative model
    pub fn with_alternative(mut self, model: Option<String>) -> Self {
        self.alternative_model = model;
        self
    }
}

/// Errors produced by the segmentation strategies
#[derive(Error, Debug, Clone)]
pub enum SplitError {
    /// The model call itself failed
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationFailure),

    /// The model altered the English source text
    #[error(
        "English text modified by model at character {offset} (expected \"{expected_context}\", got \"{actual_context}\"); retry required"
    )]
    EnglishModified {
        /// Character offset of the first difference in the normalized texts
        offset: usize,
        /// Context window around the offset in the source
        expected_context: String,
        /// Context window around the offset in the reconstruction
        actual_context: String,
    },

    /// The reply parsed but does not satisfy the expected shape
    #[error("JSON schema violation: {0}")]
    SchemaViolation(String),

    /// Parallel extraction was requested without a Korean translation
    #[error("Korean translation is required for parallel extraction")]
    MissingTranslation,
}

impl SplitError {
    /// Short machine-readable label
    pub fn kind_label(&self) -> &'static str {
        match self {
            SplitError::Generation(failure) => failure.kind.as_str(),
            SplitError::EnglishModified { .. } => "english_modified",
            SplitError::SchemaViolation(_) => "schema_violation",
            SplitError::MissingTranslation => "missing_translation",
        }
    }

    /// Whether the caller may retry without changing anything
    ///
    /// Fidelity violations always need an explicit, caller-initiated retry and
    /// are therefore reported as non-retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            SplitError::Generation(failure) => failure.retryable,
            _ => false,
        }
    }

    /// Convert into the structured payload returned across the API boundary
    pub fn to_payload(&self) -> ErrorPayload {
        let mut payload = ErrorPayload {
            kind: self.kind_label().to_string(),
            message: self.to_string(),
            retryable: self.is_retryable(),
            provider: None,
            model: None,
            alternative_model: None,
            offset: None,
            expected_context: None,
            actual_context: None,
        };

        match self {
            SplitError::Generation(failure) => {
                payload.message = failure.message.clone();
                payload.provider = Some(failure.provider.clone());
                payload.model = Some(failure.model.clone());
                payload.alternative_model = failure.alternative_model.clone();
            }
            SplitError::EnglishModified {
                offset,
                expected_context,
                actual_context,
            } => {
                payload.offset = Some(*offset);
                payload.expected_context = Some(expected_context.clone());
                payload.actual_context = Some(actual_context.clone());
            }
            SplitError::SchemaViolation(_) | SplitError::MissingTranslation => {}
        }

        payload
    }
}

/// Serializable error description for callers deciding whether to retry,
/// switch model, or abort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub kind: String,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_context: Option<String>,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from segmentation
    #[error("Split error: {0}")]
    Split(#[from] SplitError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
