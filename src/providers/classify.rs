/*!
 * Classification of raw provider failures.
 *
 * Maps provider errors (HTTP status, transport errors, message substrings)
 * into the closed `FailureKind` taxonomy and, when the failure means the
 * chosen provider cannot serve the request right now, proposes an equivalent
 * model on another provider. Pure mapping; no I/O.
 */

use crate::errors::{FailureKind, GenerationFailure, ProviderError};

use super::{ModelTier, ProviderKind};

/// Where a failure came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureContext {
    /// Provider the call was routed to, if the model id resolved to one
    pub provider: Option<ProviderKind>,
    /// Requested model
    pub model: String,
}

impl FailureContext {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider: Some(provider),
            model: model.into(),
        }
    }

    /// Resolve the provider from the model id
    pub fn for_model(model: &str) -> Self {
        Self {
            provider: ProviderKind::for_model(model),
            model: model.to_string(),
        }
    }

    fn provider_name(&self) -> &'static str {
        self.provider.map_or("unknown", |p| p.as_str())
    }
}

const QUOTA_MARKERS: &[&str] = &[
    "quota",
    "rate limit",
    "rate_limit",
    "insufficient_quota",
    "resource_exhausted",
    "too many requests",
    "credit balance",
];

const TIMEOUT_MARKERS: &[&str] = &["timed out", "timeout", "deadline exceeded"];

const UNAVAILABLE_MARKERS: &[&str] = &[
    "overloaded",
    "unavailable",
    "bad gateway",
    "connection refused",
    "connection reset",
];

const AUTH_MARKERS: &[&str] = &[
    "api key",
    "api_key",
    "unauthorized",
    "authentication",
    "permission denied",
    "invalid x-api-key",
];

const MALFORMED_MARKERS: &[&str] = &["invalid json", "expected value", "eof while parsing"];

fn contains_any(message: &str, markers: &[&str]) -> bool {
    let lower = message.to_lowercase();
    markers.iter().any(|marker| lower.contains(marker))
}

fn kind_from_message(message: &str) -> FailureKind {
    if contains_any(message, QUOTA_MARKERS) {
        FailureKind::Quota
    } else if contains_any(message, TIMEOUT_MARKERS) {
        FailureKind::Timeout
    } else if contains_any(message, AUTH_MARKERS) {
        FailureKind::Auth
    } else if contains_any(message, UNAVAILABLE_MARKERS) {
        FailureKind::ProviderUnavailable
    } else if contains_any(message, MALFORMED_MARKERS) {
        FailureKind::MalformedOutput
    } else {
        FailureKind::Unknown
    }
}

fn kind_from_status(status_code: u16, message: &str) -> FailureKind {
    match status_code {
        401 | 403 => FailureKind::Auth,
        402 | 429 => FailureKind::Quota,
        408 | 504 => FailureKind::Timeout,
        500 | 502 | 503 | 529 => FailureKind::ProviderUnavailable,
        _ => kind_from_message(message),
    }
}

/// Determine the failure kind of a raw provider error
pub fn failure_kind(error: &ProviderError) -> FailureKind {
    match error {
        ProviderError::AuthenticationError(_) => FailureKind::Auth,
        ProviderError::RateLimitExceeded(_) => FailureKind::Quota,
        ProviderError::Timeout(_) => FailureKind::Timeout,
        ProviderError::ParseError(_) => FailureKind::MalformedOutput,
        ProviderError::ConnectionError(_) => FailureKind::ProviderUnavailable,
        ProviderError::ApiError {
            status_code,
            message,
        } => kind_from_status(*status_code, message),
        ProviderError::RequestFailed(message) => kind_from_message(message),
    }
}

/// Equivalent-tier model on the next provider in rotation
pub fn alternative_model(provider: Option<ProviderKind>, model: &str) -> Option<String> {
    let provider = provider?;
    let tier = ModelTier::of(model);
    Some(provider.next_in_rotation().model_for_tier(tier).to_string())
}

/// Classify a raw provider error into a `GenerationFailure`
pub fn classify(error: &ProviderError, context: &FailureContext) -> GenerationFailure {
    let kind = failure_kind(error);
    let alternative = if kind.suggests_alternative() {
        alternative_model(context.provider, &context.model)
    } else {
        None
    };

    GenerationFailure::new(kind, error.to_string(), context.provider_name(), context.model.clone())
        .with_alternative(alternative)
}
