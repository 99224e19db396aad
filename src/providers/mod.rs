/*!
 * Provider implementations for the generation models.
 *
 * This module contains client implementations for the supported LLM providers:
 * - OpenAI: chat completions API
 * - Anthropic: messages API
 * - Google: Gemini generateContent API
 *
 * The segmentation engine never talks to these clients directly. It consumes
 * the `GenerationClient` capability, implemented by `router::ProviderRouter`
 * (and by `mock::MockGenerationClient` in tests).
 */

use std::fmt::{self, Debug};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::{GenerationFailure, ProviderError};

pub mod anthropic;
pub mod classify;
pub mod google;
pub mod mock;
pub mod openai;
pub mod router;

pub use self::classify::{FailureContext, classify};
pub use self::router::ProviderRouter;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the router.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// The single capability the segmentation engine needs from a model
#[async_trait]
pub trait GenerationClient: Send + Sync + Debug {
    /// Send `prompt` to the model named by `model_id` and return its text reply.
    ///
    /// No retries happen at this layer.
    async fn complete(&self, prompt: &str, model_id: &str) -> Result<String, GenerationFailure>;
}

/// Supported providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Google,
}

/// Model tier used when proposing an equivalent model elsewhere
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Fast,
    Standard,
}

impl ModelTier {
    /// Infer the tier from a model identifier
    pub fn of(model_id: &str) -> Self {
        let id = model_id.to_lowercase();
        if ["mini", "nano", "haiku", "flash", "lite"]
            .iter()
            .any(|marker| id.contains(marker))
        {
            ModelTier::Fast
        } else {
            ModelTier::Standard
        }
    }
}

impl ProviderKind {
    /// Select the provider serving `model_id`; a pure function of the id
    pub fn for_model(model_id: &str) -> Option<Self> {
        let id = model_id.trim().to_lowercase();
        if id.starts_with("gpt-")
            || id.starts_with("chatgpt-")
            || id.starts_with("o1")
            || id.starts_with("o3")
            || id.starts_with("o4")
        {
            Some(Self::OpenAI)
        } else if id.starts_with("claude-") {
            Some(Self::Anthropic)
        } else if id.starts_with("gemini-") {
            Some(Self::Google)
        } else {
            None
        }
    }

    /// Lowercase provider identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
        }
    }

    /// Capitalized provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Google => "Google",
        }
    }

    /// The provider to suggest when this one is unsuitable
    pub fn next_in_rotation(&self) -> Self {
        match self {
            Self::OpenAI => Self::Anthropic,
            Self::Anthropic => Self::Google,
            Self::Google => Self::OpenAI,
        }
    }

    /// Representative model for a tier
    pub fn model_for_tier(&self, tier: ModelTier) -> &'static str {
        match (self, tier) {
            (Self::OpenAI, ModelTier::Fast) => "gpt-4o-mini",
            (Self::OpenAI, ModelTier::Standard) => "gpt-4o",
            (Self::Anthropic, ModelTier::Fast) => "claude-3-5-haiku-latest",
            (Self::Anthropic, ModelTier::Standard) => "claude-sonnet-4-20250514",
            (Self::Google, ModelTier::Fast) => "gemini-2.0-flash",
            (Self::Google, ModelTier::Standard) => "gemini-2.5-pro",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Call a generation client under a deadline.
///
/// An elapsed deadline surfaces as a classified `timeout` failure; the call
/// never hangs past `timeout`.
pub async fn complete_with_timeout(
    client: &dyn GenerationClient,
    prompt: &str,
    model_id: &str,
    timeout: Duration,
) -> Result<String, GenerationFailure> {
    debug!("Calling model {} ({} prompt chars)", model_id, prompt.chars().count());
    match tokio::time::timeout(timeout, client.complete(prompt, model_id)).await {
        Ok(result) => result,
        Err(_) => {
            error!("Model {} did not answer within {:?}", model_id, timeout);
            let context = FailureContext::for_model(model_id);
            Err(classify(
                &ProviderError::Timeout(format!("no response within {:?}", timeout)),
                &context,
            ))
        }
    }
}

/// Map a transport-level reqwest error
pub(crate) fn map_send_error(provider: ProviderKind, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(format!("{} request timed out: {}", provider.display_name(), err))
    } else if err.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", provider.display_name(), err))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider.display_name(), err))
    }
}

/// Map a non-success HTTP status and its body
pub(crate) fn map_status_error(provider: ProviderKind, status: StatusCode, body: String) -> ProviderError {
    error!("{} API error ({}): {}", provider.display_name(), status, body);
    match status.as_u16() {
        401 | 403 => ProviderError::AuthenticationError(body),
        429 => ProviderError::RateLimitExceeded(body),
        408 | 504 => ProviderError::Timeout(body),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}
