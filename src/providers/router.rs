/*!
 * Model-id based routing across providers.
 *
 * Clients are constructed once from configuration and handed to the engine
 * explicitly. A provider without an API key is simply absent; requests for
 * its models fail with an `auth` failure.
 */

use async_trait::async_trait;
use log::debug;

use crate::app_config::ProvidersConfig;
use crate::errors::{FailureKind, GenerationFailure, ProviderError};

use super::anthropic::{Anthropic, AnthropicRequest};
use super::google::{GeminiRequest, Google};
use super::openai::{OpenAI, OpenAIRequest};
use super::{FailureContext, GenerationClient, Provider, ProviderKind, classify};

/// Maximum completion tokens requested from every provider
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Routes each request to the provider serving the requested model
#[derive(Debug)]
pub struct ProviderRouter {
    openai: Option<OpenAI>,
    anthropic: Option<Anthropic>,
    google: Option<Google>,
    max_tokens: u32,
}

impl Default for ProviderRouter {
    fn default() -> Self {
        Self {
            openai: None,
            anthropic: None,
            google: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ProviderRouter {
    /// Build clients for every provider that has a credential
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let openai = config.openai.resolved_api_key().map(|key| {
            OpenAI::new(key, config.openai.endpoint.clone(), config.openai.timeout_secs)
        });
        let anthropic = config.anthropic.resolved_api_key().map(|key| {
            Anthropic::new(key, config.anthropic.endpoint.clone(), config.anthropic.timeout_secs)
        });
        let google = config.google.resolved_api_key().map(|key| {
            Google::new(key, config.google.endpoint.clone(), config.google.timeout_secs)
        });

        Self {
            openai,
            anthropic,
            google,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Providers that have a client
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        let mut providers = Vec::new();
        if self.openai.is_some() {
            providers.push(ProviderKind::OpenAI);
        }
        if self.anthropic.is_some() {
            providers.push(ProviderKind::Anthropic);
        }
        if self.google.is_some() {
            providers.push(ProviderKind::Google);
        }
        providers
    }

    fn missing_credential(provider: ProviderKind) -> ProviderError {
        ProviderError::AuthenticationError(format!(
            "No API key configured for {}",
            provider.display_name()
        ))
    }

    async fn dispatch(&self, provider: ProviderKind, prompt: &str, model_id: &str) -> Result<String, ProviderError> {
        let text = match provider {
            ProviderKind::OpenAI => {
                let client = self.openai.as_ref().ok_or_else(|| Self::missing_credential(provider))?;
                let request = OpenAIRequest::new(model_id)
                    .add_message("user", prompt)
                    .max_tokens(self.max_tokens)
                    .json_output();
                send(client, request).await?
            }
            ProviderKind::Anthropic => {
                let client = self.anthropic.as_ref().ok_or_else(|| Self::missing_credential(provider))?;
                let request = AnthropicRequest::new(model_id, self.max_tokens).add_message("user", prompt);
                send(client, request).await?
            }
            ProviderKind::Google => {
                let client = self.google.as_ref().ok_or_else(|| Self::missing_credential(provider))?;
                let request = GeminiRequest::new(model_id, prompt)
                    .max_output_tokens(self.max_tokens)
                    .json_output();
                send(client, request).await?
            }
        };

        if text.trim().is_empty() {
            return Err(ProviderError::ParseError(format!(
                "{} returned an empty response",
                provider.display_name()
            )));
        }
        Ok(text)
    }
}

async fn send<P: Provider>(client: &P, request: P::Request) -> Result<String, ProviderError> {
    let response = Provider::complete(client, request).await?;
    Ok(P::extract_text(&response))
}

#[async_trait]
impl GenerationClient for ProviderRouter {
    async fn complete(&self, prompt: &str, model_id: &str) -> Result<String, GenerationFailure> {
        let provider = ProviderKind::for_model(model_id).ok_or_else(|| {
            GenerationFailure::new(
                FailureKind::Unknown,
                format!("No provider serves model '{}'", model_id),
                "unknown",
                model_id,
            )
        })?;

        debug!("Routing model {} to {}", model_id, provider.display_name());
        self.dispatch(provider, prompt, model_id)
            .await
            .map_err(|err| classify(&err, &FailureContext::new(provider, model_id)))
    }
}
