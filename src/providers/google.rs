use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

use super::{Provider, ProviderKind, map_send_error, map_status_error};

/// Google Gemini client for the generateContent API
#[derive(Debug)]
pub struct Google {
    client: Client,
    api_key: String,
    /// API base URL, e.g. `https://generativelanguage.googleapis.com`
    endpoint: String,
}

/// generateContent request; the model is part of the URL
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    #[serde(skip)]
    model: String,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

/// A content turn
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A text part
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

/// Sampling options
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

/// A response candidate
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// generateContent response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

impl GeminiRequest {
    /// Create a request with a single user turn
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: prompt.into() }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: None,
                response_mime_type: None,
            },
        }
    }

    /// Set the maximum output tokens
    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.generation_config.max_output_tokens = Some(tokens);
        self
    }

    /// Ask for a JSON reply
    pub fn json_output(mut self) -> Self {
        self.generation_config.response_mime_type = Some("application/json".to_string());
        self
    }
}

impl Google {
    /// Create a new Gemini client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self, model: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://generativelanguage.googleapis.com"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/v1beta/models/{}:generateContent", base, model)
    }

    /// Complete a generateContent request
    pub async fn complete(&self, request: GeminiRequest) -> Result<GeminiResponse, ProviderError> {
        let response = self
            .client
            .post(self.api_url(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error(ProviderKind::Google, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(map_status_error(ProviderKind::Google, status, error_text));
        }

        let gemini_response = response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Gemini response: {}", e)))?;

        if let Some(reason) = gemini_response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            debug!("Gemini finish reason: {}", reason);
        }
        Ok(gemini_response)
    }

    /// Extract text from the first candidate
    pub fn extract_text_from_response(response: &GeminiResponse) -> String {
        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for Google {
    type Request = GeminiRequest;
    type Response = GeminiResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        Google::complete(self, request).await
    }

    fn extract_text(response: &Self::Response) -> String {
        Self::extract_text_from_response(response)
    }
}
