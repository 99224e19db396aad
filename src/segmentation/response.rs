/*!
 * Strict schemas for model replies.
 *
 * Replies are parsed into these types right at the boundary. A reply that
 * does not fit its schema becomes a `malformed_output` failure; nothing
 * downstream ever sees an untyped map.
 */

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{GenerationFailure, ProviderError};
use crate::providers::{FailureContext, classify};

/// One sentence of an `ai` reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSentence {
    #[serde(alias = "content", alias = "english")]
    pub text: String,
    #[serde(default, alias = "korean_translation", skip_serializing_if = "Option::is_none")]
    pub korean: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Reply to a split prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSplitReply {
    pub sentences: Vec<AiSentence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Reply to a verify prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyReply {
    pub sentences: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub korean: Vec<String>,
    #[serde(default)]
    pub corrections: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// One aligned pair of a parallel reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairEntry {
    #[serde(default)]
    pub no: usize,
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub korean: Option<String>,
}

/// A translation problem reported by the model itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedIssue {
    #[serde(default)]
    pub no: usize,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

/// Reply to a parallel prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelReply {
    pub pairs: Vec<PairEntry>,
    #[serde(default)]
    pub korean_issues: Vec<ReportedIssue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Locate the JSON object in a reply that may carry code fences or prose
pub fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    raw.get(start..=end)
}

/// Parse a model reply into `T`, classifying any failure as malformed output
pub fn parse_reply<T: DeserializeOwned>(raw: &str, model: &str) -> Result<T, GenerationFailure> {
    let context = FailureContext::for_model(model);
    let json = extract_json(raw).ok_or_else(|| {
        debug!("Reply without a JSON object: {:.200}", raw);
        classify(
            &ProviderError::ParseError("reply contains no JSON object".to_string()),
            &context,
        )
    })?;

    serde_json::from_str(json).map_err(|e| {
        debug!("Reply does not match the expected schema: {}", e);
        classify(
            &ProviderError::ParseError(format!("invalid JSON reply: {}", e)),
            &context,
        )
    })
}
