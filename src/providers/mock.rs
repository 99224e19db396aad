/*!
 * Mock generation clients for testing.
 *
 * This module provides scripted clients that simulate different model behaviors:
 * - `MockGenerationClient::fixed()` - Always returns the same reply
 * - `MockGenerationClient::faithful()` - Answers every prompt correctly, copying text verbatim
 * - `MockGenerationClient::failing()` - Always fails with a classified failure
 * - `MockGenerationClient::slow()` - Replies after a delay (for timeout testing)
 * - `MockGenerationClient::with_handler()` - Decides per prompt
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::{FailureKind, GenerationFailure};
use crate::providers::{GenerationClient, ProviderKind};
use crate::segmentation::prompts::{self, PromptTask, Section};
use crate::segmentation::regex_splitter::{segment_english, segment_korean};
use crate::segmentation::response::{AiSentence, AiSplitReply, PairEntry, ParallelReply, VerifyReply};

/// What the mock does for one call
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Reply immediately
    Text(String),
    /// Fail immediately
    Failure(GenerationFailure),
    /// Reply after a delay
    Delayed { delay_ms: u64, text: String },
}

/// Per-call decision function, given the prompt and model id
pub type ReplyHandler = Arc<dyn Fn(&str, &str) -> MockReply + Send + Sync>;

/// Scripted generation client
#[derive(Clone)]
pub struct MockGenerationClient {
    handler: ReplyHandler,
    /// Number of calls received, shared across clones
    request_count: Arc<AtomicUsize>,
    /// Prompts received, in arrival order
    prompts: Arc<Mutex<Vec<String>>>,
}

impl fmt::Debug for MockGenerationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockGenerationClient")
            .field("request_count", &self.request_count())
            .finish()
    }
}

impl MockGenerationClient {
    /// Create a client deciding each reply with `handler`
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str, &str) -> MockReply + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a client that always returns `text`
    pub fn fixed(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::with_handler(move |_, _| MockReply::Text(text.clone()))
    }

    /// Create a client that always fails with `kind`
    pub fn failing(kind: FailureKind) -> Self {
        Self::with_handler(move |_, model| MockReply::Failure(mock_failure(kind, model)))
    }

    /// Create a client that returns `text` after `delay_ms`
    pub fn slow(delay_ms: u64, text: impl Into<String>) -> Self {
        let text = text.into();
        Self::with_handler(move |_, _| MockReply::Delayed {
            delay_ms,
            text: text.clone(),
        })
    }

    /// Create a client that answers every prompt correctly
    pub fn faithful() -> Self {
        Self::with_handler(|prompt, _| MockReply::Text(faithful_reply(prompt)))
    }

    /// Create a client that computes the correct reply and then lets `map` alter it
    pub fn faithful_then<F>(map: F) -> Self
    where
        F: Fn(&str, String) -> MockReply + Send + Sync + 'static,
    {
        Self::with_handler(move |prompt, _| map(prompt, faithful_reply(prompt)))
    }

    /// Number of calls received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn complete(&self, prompt: &str, model_id: &str) -> Result<String, GenerationFailure> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        match (self.handler)(prompt, model_id) {
            MockReply::Text(text) => Ok(text),
            MockReply::Failure(failure) => Err(failure),
            MockReply::Delayed { delay_ms, text } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(text)
            }
        }
    }
}

/// A failure shaped like the classifier would produce it
pub fn mock_failure(kind: FailureKind, model: &str) -> GenerationFailure {
    let provider = ProviderKind::for_model(model).map_or("unknown", |p| p.as_str());
    GenerationFailure::new(kind, format!("mock {} failure", kind), provider, model)
}

/// Correct reply for any engine prompt, built from the passages in the prompt.
///
/// English sentences come from the regex splitter and are therefore exact
/// slices of the source. Korean is paired positionally when the counts match;
/// otherwise the whole translation goes to the first pair.
pub fn faithful_reply(prompt: &str) -> String {
    let english = prompts::section(prompt, Section::English).unwrap_or_default();
    let korean = prompts::section(prompt, Section::Korean);
    let sentences = segment_english(english).texts();
    let korean_parts = korean.map(|k| distribute_korean(k, sentences.len()));

    let reply = match prompts::task_of(prompt) {
        Some(PromptTask::Split) => serde_json::to_string(&AiSplitReply {
            sentences: sentences
                .iter()
                .enumerate()
                .map(|(idx, text)| AiSentence {
                    text: text.to_string(),
                    korean: korean_parts.as_ref().and_then(|parts| parts[idx].clone()),
                    confidence: None,
                })
                .collect(),
            confidence: Some(0.95),
        }),
        Some(PromptTask::Verify) => serde_json::to_string(&VerifyReply {
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
            korean: korean_parts
                .map(|parts| parts.into_iter().map(Option::unwrap_or_default).collect())
                .unwrap_or_default(),
            corrections: Vec::new(),
            confidence: Some(0.95),
        }),
        Some(PromptTask::Parallel) => serde_json::to_string(&ParallelReply {
            pairs: sentences
                .iter()
                .enumerate()
                .map(|(idx, text)| PairEntry {
                    no: idx + 1,
                    english: text.to_string(),
                    korean: korean_parts.as_ref().and_then(|parts| parts[idx].clone()),
                })
                .collect(),
            korean_issues: Vec::new(),
            confidence: None,
        }),
        None => Ok("{}".to_string()),
    };
    reply.unwrap_or_else(|_| "{}".to_string())
}

fn distribute_korean(korean: &str, slots: usize) -> Vec<Option<String>> {
    let parts = segment_korean(korean);
    if parts.len() == slots {
        return parts.into_iter().map(|p| Some(p.to_string())).collect();
    }
    let mut slotted = vec![None; slots];
    if let Some(first) = slotted.first_mut() {
        *first = Some(korean.trim().to_string());
    }
    slotted
}
