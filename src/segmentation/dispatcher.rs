/*!
 * Strategy dispatch.
 *
 * `SegmentationEngine` is the single entry point for one passage. It owns no
 * mutable state; the generation client is injected once at construction.
 */

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::app_config::EngineConfig;
use crate::errors::SplitError;
use crate::providers::GenerationClient;

use super::ai_splitter::{ModelCall, split_ai, split_ai_verify};
use super::alignment::{AlignmentSignal, analyze_with};
use super::model::{SplitMode, SplitResult};
use super::parallel::extract_pairs;
use super::quality::IssueThresholds;
use super::regex_splitter;

/// Tolerance for comparing confidences against the escalation threshold
const CONFIDENCE_EPSILON: f64 = 1e-9;

/// Engine tuning
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Deadline for one model call
    pub call_timeout: Duration,
    /// Minimum regex confidence accepted by hybrid mode
    pub escalation_threshold: f64,
    /// Bound on concurrent passages in a batch
    pub max_concurrent_requests: usize,
    pub thresholds: IssueThresholds,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for EngineOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            call_timeout: Duration::from_secs(config.call_timeout_secs),
            escalation_threshold: config.escalation_threshold,
            max_concurrent_requests: config.max_concurrent_requests.max(1),
            thresholds: config.thresholds.clone(),
        }
    }
}

/// One passage to segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRequest {
    pub english: String,
    #[serde(default)]
    pub korean: Option<String>,
    pub model: String,
    #[serde(default)]
    pub mode: SplitMode,
}

impl SplitRequest {
    pub fn new(english: impl Into<String>, korean: Option<String>, model: impl Into<String>, mode: SplitMode) -> Self {
        Self {
            english: english.into(),
            korean,
            model: model.into(),
            mode,
        }
    }

    fn korean(&self) -> Option<&str> {
        self.korean.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// Whether hybrid mode should replace a regex result with a model result.
///
/// The regex result stands only when its confidence reaches the threshold,
/// it carries no warnings, and the alignment analyzer saw nothing odd.
pub fn should_escalate(result: &SplitResult, signal: Option<&AlignmentSignal>, threshold: f64) -> bool {
    let confident = result.confidence + CONFIDENCE_EPSILON >= threshold;
    let anomalies = signal.is_some_and(AlignmentSignal::has_anomalies);
    !confident || !result.warnings.is_empty() || anomalies
}

/// Segmentation engine
#[derive(Debug, Clone)]
pub struct SegmentationEngine {
    client: Arc<dyn GenerationClient>,
    options: EngineOptions,
}

impl SegmentationEngine {
    pub fn new(client: Arc<dyn GenerationClient>, options: EngineOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn model_call<'a>(&'a self, model: &'a str) -> ModelCall<'a> {
        ModelCall::new(self.client.as_ref(), model, self.options.call_timeout)
    }

    /// Compare a passage with its translation without calling a model
    pub fn analyze(&self, english: &str, korean: &str) -> AlignmentSignal {
        analyze_with(english, korean, &self.options.thresholds)
    }

    /// Segment one passage with the requested strategy
    pub async fn run(&self, request: &SplitRequest) -> Result<SplitResult, SplitError> {
        if request.english.trim().is_empty() {
            return Ok(SplitResult::empty(request.mode));
        }

        let english = request.english.as_str();
        let korean = request.korean();
        let call = self.model_call(&request.model);
        let thresholds = &self.options.thresholds;

        match request.mode {
            SplitMode::Regex => Ok(regex_splitter::split(english, korean)),
            SplitMode::Ai => split_ai(&call, english, korean).await,
            SplitMode::AiVerify => split_ai_verify(&call, english, korean, thresholds).await,
            SplitMode::Hybrid => self.run_hybrid(&call, english, korean).await,
            SplitMode::Parallel => match korean {
                Some(korean) => extract_pairs(&call, english, korean, thresholds).await,
                None => {
                    info!("No Korean translation supplied; running ai-verify instead of parallel");
                    split_ai_verify(&call, english, None, thresholds).await
                }
            },
        }
    }

    async fn run_hybrid(
        &self,
        call: &ModelCall<'_>,
        english: &str,
        korean: Option<&str>,
    ) -> Result<SplitResult, SplitError> {
        let regex_result = regex_splitter::split(english, korean);
        let signal = korean.map(|k| self.analyze(english, k));

        if !should_escalate(&regex_result, signal.as_ref(), self.options.escalation_threshold) {
            debug!(
                "Regex confidence {:.2} sufficient, no escalation",
                regex_result.confidence
            );
            return Ok(regex_result);
        }

        info!(
            "Escalating to {} (regex confidence {:.2}, {} warnings, {} alignment signals)",
            call.model,
            regex_result.confidence,
            regex_result.warnings.len(),
            signal.as_ref().map_or(0, |s| s.signals.len())
        );
        let mut result = split_ai(call, english, korean).await?;
        result.method = SplitMode::Hybrid;
        Ok(result)
    }
}
