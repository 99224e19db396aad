/*!
 * Model-backed segmentation: `ai` and `ai-verify`.
 *
 * `ai` trusts the model and records that it did so. `ai-verify` starts from
 * the regex result, lets the model move boundaries, and rejects any reply
 * whose rejoined text differs from the source.
 */

use std::time::Duration;

use log::{debug, info, warn};

use crate::errors::SplitError;
use crate::providers::{GenerationClient, complete_with_timeout};

use super::fidelity::verify_preserved;
use super::model::{Sentence, SplitMode, SplitResult};
use super::prompts::{split_prompt, verify_prompt};
use super::quality::{IssueThresholds, check_korean_drift, scan_pair, summarize_issues};
use super::regex_splitter::{self, segment_korean};
use super::response::{AiSplitReply, VerifyReply, parse_reply};

/// Confidence assumed when the model does not report one
pub const DEFAULT_MODEL_CONFIDENCE: f64 = 0.85;

/// Warning attached to every `ai` result
pub const UNVERIFIED_WARNING: &str =
    "Sentences were not checked against the source text; use ai-verify for a fidelity guarantee";

/// One model, one client, one deadline
#[derive(Debug, Clone, Copy)]
pub struct ModelCall<'a> {
    pub client: &'a dyn GenerationClient,
    pub model: &'a str,
    pub timeout: Duration,
}

impl<'a> ModelCall<'a> {
    pub fn new(client: &'a dyn GenerationClient, model: &'a str, timeout: Duration) -> Self {
        Self { client, model, timeout }
    }

    /// Send a prompt under the deadline
    pub async fn ask(&self, prompt: &str) -> Result<String, SplitError> {
        Ok(complete_with_timeout(self.client, prompt, self.model, self.timeout).await?)
    }
}

fn present(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

fn model_confidence(reported: Option<f64>) -> f64 {
    reported
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_MODEL_CONFIDENCE)
        .clamp(0.0, 1.0)
}

/// Segment with the model, without checking its output against the source
pub async fn split_ai(
    call: &ModelCall<'_>,
    english: &str,
    korean: Option<&str>,
) -> Result<SplitResult, SplitError> {
    if english.trim().is_empty() {
        return Ok(SplitResult::empty(SplitMode::Ai));
    }
    let korean = present(korean);

    let raw = call.ask(&split_prompt(english, korean)).await?;
    let reply: AiSplitReply = parse_reply(&raw, call.model)?;

    if reply.sentences.is_empty() {
        return Err(SplitError::SchemaViolation("model returned no sentences".to_string()));
    }
    if let Some(pos) = reply.sentences.iter().position(|s| s.text.trim().is_empty()) {
        return Err(SplitError::SchemaViolation(format!(
            "sentence {} has empty text",
            pos + 1
        )));
    }

    let confidence = model_confidence(reply.confidence);
    let sentences = reply
        .sentences
        .into_iter()
        .enumerate()
        .map(|(idx, sentence)| {
            let own = sentence.confidence.map_or(confidence, |c| model_confidence(Some(c)));
            let translation = if korean.is_some() { sentence.korean } else { None };
            Sentence::new(idx + 1, sentence.text.trim(), own).with_korean(translation)
        })
        .collect::<Vec<_>>();

    debug!("Model {} returned {} sentences", call.model, sentences.len());

    Ok(SplitResult {
        sentences,
        confidence,
        method: SplitMode::Ai,
        model: Some(call.model.to_string()),
        warnings: vec![UNVERIFIED_WARNING.to_string()],
        korean_issues: Vec::new(),
    })
}

/// Notes describing where the model moved boundaries
fn boundary_corrections(baseline: &[&str], corrected: &[&str], reported: &[String]) -> Vec<String> {
    if baseline == corrected {
        if !reported.is_empty() {
            debug!("Model reported corrections but returned the baseline unchanged");
        }
        return Vec::new();
    }

    let mut notes = vec![format!(
        "Model adjusted sentence boundaries: {} regex sentences became {}",
        baseline.len(),
        corrected.len()
    )];
    if reported.iter().any(|note| !note.trim().is_empty()) {
        notes.extend(
            reported
                .iter()
                .filter(|note| !note.trim().is_empty())
                .map(|note| format!("Correction: {}", note.trim())),
        );
    } else {
        notes.extend(
            corrected
                .iter()
                .filter(|sentence| !baseline.contains(sentence))
                .map(|sentence| format!("Correction: new boundary at \"{}\"", sentence)),
        );
    }
    notes
}

/// Segment with the regex splitter, let the model correct boundaries, and
/// fail if the corrected sentences no longer reproduce the source
pub async fn split_ai_verify(
    call: &ModelCall<'_>,
    english: &str,
    korean: Option<&str>,
    thresholds: &IssueThresholds,
) -> Result<SplitResult, SplitError> {
    if english.trim().is_empty() {
        return Ok(SplitResult::empty(SplitMode::AiVerify));
    }
    let korean = present(korean);

    let baseline = regex_splitter::split(english, korean);
    let baseline_contents = baseline.contents();

    let raw = call
        .ask(&verify_prompt(english, &baseline_contents, korean))
        .await?;
    let reply: VerifyReply = parse_reply(&raw, call.model)?;

    if reply.sentences.is_empty() {
        return Err(SplitError::SchemaViolation("model returned no sentences".to_string()));
    }
    let pieces: Vec<&str> = reply.sentences.iter().map(|s| s.trim()).collect();
    if let Some(pos) = pieces.iter().position(|s| s.is_empty()) {
        return Err(SplitError::SchemaViolation(format!(
            "sentence {} is empty",
            pos + 1
        )));
    }

    verify_preserved(english, &pieces)?;

    let mut warnings = boundary_corrections(&baseline_contents, &pieces, &reply.corrections);
    let confidence = model_confidence(reply.confidence);
    let mut sentences: Vec<Sentence> = pieces
        .iter()
        .enumerate()
        .map(|(idx, text)| Sentence::new(idx + 1, *text, confidence))
        .collect();

    let mut korean_issues = Vec::new();
    if let Some(korean) = korean {
        let translations = if !reply.korean.is_empty() {
            if let Some(issue) = check_korean_drift(korean, &reply.korean, thresholds) {
                korean_issues.push(issue);
            }
            if reply.korean.len() == sentences.len() {
                Some(reply.korean.clone())
            } else {
                warn!(
                    "Model returned {} Korean segments for {} sentences",
                    reply.korean.len(),
                    sentences.len()
                );
                None
            }
        } else {
            None
        };

        let translations = translations.or_else(|| {
            let fallback = segment_korean(korean);
            (fallback.len() == sentences.len())
                .then(|| fallback.into_iter().map(str::to_string).collect())
        });

        match translations {
            Some(translations) => {
                for (sentence, translation) in sentences.iter_mut().zip(translations) {
                    korean_issues.extend(scan_pair(
                        sentence.index,
                        &sentence.content,
                        Some(&translation),
                        thresholds,
                    ));
                    sentence.korean_translation = Some(translation).filter(|t| !t.trim().is_empty());
                }
            }
            None => {
                info!("Korean translation could not be aligned to {} sentences", sentences.len());
                warnings.push(format!(
                    "Sentence count mismatch: {} English sentences could not be paired with the Korean translation",
                    sentences.len()
                ));
            }
        }
    }

    if let Some(summary) = summarize_issues(&korean_issues) {
        warnings.push(summary);
    }

    Ok(SplitResult {
        sentences,
        confidence,
        method: SplitMode::AiVerify,
        model: Some(call.model.to_string()),
        warnings,
        korean_issues,
    })
}
