/*!
 * Parallel bilingual extraction.
 *
 * The model returns aligned English/Korean pairs in one pass. English is held
 * to the fidelity check and any difference is fatal. Korean is compared
 * leniently; its defects become `TranslationIssue`s on a successful result and
 * the Korean text itself is returned exactly as the model gave it.
 */

use std::collections::HashMap;

use log::{debug, warn};

use crate::errors::SplitError;

use super::ai_splitter::ModelCall;
use super::fidelity::verify_preserved;
use super::model::{IssueKind, Sentence, Severity, SplitMode, SplitResult, TranslationIssue};
use super::normalize::flatten_line_breaks;
use super::prompts::parallel_prompt;
use super::quality::{IssueThresholds, check_korean_drift, scan_pair, summarize_issues};
use super::response::{PairEntry, ParallelReply, ReportedIssue, parse_reply};

/// Confidence assumed when the model does not report one
pub const DEFAULT_PARALLEL_CONFIDENCE: f64 = 0.9;

/// A pair that survived the empty-English filter, with its new 1-based index
struct KeptPair {
    index: usize,
    english: String,
    korean: Option<String>,
}

/// Drop pairs without English and renumber the rest.
///
/// Returns the kept pairs and a map from the model's pair numbers to the new
/// indices.
fn keep_pairs(pairs: Vec<PairEntry>) -> (Vec<KeptPair>, HashMap<usize, usize>) {
    let mut kept = Vec::with_capacity(pairs.len());
    let mut renumbered = HashMap::new();

    for (position, pair) in pairs.into_iter().enumerate() {
        if pair.english.trim().is_empty() {
            warn!(
                "Dropping pair {} without English text (korean: {:?})",
                position + 1,
                pair.korean
            );
            continue;
        }
        let index = kept.len() + 1;
        let reported_no = if pair.no == 0 { position + 1 } else { pair.no };
        renumbered.entry(reported_no).or_insert(index);
        kept.push(KeptPair {
            index,
            english: pair.english.trim().to_string(),
            korean: pair.korean,
        });
    }

    (kept, renumbered)
}

/// Convert the model's own issue report, pointing at renumbered pairs
fn convert_reported(issue: ReportedIssue, renumbered: &HashMap<usize, usize>) -> TranslationIssue {
    let kind = IssueKind::from_label(&issue.kind);
    let severity = issue
        .severity
        .as_deref()
        .and_then(Severity::from_label)
        .unwrap_or(Severity::Medium);
    let sentence_index = match issue.no {
        0 => 0,
        no => renumbered.get(&no).copied().unwrap_or(no),
    };
    let description = if issue.description.trim().is_empty() {
        format!("Model reported a {} issue", issue.kind.trim())
    } else {
        issue.description.trim().to_string()
    };
    TranslationIssue::new(kind, sentence_index, description, severity, true)
}

/// Extract aligned English/Korean pairs from a passage and its translation
pub async fn extract_pairs(
    call: &ModelCall<'_>,
    english: &str,
    korean: &str,
    thresholds: &IssueThresholds,
) -> Result<SplitResult, SplitError> {
    let english = flatten_line_breaks(english);
    if english.trim().is_empty() {
        return Ok(SplitResult::empty(SplitMode::Parallel));
    }
    let korean = flatten_line_breaks(korean);
    if korean.trim().is_empty() {
        return Err(SplitError::MissingTranslation);
    }

    let raw = call.ask(&parallel_prompt(&english, &korean)).await?;
    let reply: ParallelReply = parse_reply(&raw, call.model)?;
    if reply.pairs.is_empty() {
        return Err(SplitError::SchemaViolation("model returned no pairs".to_string()));
    }

    let returned_korean: Vec<String> = reply
        .pairs
        .iter()
        .filter_map(|pair| pair.korean.clone())
        .filter(|k| !k.trim().is_empty())
        .collect();

    let (pairs, renumbered) = keep_pairs(reply.pairs);
    if pairs.is_empty() {
        return Err(SplitError::SchemaViolation(
            "model returned no pairs with English text".to_string(),
        ));
    }

    // English is fatal and checked before any Korean drift is measured
    let english_pieces: Vec<&str> = pairs.iter().map(|pair| pair.english.as_str()).collect();
    verify_preserved(&english, &english_pieces)?;

    let drift = check_korean_drift(&korean, &returned_korean, thresholds);
    let mut korean_issues: Vec<TranslationIssue> = drift.into_iter().collect();
    for pair in &pairs {
        korean_issues.extend(scan_pair(
            pair.index,
            &pair.english,
            pair.korean.as_deref(),
            thresholds,
        ));
    }
    korean_issues.extend(
        reply
            .korean_issues
            .into_iter()
            .map(|issue| convert_reported(issue, &renumbered)),
    );

    let confidence = reply
        .confidence
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_PARALLEL_CONFIDENCE)
        .clamp(0.0, 1.0);

    let sentences: Vec<Sentence> = pairs
        .into_iter()
        .map(|pair| Sentence::new(pair.index, pair.english, confidence).with_korean(pair.korean))
        .collect();

    debug!(
        "Parallel extraction produced {} pairs and {} Korean issues",
        sentences.len(),
        korean_issues.len()
    );

    let warnings = summarize_issues(&korean_issues).into_iter().collect();

    Ok(SplitResult {
        sentences,
        confidence,
        method: SplitMode::Parallel,
        model: Some(call.model.to_string()),
        warnings,
        korean_issues,
    })
}
