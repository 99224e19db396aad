/*!
 * English/Korean alignment heuristics.
 *
 * Read-only: produces a coarse signal used as a standalone report and as the
 * dispatcher's cue to escalate from the regex splitter to a model.
 */

use serde::{Deserialize, Serialize};

use super::model::word_count;
use super::quality::{IssueThresholds, korean_char_count, latin_run_count};
use super::regex_splitter::{segment_english, segment_korean};

/// Whether sentence counts line up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Perfect,
    Mismatched,
}

/// Coarse translation quality verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentQuality {
    Good,
    Fair,
    Poor,
}

/// Result of comparing an English passage with its Korean translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentSignal {
    pub english_count: usize,
    pub korean_count: usize,
    pub alignment: Alignment,
    pub quality: AlignmentQuality,
    /// Detected anomalies, empty when nothing looks off
    pub signals: Vec<String>,
}

impl AlignmentSignal {
    /// Whether anything suggests the regex result should not be trusted
    pub fn has_anomalies(&self) -> bool {
        !self.signals.is_empty()
    }
}

/// Analyze with the default thresholds
pub fn analyze(english: &str, korean: &str) -> AlignmentSignal {
    analyze_with(english, korean, &IssueThresholds::default())
}

/// Analyze an English passage against its Korean translation
pub fn analyze_with(english: &str, korean: &str, thresholds: &IssueThresholds) -> AlignmentSignal {
    let english_count = if english.trim().is_empty() {
        0
    } else {
        segment_english(english).sentences.len()
    };
    let korean_count = segment_korean(korean).len();

    let mut signals = Vec::new();

    let alignment = if english_count == korean_count {
        Alignment::Perfect
    } else {
        signals.push(format!(
            "Sentence count mismatch: {} English vs {} Korean",
            english_count, korean_count
        ));
        Alignment::Mismatched
    };

    let korean_blank = korean.trim().is_empty();
    if korean_blank && english_count > 0 {
        signals.push("Korean translation is empty".to_string());
    } else if !korean_blank {
        let words = word_count(english);
        let chars = korean_char_count(korean);
        if words > thresholds.incomplete_min_words
            && (chars as f64) < words as f64 * thresholds.incomplete_chars_per_word
        {
            signals.push(format!(
                "Korean translation looks short: {} characters for {} English words",
                chars, words
            ));
        }

        let runs = latin_run_count(korean, thresholds.latin_run_min_len);
        if runs > thresholds.latin_run_max_count {
            signals.push(format!(
                "Korean translation contains {} untranslated English tokens",
                runs
            ));
        }
    }

    let quality = match signals.len() {
        0 => AlignmentQuality::Good,
        1 if !korean_blank => AlignmentQuality::Fair,
        _ => AlignmentQuality::Poor,
    };

    AlignmentSignal {
        english_count,
        korean_count,
        alignment,
        quality,
        signals,
    }
}
