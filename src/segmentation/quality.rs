/*!
 * Korean translation issue detection.
 *
 * Korean-side problems are advisory: they are collected as `TranslationIssue`
 * values and returned with a successful result. Nothing here edits the
 * translation text.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::model::{IssueKind, Severity, TranslationIssue, word_count};
use super::normalize::{join_pieces, normalize};

/// Korean length drift at or below this many characters is treated as noise
pub const DEFAULT_LENGTH_TOLERANCE_CHARS: usize = 5;

/// Korean length drift at or below this share of the source length is noise
pub const DEFAULT_LENGTH_TOLERANCE_RATIO: f64 = 0.01;

/// Incompleteness is only judged for English sentences longer than this
pub const DEFAULT_INCOMPLETE_MIN_WORDS: usize = 10;

/// Minimum expected Korean characters per English word
pub const DEFAULT_INCOMPLETE_CHARS_PER_WORD: f64 = 1.2;

/// Minimum length of a Latin letter run counted as untranslated English
pub const DEFAULT_LATIN_RUN_MIN_LEN: usize = 4;

/// More Latin runs than this flags a pair as leaking English
pub const DEFAULT_LATIN_RUN_MAX_COUNT: usize = 5;

static LATIN_RUN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]+").expect("Invalid latin run regex"));

/// Tunable thresholds for Korean issue detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueThresholds {
    #[serde(default = "default_length_tolerance_chars")]
    pub length_tolerance_chars: usize,

    #[serde(default = "default_length_tolerance_ratio")]
    pub length_tolerance_ratio: f64,

    #[serde(default = "default_incomplete_min_words")]
    pub incomplete_min_words: usize,

    #[serde(default = "default_incomplete_chars_per_word")]
    pub incomplete_chars_per_word: f64,

    #[serde(default = "default_latin_run_min_len")]
    pub latin_run_min_len: usize,

    #[serde(default = "default_latin_run_max_count")]
    pub latin_run_max_count: usize,
}

fn default_length_tolerance_chars() -> usize {
    DEFAULT_LENGTH_TOLERANCE_CHARS
}

fn default_length_tolerance_ratio() -> f64 {
    DEFAULT_LENGTH_TOLERANCE_RATIO
}

fn default_incomplete_min_words() -> usize {
    DEFAULT_INCOMPLETE_MIN_WORDS
}

fn default_incomplete_chars_per_word() -> f64 {
    DEFAULT_INCOMPLETE_CHARS_PER_WORD
}

fn default_latin_run_min_len() -> usize {
    DEFAULT_LATIN_RUN_MIN_LEN
}

fn default_latin_run_max_count() -> usize {
    DEFAULT_LATIN_RUN_MAX_COUNT
}

impl Default for IssueThresholds {
    fn default() -> Self {
        Self {
            length_tolerance_chars: DEFAULT_LENGTH_TOLERANCE_CHARS,
            length_tolerance_ratio: DEFAULT_LENGTH_TOLERANCE_RATIO,
            incomplete_min_words: DEFAULT_INCOMPLETE_MIN_WORDS,
            incomplete_chars_per_word: DEFAULT_INCOMPLETE_CHARS_PER_WORD,
            latin_run_min_len: DEFAULT_LATIN_RUN_MIN_LEN,
            latin_run_max_count: DEFAULT_LATIN_RUN_MAX_COUNT,
        }
    }
}

impl IssueThresholds {
    /// Whether a length delta is small enough to ignore
    pub fn is_tolerable_delta(&self, delta: usize, source_len: usize) -> bool {
        delta <= self.length_tolerance_chars
            || (delta as f64) <= source_len as f64 * self.length_tolerance_ratio
    }

    /// Whether a Korean text is implausibly short for an English sentence
    pub fn is_incomplete(&self, english: &str, korean: &str) -> bool {
        let words = word_count(english);
        if words <= self.incomplete_min_words {
            return false;
        }
        (korean_char_count(korean) as f64) < words as f64 * self.incomplete_chars_per_word
    }

    /// Whether a Korean text carries too much untranslated English
    pub fn has_untranslated_english(&self, korean: &str) -> bool {
        latin_run_count(korean, self.latin_run_min_len) > self.latin_run_max_count
    }
}

/// Non-whitespace character count
pub fn korean_char_count(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Number of runs of at least `min_len` Latin letters
pub fn latin_run_count(text: &str, min_len: usize) -> usize {
    LATIN_RUN_REGEX
        .find_iter(text)
        .filter(|m| m.as_str().len() >= min_len)
        .count()
}

/// Compare the rejoined Korean pieces with the source translation.
///
/// Returns a `modified` issue only when the normalized length delta exceeds
/// the tolerance; smaller drift is logged and ignored.
pub fn check_korean_drift<S: AsRef<str>>(
    source_korean: &str,
    pieces: &[S],
    thresholds: &IssueThresholds,
) -> Option<TranslationIssue> {
    let expected = normalize(source_korean);
    let actual = normalize(&join_pieces(pieces));
    if expected == actual {
        return None;
    }

    let expected_len = expected.chars().count();
    let actual_len = actual.chars().count();
    let delta = expected_len.abs_diff(actual_len);

    if thresholds.is_tolerable_delta(delta, expected_len) {
        debug!(
            "Korean text differs from source by {} characters, within tolerance",
            delta
        );
        return None;
    }

    let percent = if expected_len == 0 {
        100.0
    } else {
        delta as f64 / expected_len as f64 * 100.0
    };
    warn!(
        "Korean text differs from source by {} characters ({:.1}%)",
        delta, percent
    );

    Some(TranslationIssue::new(
        IssueKind::Modified,
        0,
        format!(
            "Korean text differs from the supplied translation: {} characters vs {} (delta {}, {:.1}%)",
            actual_len, expected_len, delta, percent
        ),
        Severity::Medium,
        true,
    ))
}

/// Per-pair scan of a Korean sentence against its English counterpart
pub fn scan_pair(
    sentence_index: usize,
    english: &str,
    korean: Option<&str>,
    thresholds: &IssueThresholds,
) -> Vec<TranslationIssue> {
    let mut issues = Vec::new();

    let korean = match korean.map(str::trim).filter(|k| !k.is_empty()) {
        Some(korean) => korean,
        None => {
            issues.push(TranslationIssue::new(
                IssueKind::Missing,
                sentence_index,
                "Korean translation is missing for this sentence",
                Severity::High,
                true,
            ));
            return issues;
        }
    };

    if thresholds.is_incomplete(english, korean) {
        issues.push(TranslationIssue::new(
            IssueKind::Incomplete,
            sentence_index,
            format!(
                "Korean translation looks short: {} characters for {} English words",
                korean_char_count(korean),
                word_count(english)
            ),
            Severity::Low,
            false,
        ));
    }

    if thresholds.has_untranslated_english(korean) {
        issues.push(TranslationIssue::new(
            IssueKind::Quality,
            sentence_index,
            format!(
                "Korean translation contains {} runs of untranslated English",
                latin_run_count(korean, thresholds.latin_run_min_len)
            ),
            Severity::Low,
            false,
        ));
    }

    issues
}

/// One-line summary of a non-empty issue list
pub fn summarize_issues(issues: &[TranslationIssue]) -> Option<String> {
    if issues.is_empty() {
        return None;
    }
    let review = issues.iter().filter(|issue| issue.needs_review).count();
    Some(format!(
        "{} Korean translation issue(s) detected, {} need review",
        issues.len(),
        review
    ))
}
