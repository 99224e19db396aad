/*!
 * Data model for segmentation results.
 *
 * A `SplitResult` is built once per request and handed back to the caller;
 * nothing in this module is persisted.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Segmentation strategy, used both for the requested mode and for the
/// method that actually produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitMode {
    /// Deterministic regex splitter only
    Regex,
    /// Model segments from scratch
    Ai,
    /// Regex first, escalate to the model on low confidence
    Hybrid,
    /// Model reviews the regex result under a fidelity check
    AiVerify,
    /// Model extracts aligned English/Korean pairs
    #[default]
    Parallel,
}

impl SplitMode {
    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Ai => "ai",
            Self::Hybrid => "hybrid",
            Self::AiVerify => "ai-verify",
            Self::Parallel => "parallel",
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SplitMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "regex" => Ok(Self::Regex),
            "ai" => Ok(Self::Ai),
            "hybrid" => Ok(Self::Hybrid),
            "ai-verify" | "ai_verify" | "aiverify" => Ok(Self::AiVerify),
            "parallel" => Ok(Self::Parallel),
            _ => Err(anyhow!("Invalid split mode: {}", s)),
        }
    }
}

/// One segmented sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    /// 1-based position within the result
    pub index: usize,
    /// Exact text of the sentence as found in the source
    pub content: String,
    /// Whitespace-token count of `content`
    pub word_count: usize,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Aligned Korean translation, when one was supplied and alignment succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub korean_translation: Option<String>,
    /// Non-fatal diagnostic notes
    #[serde(default)]
    pub issues: Vec<String>,
}

impl Sentence {
    /// Create a sentence, deriving the word count from the content
    pub fn new(index: usize, content: impl Into<String>, confidence: f64) -> Self {
        let content = content.into();
        Self {
            index,
            word_count: word_count(&content),
            content,
            confidence: confidence.clamp(0.0, 1.0),
            korean_translation: None,
            issues: Vec::new(),
        }
    }

    /// Attach a Korean translation; blank strings are treated as absent
    pub fn with_korean(mut self, korean: Option<String>) -> Self {
        self.korean_translation = korean.filter(|k| !k.trim().is_empty());
        self
    }
}

/// Count whitespace-separated tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Kind of Korean translation defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Missing,
    Incomplete,
    Quality,
    Modified,
}

impl IssueKind {
    /// Lenient parse of a model-reported kind; unknown labels map to `Quality`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "missing" => Self::Missing,
            "incomplete" => Self::Incomplete,
            "modified" => Self::Modified,
            _ => Self::Quality,
        }
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Lenient parse of a model-reported severity
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// A detected defect in a Korean translation; never fails the English side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    /// Pair the issue refers to, 0 for the whole passage
    pub sentence_index: usize,
    pub description: String,
    pub severity: Severity,
    /// True when an operator must look at it, false for informational notes
    pub needs_review: bool,
}

impl TranslationIssue {
    pub fn new(
        kind: IssueKind,
        sentence_index: usize,
        description: impl Into<String>,
        severity: Severity,
        needs_review: bool,
    ) -> Self {
        Self {
            kind,
            sentence_index,
            description: description.into(),
            severity,
            needs_review,
        }
    }
}

/// Output of any single-passage strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitResult {
    pub sentences: Vec<Sentence>,
    /// Aggregate confidence
    pub confidence: f64,
    /// Strategy that actually produced this result
    pub method: SplitMode,
    /// Generation model used, absent for regex-only results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub korean_issues: Vec<TranslationIssue>,
}

impl SplitResult {
    /// Result for an empty passage
    pub fn empty(method: SplitMode) -> Self {
        Self {
            sentences: Vec::new(),
            confidence: 1.0,
            method,
            model: None,
            warnings: Vec::new(),
            korean_issues: Vec::new(),
        }
    }

    /// Number of sentences
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Whether no sentences were produced
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Sentence contents in order
    pub fn contents(&self) -> Vec<&str> {
        self.sentences.iter().map(|s| s.content.as_str()).collect()
    }

    /// Issues an operator has to look at
    pub fn issues_needing_review(&self) -> impl Iterator<Item = &TranslationIssue> {
        self.korean_issues.iter().filter(|issue| issue.needs_review)
    }
}
