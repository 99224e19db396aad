/*!
 * Tests for the English/Korean alignment analyzer
 */

use std::sync::Arc;

use kobisplit::providers::mock::MockGenerationClient;
use kobisplit::segmentation::alignment::{Alignment, AlignmentQuality, analyze, analyze_with};
use kobisplit::segmentation::{EngineOptions, IssueThresholds, SegmentationEngine};

use crate::common;

#[test]
fn test_analyze_samplePair_shouldBeGood() {
    let (english, korean) = common::sample_pair();
    let signal = analyze(english, korean);
    assert_eq!(signal.english_count, 2);
    assert_eq!(signal.korean_count, 2);
    assert_eq!(signal.alignment, Alignment::Perfect);
    assert_eq!(signal.quality, AlignmentQuality::Good);
}

#[test]
fn test_analyze_mismatchAndShortTranslation_shouldBePoor() {
    let english = "The committee spent several long hours discussing every detail of the annual budget. It agreed.";
    let signal = analyze(english, "예산.");
    assert_eq!(signal.alignment, Alignment::Mismatched);
    assert_eq!(signal.signals.len(), 2);
    assert_eq!(signal.quality, AlignmentQuality::Poor);
}

#[test]
fn test_analyzeWith_relaxedThresholds_shouldSilenceShortWarning() {
    let english = "The committee spent several long hours discussing every detail of the annual budget.";
    let thresholds = IssueThresholds {
        incomplete_min_words: 50,
        ..IssueThresholds::default()
    };
    assert!(analyze(english, "예산.").has_anomalies());
    assert!(!analyze_with(english, "예산.", &thresholds).has_anomalies());
}

#[test]
fn test_engineAnalyze_shouldUseConfiguredThresholds() {
    let thresholds = IssueThresholds {
        latin_run_max_count: 0,
        ..IssueThresholds::default()
    };
    let engine = SegmentationEngine::new(
        Arc::new(MockGenerationClient::faithful()),
        EngineOptions {
            thresholds,
            ..EngineOptions::default()
        },
    );
    let signal = engine.analyze("He opened Slack.", "그는 Slack을 열었다.");
    assert!(signal.signals.iter().any(|s| s.contains("untranslated")));
}

#[test]
fn test_alignmentSignal_serialize_shouldUseCamelCase() {
    let signal = analyze("I came.", "나는 왔다.");
    let json = serde_json::to_value(&signal).unwrap();
    assert_eq!(json["englishCount"], 1);
    assert_eq!(json["koreanCount"], 1);
    assert_eq!(json["alignment"], "perfect");
    assert_eq!(json["quality"], "good");
}
