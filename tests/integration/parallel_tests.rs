/*!
 * Parallel extraction: Korean drift tolerance, pair renumbering and
 * model-reported issues
 */

use std::time::Duration;

use serde_json::json;

use kobisplit::errors::SplitError;
use kobisplit::providers::mock::MockGenerationClient;
use kobisplit::segmentation::ai_splitter::ModelCall;
use kobisplit::segmentation::parallel::extract_pairs;
use kobisplit::segmentation::{IssueKind, IssueThresholds, Severity, SplitMode, SplitRequest, SplitResult};

use crate::common::{self, TEST_MODEL};

const ENGLISH: &str = "I run. You walk.";

/// A 600-character Korean translation split over two sentences
fn korean_600() -> (String, String) {
    (format!("{}.", "가".repeat(299)), format!("{}.", "나".repeat(298)))
}

fn pair_reply(first_korean: &str, second_korean: &str) -> String {
    json!({
        "pairs": [
            {"no": 1, "english": "I run.", "korean": first_korean},
            {"no": 2, "english": "You walk.", "korean": second_korean}
        ]
    })
    .to_string()
}

async fn run_parallel(
    client: &MockGenerationClient,
    english: &str,
    korean: &str,
) -> Result<SplitResult, SplitError> {
    let request = SplitRequest::new(english, Some(korean.to_string()), TEST_MODEL, SplitMode::Parallel);
    common::engine_with(client).run(&request).await
}

#[tokio::test]
async fn test_parallel_koreanDeltaFiveOfSixHundred_shouldReportNothing() {
    let (first, second) = korean_600();
    let source = format!("{} {}", first, second);
    assert_eq!(source.chars().count(), 600);

    let shortened = format!("{}.", "가".repeat(294));
    let client = MockGenerationClient::fixed(pair_reply(&shortened, &second));
    let result = run_parallel(&client, ENGLISH, &source).await.unwrap();

    assert!(result.korean_issues.is_empty());
    assert!(result.warnings.is_empty());
    assert_eq!(result.sentences[0].korean_translation.as_deref(), Some(shortened.as_str()));
}

#[tokio::test]
async fn test_parallel_koreanDeltaSixtyOfSixHundred_shouldReportOneModifiedIssue() {
    let (first, second) = korean_600();
    let source = format!("{} {}", first, second);

    let shortened = format!("{}.", "가".repeat(239));
    let client = MockGenerationClient::fixed(pair_reply(&shortened, &second));
    let result = run_parallel(&client, ENGLISH, &source).await.unwrap();

    assert_eq!(result.korean_issues.len(), 1);
    let issue = &result.korean_issues[0];
    assert_eq!(issue.kind, IssueKind::Modified);
    assert_eq!(issue.severity, Severity::Medium);
    assert_eq!(issue.sentence_index, 0);
    assert!(issue.needs_review);
    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn test_parallel_emptyEnglishPair_shouldBeDroppedAndRenumbered() {
    let reply = json!({
        "pairs": [
            {"no": 1, "english": "I run.", "korean": "나는 달린다."},
            {"no": 2, "english": "  ", "korean": "흠."},
            {"no": 3, "english": "You walk.", "korean": "너는 걷는다."}
        ],
        "korean_issues": [
            {"no": 3, "type": "quality", "severity": "low", "description": "Awkward word order"}
        ],
        "confidence": 0.93
    })
    .to_string();
    let client = MockGenerationClient::fixed(reply);

    let result = run_parallel(&client, ENGLISH, "나는 달린다. 너는 걷는다.").await.unwrap();

    assert_eq!(result.contents(), vec!["I run.", "You walk."]);
    assert_eq!(result.sentences[1].index, 2);
    assert_eq!(result.confidence, 0.93);
    assert_eq!(result.korean_issues.len(), 1);
    let issue = &result.korean_issues[0];
    assert_eq!(issue.kind, IssueKind::Quality);
    assert_eq!(issue.sentence_index, 2);
    assert_eq!(issue.severity, Severity::Low);
    assert!(issue.needs_review);
    assert_eq!(result.warnings, vec!["1 Korean translation issue(s) detected, 1 need review".to_string()]);
}

#[tokio::test]
async fn test_parallel_koreanSpacing_shouldBeReturnedVerbatim() {
    let client = MockGenerationClient::fixed(pair_reply("나는  달린다.", "너는 걷는다."));
    let result = run_parallel(&client, ENGLISH, "나는 달린다. 너는 걷는다.").await.unwrap();

    assert_eq!(result.sentences[0].korean_translation.as_deref(), Some("나는  달린다."));
    assert!(result.korean_issues.is_empty());
}

#[tokio::test]
async fn test_parallel_longUntranslatedKorean_shouldBeInformational() {
    let english = "The engineers reviewed the deployment plan for the new storage cluster yesterday.";
    let korean = "엔지니어들은 yesterday new storage cluster deployment plan review 를 했다.";
    let reply = json!({"pairs": [{"no": 1, "english": english, "korean": korean}]}).to_string();
    let client = MockGenerationClient::fixed(reply);

    let result = run_parallel(&client, english, korean).await.unwrap();

    assert!(!result.korean_issues.is_empty());
    assert!(result.korean_issues.iter().all(|issue| !issue.needs_review));
    assert!(result.korean_issues.iter().any(|issue| issue.kind == IssueKind::Quality));
    assert_eq!(result.issues_needing_review().count(), 0);
}

#[tokio::test]
async fn test_parallel_faithfulModelWithLineBreaks_shouldFlattenBeforeSplitting() {
    let client = MockGenerationClient::faithful();
    let result = run_parallel(&client, "The cell holds\na broken line. Next.", "셀에 줄바꿈이\n있다. 다음.")
        .await
        .unwrap();

    assert_eq!(result.contents(), vec!["The cell holds a broken line.", "Next."]);
    assert_eq!(result.sentences[0].korean_translation.as_deref(), Some("셀에 줄바꿈이 있다."));
    assert!(!client.prompts()[0].contains("holds\na broken"));
}

#[tokio::test]
async fn test_extractPairs_blankKorean_shouldRequireTranslation() {
    let client = MockGenerationClient::faithful();
    let call = ModelCall::new(&client, TEST_MODEL, Duration::from_secs(5));

    let err = extract_pairs(&call, ENGLISH, " \n ", &IssueThresholds::default())
        .await
        .unwrap_err();

    assert!(matches!(err, SplitError::MissingTranslation));
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_extractPairs_noPairs_shouldBeSchemaViolation() {
    let client = MockGenerationClient::fixed(r#"{"pairs": []}"#);
    let call = ModelCall::new(&client, TEST_MODEL, Duration::from_secs(5));

    let err = extract_pairs(&call, ENGLISH, "나는 달린다.", &IssueThresholds::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind_label(), "schema_violation");
}
