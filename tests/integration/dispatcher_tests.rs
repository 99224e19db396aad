/*!
 * Strategy selection, escalation and failure reporting through the engine
 */

use std::sync::Arc;

use kobisplit::errors::{FailureKind, ProviderError, SplitError};
use kobisplit::providers::classify::{FailureContext, classify};
use kobisplit::providers::mock::{MockGenerationClient, MockReply};
use kobisplit::segmentation::{EngineOptions, SegmentationEngine, SplitMode, SplitRequest, SplitResult, should_escalate};

use crate::common::{self, TEST_MODEL};

fn regex_result(confidence: f64) -> SplitResult {
    SplitResult {
        confidence,
        ..SplitResult::empty(SplitMode::Regex)
    }
}

#[test]
fn test_shouldEscalate_boundary_shouldHoldAtThreshold() {
    assert!(!should_escalate(&regex_result(0.9), None, 0.9));
    assert!(should_escalate(&regex_result(0.89), None, 0.9));
}

#[tokio::test]
async fn test_hybrid_confidenceExactlyThreshold_shouldReportRegex() {
    let client = MockGenerationClient::faithful();
    let engine = common::engine_with(&client);

    let result = engine
        .run(&SplitRequest::new("Dr. Smith arrived. He left.", None, TEST_MODEL, SplitMode::Hybrid))
        .await
        .unwrap();

    assert_eq!(result.confidence, 0.9);
    assert!(result.warnings.is_empty());
    assert_eq!(result.method, SplitMode::Regex);
    assert!(result.model.is_none());
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_hybrid_alignedKoreanWithComparative_shouldStayRegex() {
    let client = MockGenerationClient::faithful();
    let engine = common::engine_with(&client);

    let request = SplitRequest::new(
        "I am taller than you. He exercises every day.",
        Some("나는 너보다 키가 크다. 그는 날마다 운동한다.".to_string()),
        TEST_MODEL,
        SplitMode::Hybrid,
    );
    let result = engine.run(&request).await.unwrap();

    assert_eq!(result.method, SplitMode::Regex);
    assert!(!engine.analyze(&request.english, "나는 너보다 키가 크다. 그는 날마다 운동한다.").has_anomalies());
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_hybrid_confidenceBelowThreshold_shouldEscalate() {
    let client = MockGenerationClient::faithful();
    let options = EngineOptions {
        escalation_threshold: 0.91,
        ..EngineOptions::default()
    };
    let engine = SegmentationEngine::new(Arc::new(client.clone()), options);

    let result = engine
        .run(&SplitRequest::new("Dr. Smith arrived. He left.", None, TEST_MODEL, SplitMode::Hybrid))
        .await
        .unwrap();

    assert_eq!(result.method, SplitMode::Hybrid);
    assert_eq!(result.model.as_deref(), Some(TEST_MODEL));
    assert_eq!(result.contents(), vec!["Dr. Smith arrived.", "He left."]);
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn test_hybrid_koreanCountMismatch_shouldEscalate() {
    let client = MockGenerationClient::faithful();
    let engine = common::engine_with(&client);

    let result = engine
        .run(&SplitRequest::new(
            "I came. I saw. I won.",
            Some("나는 왔고 보았고 이겼다.".to_string()),
            TEST_MODEL,
            SplitMode::Hybrid,
        ))
        .await
        .unwrap();

    assert_eq!(result.method, SplitMode::Hybrid);
    assert_eq!(result.len(), 3);
}

#[tokio::test]
async fn test_run_emptyInput_shouldBeEmptyInEveryMode() {
    let client = MockGenerationClient::faithful();
    let engine = common::engine_with(&client);

    for mode in [SplitMode::Regex, SplitMode::Ai, SplitMode::Hybrid, SplitMode::AiVerify, SplitMode::Parallel] {
        for english in ["", "   \n\t"] {
            let result = engine
                .run(&SplitRequest::new(english, None, TEST_MODEL, mode))
                .await
                .unwrap();
            assert!(result.sentences.is_empty());
            assert_eq!(result.confidence, 1.0);
            assert!(result.warnings.is_empty());
            assert!(result.korean_issues.is_empty());
        }
    }
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_run_regexMode_shouldNeverCallModel() {
    let client = MockGenerationClient::failing(FailureKind::Auth);
    let engine = common::engine_with(&client);
    let (english, korean) = common::sample_pair();

    let result = engine
        .run(&SplitRequest::new(english, Some(korean.to_string()), TEST_MODEL, SplitMode::Regex))
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.sentences[0].content, "Dr. Smith arrived at the station early.");
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn test_run_providerQuota_shouldCarryAlternativeModel() {
    let client = MockGenerationClient::with_handler(|_, model| {
        MockReply::Failure(classify(
            &ProviderError::RateLimitExceeded("insufficient_quota".to_string()),
            &FailureContext::for_model(model),
        ))
    });
    let engine = common::engine_with(&client);

    let err = engine
        .run(&SplitRequest::new("I came. I saw.", None, TEST_MODEL, SplitMode::AiVerify))
        .await
        .unwrap_err();

    let payload = err.to_payload();
    assert_eq!(payload.kind, "quota");
    assert!(payload.retryable);
    assert_eq!(payload.provider.as_deref(), Some("openai"));
    assert_eq!(payload.alternative_model.as_deref(), Some("claude-3-5-haiku-latest"));
}

#[tokio::test]
async fn test_run_garbageReply_shouldBeMalformedOutput() {
    let client = MockGenerationClient::fixed("I am sorry, I cannot help with that.");
    let engine = common::engine_with(&client);

    let err = engine
        .run(&SplitRequest::new("I came. I saw.", None, TEST_MODEL, SplitMode::Ai))
        .await
        .unwrap_err();

    match err {
        SplitError::Generation(failure) => {
            assert_eq!(failure.kind, FailureKind::MalformedOutput);
            assert!(!failure.retryable);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_run_emptySentenceList_shouldBeSchemaViolation() {
    let client = MockGenerationClient::fixed(r#"```json
{"sentences": [], "confidence": 0.9}
```"#);
    let engine = common::engine_with(&client);

    let err = engine
        .run(&SplitRequest::new("I came. I saw.", None, TEST_MODEL, SplitMode::Ai))
        .await
        .unwrap_err();

    assert_eq!(err.kind_label(), "schema_violation");
}

#[tokio::test]
async fn test_aiVerify_boundaryCorrection_shouldWarnAndKeepFidelity() {
    let client = MockGenerationClient::fixed(
        r#"{"sentences": ["The ratio was 3. 5 to 1 overall."], "corrections": ["kept the ratio together"], "confidence": 0.8}"#,
    );
    let engine = common::engine_with(&client);

    let result = engine
        .run(&SplitRequest::new("The ratio was 3. 5 to 1 overall.", None, TEST_MODEL, SplitMode::AiVerify))
        .await
        .unwrap();

    assert_eq!(result.method, SplitMode::AiVerify);
    assert_eq!(result.confidence, 0.8);
    assert_eq!(result.contents(), vec!["The ratio was 3. 5 to 1 overall."]);
    assert!(result.warnings[0].contains("2 regex sentences became 1"));
    assert!(result.warnings.iter().any(|w| w == "Correction: kept the ratio together"));
}

#[tokio::test]
async fn test_aiVerify_droppedWord_shouldFailWithEnglishModified() {
    let client = MockGenerationClient::fixed(r#"{"sentences": ["The ratio was 3.", "5 to 1."]}"#);
    let engine = common::engine_with(&client);

    let err = engine
        .run(&SplitRequest::new("The ratio was 3. 5 to 1 overall.", None, TEST_MODEL, SplitMode::AiVerify))
        .await
        .unwrap_err();

    assert_eq!(err.kind_label(), "english_modified");
    assert!(!err.is_retryable());
}
