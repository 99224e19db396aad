/*!
 * Round-trip and fidelity guarantees across every strategy
 */

use kobisplit::errors::SplitError;
use kobisplit::providers::mock::{MockGenerationClient, MockReply};
use kobisplit::segmentation::ai_splitter::UNVERIFIED_WARNING;
use kobisplit::segmentation::normalize::{join_pieces, normalize};
use kobisplit::segmentation::{IssueKind, SplitMode, SplitRequest};

use crate::common::{self, TEST_MODEL};

const ALL_MODES: [SplitMode; 5] = [
    SplitMode::Regex,
    SplitMode::Ai,
    SplitMode::Hybrid,
    SplitMode::AiVerify,
    SplitMode::Parallel,
];

fn passages() -> Vec<(String, Option<String>)> {
    let (english, korean) = common::sample_pair();
    let (long_english, long_korean) = common::long_pair(12);
    vec![
        (english.to_string(), Some(korean.to_string())),
        (english.to_string(), None),
        (
            "\"Stop!\" she cried.\nThe price rose 2.5 percent in the U.K. last year.".to_string(),
            Some("\"멈춰!\" 그녀가 외쳤다.\n작년 영국에서 가격이 2.5퍼센트 올랐다.".to_string()),
        ),
        ("just one fragment without punctuation".to_string(), None),
        (long_english, Some(long_korean)),
    ]
}

#[tokio::test]
async fn test_run_faithfulModel_shouldRoundTripInEveryMode() {
    let client = MockGenerationClient::faithful();
    let engine = common::engine_with(&client);

    for (english, korean) in passages() {
        for mode in ALL_MODES {
            let request = SplitRequest::new(english.clone(), korean.clone(), TEST_MODEL, mode);
            let result = engine
                .run(&request)
                .await
                .unwrap_or_else(|e| panic!("{} failed on {:?}: {}", mode, english, e));
            assert_eq!(
                normalize(&join_pieces(&result.contents())),
                normalize(&english),
                "mode {} broke the round trip",
                mode
            );
            for (position, sentence) in result.sentences.iter().enumerate() {
                assert_eq!(sentence.index, position + 1);
                assert!((0.0..=1.0).contains(&sentence.confidence));
            }
        }
    }
}

#[tokio::test]
async fn test_run_oneEnglishCharAltered_shouldFailVerifiedModes() {
    let (english, korean) = common::sample_pair();
    let client = common::tampering_client("station", "stations");
    let engine = common::engine_with(&client);

    for mode in [SplitMode::Parallel, SplitMode::AiVerify] {
        let request = SplitRequest::new(english, Some(korean.to_string()), TEST_MODEL, mode);
        let err = engine.run(&request).await.unwrap_err();
        assert!(!err.is_retryable());
        match err {
            SplitError::EnglishModified {
                expected_context,
                actual_context,
                ..
            } => {
                assert!(expected_context.contains("station"));
                assert!(actual_context.contains("stations"));
            }
            other => panic!("{} returned unexpected error: {:?}", mode, other),
        }
    }
}

#[tokio::test]
async fn test_run_englishAlteredInAiMode_shouldPassWithUnverifiedWarning() {
    let (english, _) = common::sample_pair();
    let client = common::tampering_client("station", "stations");
    let engine = common::engine_with(&client);

    let result = engine
        .run(&SplitRequest::new(english, None, TEST_MODEL, SplitMode::Ai))
        .await
        .unwrap();
    assert!(result.sentences[0].content.contains("stations"));
    assert!(result.warnings.contains(&UNVERIFIED_WARNING.to_string()));
}

#[tokio::test]
async fn test_run_koreanRewritten_shouldSucceedWithIssues() {
    let (english, korean) = common::sample_pair();
    let client = common::tampering_client("그는 부산행 기차를 기다렸다.", "그는 기다렸다.");
    let engine = common::engine_with(&client);

    for mode in [SplitMode::Parallel, SplitMode::AiVerify] {
        let request = SplitRequest::new(english, Some(korean.to_string()), TEST_MODEL, mode);
        let result = engine
            .run(&request)
            .await
            .unwrap_or_else(|e| panic!("{} failed: {}", mode, e));
        assert_eq!(result.len(), 2);
        assert!(
            result.korean_issues.iter().any(|issue| issue.kind == IssueKind::Modified),
            "{} reported no modified issue",
            mode
        );
        assert_eq!(result.sentences[1].korean_translation.as_deref(), Some("그는 기다렸다."));
        assert!(result.issues_needing_review().count() >= 1);
    }
}

#[tokio::test]
async fn test_run_koreanOneCharAltered_shouldStillSucceed() {
    let (english, korean) = common::sample_pair();
    let client = common::tampering_client("기다렸다", "기다렸어");
    let engine = common::engine_with(&client);

    for mode in [SplitMode::Parallel, SplitMode::AiVerify] {
        let request = SplitRequest::new(english, Some(korean.to_string()), TEST_MODEL, mode);
        let result = engine.run(&request).await.unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.sentences[1].korean_translation.as_deref(), Some("그는 부산행 기차를 기다렸어."));
    }
}

#[tokio::test]
async fn test_parallel_koreanOneCharAlteredAndReported_shouldSurfaceIssue() {
    let (english, korean) = common::sample_pair();
    let client = MockGenerationClient::faithful_then(|_, reply| {
        let mut value: serde_json::Value = serde_json::from_str(&reply.replace("기다렸다", "기다렸어")).unwrap();
        value["korean_issues"] = serde_json::json!([
            {"no": 2, "type": "modified", "severity": "low", "description": "Sentence ending changed to informal speech"}
        ]);
        MockReply::Text(value.to_string())
    });
    let engine = common::engine_with(&client);

    let result = engine
        .run(&SplitRequest::new(english, Some(korean.to_string()), TEST_MODEL, SplitMode::Parallel))
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.korean_issues.len(), 1);
    let issue = &result.korean_issues[0];
    assert_eq!(issue.kind, IssueKind::Modified);
    assert_eq!(issue.sentence_index, 2);
    assert!(issue.needs_review);
}

#[tokio::test]
async fn test_run_koreanMissingForOnePair_shouldReportHighSeverity() {
    let (english, korean) = common::sample_pair();
    let client = MockGenerationClient::faithful_then(|_, reply| {
        MockReply::Text(reply.replace("\"그는 부산행 기차를 기다렸다.\"", "null"))
    });
    let engine = common::engine_with(&client);

    let result = engine
        .run(&SplitRequest::new(english, Some(korean.to_string()), TEST_MODEL, SplitMode::Parallel))
        .await
        .unwrap();
    assert!(result.sentences[1].korean_translation.is_none());
    let missing: Vec<_> = result
        .korean_issues
        .iter()
        .filter(|issue| issue.kind == IssueKind::Missing)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].sentence_index, 2);
    assert!(missing[0].needs_review);
}
