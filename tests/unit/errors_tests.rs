/*!
 * Tests for error types and conversions
 */

use kobisplit::errors::{AppError, FailureKind, GenerationFailure, ProviderError, SplitError};

#[test]
fn test_providerError_requestFailed_shouldDisplayCorrectly() {
    let error = ProviderError::RequestFailed("Connection reset".to_string());
    let display = format!("{}", error);
    assert!(display.contains("API request failed"));
    assert!(display.contains("Connection reset"));
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 529,
        message: "Overloaded".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("529"));
    assert!(display.contains("Overloaded"));
}

#[test]
fn test_generationFailure_new_shouldDeriveRetryable() {
    let failure = GenerationFailure::new(FailureKind::Timeout, "slow", "google", "gemini-2.0-flash");
    assert!(failure.retryable);
    assert!(failure.alternative_model.is_none());

    let failure = GenerationFailure::new(FailureKind::MalformedOutput, "bad json", "openai", "gpt-4o");
    assert!(!failure.retryable);
}

#[test]
fn test_generationFailure_serialize_shouldOmitMissingAlternative() {
    let failure = GenerationFailure::new(FailureKind::Unknown, "?", "unknown", "llama3");
    let json = serde_json::to_value(&failure).unwrap();
    assert_eq!(json["kind"], "unknown");
    assert!(json.get("alternative_model").is_none());
}

#[test]
fn test_splitError_schemaViolation_shouldBeNonRetryable() {
    let error = SplitError::SchemaViolation("model returned no sentences".to_string());
    assert_eq!(error.kind_label(), "schema_violation");
    assert!(!error.is_retryable());
    let payload = error.to_payload();
    assert!(payload.message.contains("no sentences"));
    assert!(payload.provider.is_none());
}

#[test]
fn test_errorPayload_serialize_shouldUseCamelCase() {
    let error = SplitError::EnglishModified {
        offset: 3,
        expected_context: "abc".to_string(),
        actual_context: "abd".to_string(),
    };
    let json = serde_json::to_value(error.to_payload()).unwrap();
    assert_eq!(json["kind"], "english_modified");
    assert_eq!(json["expectedContext"], "abc");
    assert_eq!(json["actualContext"], "abd");
    assert_eq!(json["retryable"], false);
    assert!(json.get("alternativeModel").is_none());
}

#[test]
fn test_appError_fromSplitError_shouldWrapCorrectly() {
    let app_error: AppError = SplitError::MissingTranslation.into();
    let display = format!("{}", app_error);
    assert!(display.contains("Split error"));
    assert!(display.contains("Korean translation is required"));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.txt");
    let app_error: AppError = io_error.into();
    assert!(matches!(app_error, AppError::File(_)));
}
