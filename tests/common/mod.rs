/*!
 * Common test utilities for the kobisplit test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use kobisplit::providers::mock::{MockGenerationClient, MockReply};
use kobisplit::segmentation::{EngineOptions, SegmentationEngine};

/// Model id used throughout the suite
pub const TEST_MODEL: &str = "gpt-4o-mini";

/// Route library logging to the test harness; safe to call repeatedly
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Engine around a mock with default options
pub fn engine_with(client: &MockGenerationClient) -> SegmentationEngine {
    SegmentationEngine::new(Arc::new(client.clone()), EngineOptions::default())
}

/// Engine around a mock with a short call deadline
pub fn engine_with_timeout(client: &MockGenerationClient, timeout: Duration) -> SegmentationEngine {
    let options = EngineOptions {
        call_timeout: timeout,
        ..EngineOptions::default()
    };
    SegmentationEngine::new(Arc::new(client.clone()), options)
}

/// Faithful mock whose replies go through `replace(from, to)` first
pub fn tampering_client(from: &'static str, to: &'static str) -> MockGenerationClient {
    MockGenerationClient::faithful_then(move |_, reply| MockReply::Text(reply.replace(from, to)))
}

/// A two-sentence English passage with a matching Korean translation
pub fn sample_pair() -> (&'static str, &'static str) {
    (
        "Dr. Smith arrived at the station early. He waited for the train to Busan.",
        "스미스 박사는 일찍 역에 도착했다. 그는 부산행 기차를 기다렸다.",
    )
}

/// A Korean passage of about `sentences * 20` characters built from
/// distinct sentences, with a matching English passage
pub fn long_pair(sentences: usize) -> (String, String) {
    let english: Vec<String> = (1..=sentences)
        .map(|n| format!("Sentence number {} describes the weather.", n))
        .collect();
    let korean: Vec<String> = (1..=sentences)
        .map(|n| format!("{}번째 문장은 오늘의 날씨를 아주 자세하게 설명한다.", n))
        .collect();
    (english.join(" "), korean.join(" "))
}
