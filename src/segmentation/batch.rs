/*!
 * Batch processing of many passages.
 *
 * Passages run as a bounded-concurrency fan-out. Each passage succeeds or
 * fails on its own; one failure never aborts or alters its siblings.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use futures::stream::{self, StreamExt};
use log::{error, info};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ErrorPayload;

use super::dispatcher::{SegmentationEngine, SplitRequest};
use super::model::{SplitMode, SplitResult};

/// One passage of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    /// Caller's identifier; numbers are accepted and kept as text
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub english: String,
    #[serde(default)]
    pub korean: Option<String>,
}

impl BatchItem {
    pub fn new(id: impl Into<String>, english: impl Into<String>, korean: Option<String>) -> Self {
        Self {
            id: id.into(),
            english: english.into(),
            korean,
        }
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "batch item id must be a string or number, got {}",
            other
        ))),
    }
}

/// Outcome for one passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SplitResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

/// Outcome of a whole batch, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub results: Vec<BatchItemResult>,
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub total_sentences: usize,
}

impl BatchReport {
    fn from_results(results: Vec<BatchItemResult>) -> Self {
        let success = results.iter().filter(|r| r.success).count();
        let total_sentences = results
            .iter()
            .filter_map(|r| r.result.as_ref())
            .map(SplitResult::len)
            .sum();
        Self {
            total: results.len(),
            failed: results.len() - success,
            success,
            total_sentences,
            results,
        }
    }
}

impl SegmentationEngine {
    /// Segment every item with the same mode and model.
    ///
    /// `progress_callback` receives `(completed, total)` after each item.
    pub async fn run_batch<F>(
        &self,
        items: Vec<BatchItem>,
        mode: SplitMode,
        model: &str,
        progress_callback: F,
    ) -> BatchReport
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let total = items.len();
        let completed = Arc::new(AtomicUsize::new(0));
        let start_time = Instant::now();
        let progress_callback = &progress_callback;

        let mut results = stream::iter(items.into_iter().enumerate())
            .map(|(position, item)| {
                let completed = Arc::clone(&completed);
                async move {
                    let request = SplitRequest::new(item.english, item.korean, model, mode);
                    let outcome = match self.run(&request).await {
                        Ok(result) => BatchItemResult {
                            id: item.id,
                            success: true,
                            result: Some(result),
                            error: None,
                        },
                        Err(e) => {
                            error!("Batch item {} failed: {}", item.id, e);
                            BatchItemResult {
                                id: item.id,
                                success: false,
                                result: None,
                                error: Some(e.to_payload()),
                            }
                        }
                    };

                    let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total);
                    (position, outcome)
                }
            })
            .buffer_unordered(self.options().max_concurrent_requests.max(1))
            .collect::<Vec<_>>()
            .await;

        results.sort_by_key(|(position, _)| *position);
        let report = BatchReport::from_results(results.into_iter().map(|(_, outcome)| outcome).collect());

        info!(
            "Batch of {} finished in {:?}: {} succeeded, {} failed, {} sentences",
            report.total,
            start_time.elapsed(),
            report.success,
            report.failed,
            report.total_sentences
        );
        report
    }
}
