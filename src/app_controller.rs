use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::app_config::Config;
use crate::errors::{AppError, SplitError};
use crate::providers::{GenerationClient, ProviderRouter};
use crate::segmentation::{
    AlignmentSignal, BatchItem, BatchReport, EngineOptions, SegmentationEngine, SplitMode, SplitRequest,
    SplitResult,
};

// @module: Application controller wiring configuration, providers and the engine

/// Main application controller for segmentation jobs
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Engine bound to the configured providers
    engine: SegmentationEngine,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a controller whose engine talks to the configured providers
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let router = ProviderRouter::from_config(&config.providers);
        let configured = router.configured_providers();
        if configured.is_empty() {
            warn!("No provider API keys configured; only regex mode will work");
        } else {
            info!(
                "Configured providers: {}",
                configured.iter().map(|p| p.display_name()).collect::<Vec<_>>().join(", ")
            );
        }
        Ok(Self::with_client(config, Arc::new(router)))
    }

    // @method: Create a controller around an explicit generation client
    pub fn with_client(config: Config, client: Arc<dyn GenerationClient>) -> Self {
        let engine = SegmentationEngine::new(client, EngineOptions::from(&config.engine));
        Self { config, engine }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn engine(&self) -> &SegmentationEngine {
        &self.engine
    }

    /// Build a request, filling model and mode from configuration when absent
    pub fn request(
        &self,
        english: impl Into<String>,
        korean: Option<String>,
        model: Option<String>,
        mode: Option<SplitMode>,
    ) -> SplitRequest {
        SplitRequest::new(
            english,
            korean,
            model.unwrap_or_else(|| self.config.default_model.clone()),
            mode.unwrap_or(self.config.default_mode),
        )
    }

    /// Segment one passage
    pub async fn split(&self, request: &SplitRequest) -> Result<SplitResult, SplitError> {
        info!(
            "Splitting {} characters with mode {} ({})",
            request.english.chars().count(),
            request.mode,
            request.model
        );
        self.engine.run(request).await
    }

    /// Compare a passage with its translation
    pub fn analyze(&self, english: &str, korean: &str) -> AlignmentSignal {
        self.engine.analyze(english, korean)
    }

    /// Segment every passage of a JSON batch file, showing a progress bar
    pub async fn run_batch_file(
        &self,
        path: impl AsRef<Path>,
        mode: Option<SplitMode>,
        model: Option<String>,
    ) -> Result<BatchReport> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
        let items: Vec<BatchItem> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse batch file: {}", path.display()))?;
        let mode = mode.unwrap_or(self.config.default_mode);
        let model = model.unwrap_or_else(|| self.config.default_model.clone());

        let progress_bar = ProgressBar::new(items.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} passages ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("=>-"));
        progress_bar.set_message(format!("{} / {}", mode, model));

        info!("Batch of {} passages from {}", items.len(), path.display());
        let report = self
            .engine
            .run_batch(items, mode, &model, |completed, _total| {
                progress_bar.set_position(completed as u64);
            })
            .await;

        progress_bar.finish_with_message(format!("{} ok, {} failed", report.success, report.failed));
        Ok(report)
    }
}

/// Resolve a CLI text argument; `@path` reads the text from a file
pub fn read_text_arg(value: &str) -> Result<String, AppError> {
    match value.strip_prefix('@') {
        Some("") => Err(AppError::File("Missing file path after '@'".to_string())),
        Some(path) => fs::read_to_string(path)
            .map_err(|e| AppError::File(format!("Failed to read text file {}: {}", path, e))),
        None => Ok(value.to_string()),
    }
}
