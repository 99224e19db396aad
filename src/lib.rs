/*!
 * # kobisplit - bilingual sentence segmentation for English study materials
 *
 * A Rust library that splits English passages into verified sentences and
 * aligns them with a Korean translation, using LLM providers where a
 * deterministic splitter is not enough.
 *
 * ## Features
 *
 * - Regex splitter with an abbreviation, quotation and decimal exception table
 * - Model-backed strategies behind one `GenerationClient` capability:
 *   - OpenAI API
 *   - Anthropic API
 *   - Google Gemini API
 * - Strict English fidelity: rejoined sentences must reproduce the source
 * - Lenient Korean checks reported as translation issues, never as failures
 * - Bounded-concurrency batch processing with per-passage failure isolation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `segmentation`: The segmentation engine:
 *   - `segmentation::regex_splitter`: Deterministic baseline
 *   - `segmentation::ai_splitter`: `ai` and `ai-verify` strategies
 *   - `segmentation::parallel`: English/Korean pair extraction
 *   - `segmentation::dispatcher`: Strategy selection
 *   - `segmentation::batch`: Batch fan-out
 * - `providers`: Client implementations for the LLM providers and error classification
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod providers;
pub mod segmentation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ErrorPayload, FailureKind, GenerationFailure, ProviderError, SplitError};
pub use providers::{GenerationClient, ProviderKind, ProviderRouter};
pub use segmentation::{
    BatchItem, BatchReport, SegmentationEngine, Sentence, SplitMode, SplitRequest, SplitResult, TranslationIssue,
};
