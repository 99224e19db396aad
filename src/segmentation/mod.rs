/*!
 * Bilingual sentence segmentation and alignment validation.
 *
 * Strategies, from cheapest to most thorough:
 * - `regex_splitter`: deterministic baseline with a confidence score
 * - `ai_splitter`: model segmentation (`ai`) and model review under a fidelity check (`ai-verify`)
 * - `parallel`: aligned English/Korean pair extraction with Korean issue reporting
 *
 * `dispatcher::SegmentationEngine` selects among them per request and
 * `batch` fans a list of passages out over the same engine.
 */

pub mod ai_splitter;
pub mod alignment;
pub mod batch;
pub mod dispatcher;
pub mod fidelity;
pub mod model;
pub mod normalize;
pub mod parallel;
pub mod prompts;
pub mod quality;
pub mod regex_splitter;
pub mod response;

pub use self::alignment::{AlignmentSignal, analyze};
pub use self::batch::{BatchItem, BatchItemResult, BatchReport};
pub use self::dispatcher::{EngineOptions, SegmentationEngine, SplitRequest, should_escalate};
pub use self::model::{IssueKind, Sentence, Severity, SplitMode, SplitResult, TranslationIssue};
pub use self::normalize::normalize;
pub use self::quality::IssueThresholds;
