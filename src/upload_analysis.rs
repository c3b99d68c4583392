//! Upload analysis module.
//!
//! One-shot analysis of a recorded video: file acceptance, cosmetic progress, result
//! rendering and report export, tied together by [`UploadController`].

pub mod export;
pub mod progress;
pub mod rendering;
pub mod upload_controller;
pub mod validation;

pub use export::{AnalysisRecord, ExportedReport, ReportFormat};
pub use progress::{JobId, ProgressSnapshot, ProgressTracker};
pub use rendering::{ResultsView, Timeline, Verdict};
pub use upload_controller::{AnalyzeOutcome, UploadController, UploadSettings, UploadStatus};
pub use validation::{validate, MediaFile, MAX_UPLOAD_BYTES};
