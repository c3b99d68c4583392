//! Detection service access.
//!
//! Components:
//! - `detection_service`: the `DetectionService` trait consumed by both controllers.
//! - `http_client`: reqwest-backed implementation talking to the detection server.
//! - `types`: request/response payloads.
//! - `integration_tests`: the HTTP client and both controllers against a local stub server.

pub mod detection_service;
pub mod http_client;
pub mod types;

#[cfg(test)]
pub mod integration_tests;

#[cfg(test)]
pub(crate) mod testing;

pub use detection_service::DetectionService;
pub use http_client::HttpDetectionService;
pub use types::{AnalysisResult, DetectionResult, FrameResult, LiveResults};
