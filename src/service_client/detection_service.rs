//! Detection Service trait
//!
//! This module defines the `DetectionService` trait, the seam between the controllers and the
//! remote detection server. The HTTP implementation lives in `http_client`; tests provide
//! in-memory doubles.
//!
//! Every method returns a `Send` future so controllers can drive the calls from spawned tasks.

use std::future::Future;

use crate::error_handling::types::ApiError;
use crate::service_client::types::{AnalysisResult, LiveResults};

/// The `DetectionService` trait defines the four endpoints the client consumes.
pub trait DetectionService: Send + Sync + 'static {
    /// Asks the server to begin a live detection session (`POST /start_live_detection`).
    fn start_live_detection(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Asks the server to end the live session (`POST /stop_live_detection`).
    fn stop_live_detection(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Fetches the latest batch of live results (`GET /get_live_results`).
    fn get_live_results(&self) -> impl Future<Output = Result<LiveResults, ApiError>> + Send;

    /// Submits a whole video for one-shot analysis (`POST /upload_video`).
    ///
    /// - `file_name` - name sent with the multipart `video` part.
    /// - `media_type` - declared MIME type of the payload.
    /// - `bytes` - file content.
    fn upload_video(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<AnalysisResult, ApiError>> + Send;
}
