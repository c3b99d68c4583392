//! Wire types exchanged with the detection service.

use serde::{Deserialize, Serialize};

/// One live classification produced by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub is_violent: bool,
    /// Seconds since the Unix epoch, as reported by the server.
    pub timestamp: f64,
}

/// Body of `GET /get_live_results`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveResults {
    #[serde(default)]
    pub results: Vec<DetectionResult>,
    #[serde(default)]
    pub total_detections: u64,
}

impl LiveResults {
    /// Most recent result of the batch; older entries are never replayed.
    pub fn latest(&self) -> Option<&DetectionResult> {
        self.results.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub frame: u64,
    /// Offset into the video in seconds.
    pub timestamp: f64,
    pub is_violent: bool,
    pub confidence: f64,
}

/// Aggregate verdict returned by `POST /upload_video`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_frames: u64,
    pub analyzed_frames: u64,
    pub violent_frames: u64,
    #[serde(default)]
    pub violence_percentage: f64,
    pub is_violent_video: bool,
    #[serde(default)]
    pub frame_results: Vec<FrameResult>,
}

/// Envelope of the upload answer, used for both 2xx and error bodies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    pub results: Option<AnalysisResult>,
    pub error: Option<String>,
}
