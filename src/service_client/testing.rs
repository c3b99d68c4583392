//! Scriptable in-memory detection service for controller tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use crate::error_handling::types::ApiError;
use crate::service_client::detection_service::DetectionService;
use crate::service_client::types::{AnalysisResult, DetectionResult, LiveResults};

#[derive(Default)]
pub struct MockState {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub polls: AtomicUsize,
    pub uploads: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub fail_start: AtomicBool,
    pub fail_stop: AtomicBool,
    /// Holds start and stop calls until `lifecycle_gate` is notified.
    pub gate_lifecycle: AtomicBool,
    pub lifecycle_gate: Notify,
    pub poll_delay: Mutex<Duration>,
    /// Poll answers in order; `None` is a failed poll. Empty script answers an empty batch.
    pub script: Mutex<VecDeque<Option<LiveResults>>>,
    pub gate_uploads: AtomicBool,
    pub upload_gate: Notify,
    pub upload_outcome: Mutex<Option<Result<AnalysisResult, String>>>,
    pub last_upload: Mutex<Option<(String, String, usize)>>,
}

#[derive(Clone, Default)]
pub struct MockService {
    pub state: Arc<MockState>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_delay(self, delay: Duration) -> Self {
        *self.state.poll_delay.lock().unwrap() = delay;
        self
    }

    pub fn push_poll(&self, answer: Option<LiveResults>) {
        self.state.script.lock().unwrap().push_back(answer);
    }

    pub fn set_upload_outcome(&self, outcome: Result<AnalysisResult, String>) {
        *self.state.upload_outcome.lock().unwrap() = Some(outcome);
    }

    pub fn polls(&self) -> usize {
        self.state.polls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> usize {
        self.state.uploads.load(Ordering::SeqCst)
    }
}

pub fn detection(confidence: f64, is_violent: bool) -> DetectionResult {
    DetectionResult {
        confidence,
        is_violent,
        timestamp: 1_700_000_000.0,
    }
}

pub fn batch(results: Vec<DetectionResult>, total_detections: u64) -> LiveResults {
    LiveResults {
        results,
        total_detections,
    }
}

impl DetectionService for MockService {
    async fn start_live_detection(&self) -> Result<(), ApiError> {
        self.state.starts.fetch_add(1, Ordering::SeqCst);
        if self.state.gate_lifecycle.load(Ordering::SeqCst) {
            self.state.lifecycle_gate.notified().await;
        }
        if self.state.fail_start.load(Ordering::SeqCst) {
            return Err(ApiError::Service("start refused".to_string()));
        }
        Ok(())
    }

    async fn stop_live_detection(&self) -> Result<(), ApiError> {
        self.state.stops.fetch_add(1, Ordering::SeqCst);
        if self.state.gate_lifecycle.load(Ordering::SeqCst) {
            self.state.lifecycle_gate.notified().await;
        }
        if self.state.fail_stop.load(Ordering::SeqCst) {
            return Err(ApiError::Service("stop refused".to_string()));
        }
        Ok(())
    }

    async fn get_live_results(&self) -> Result<LiveResults, ApiError> {
        self.state.polls.fetch_add(1, Ordering::SeqCst);
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.state.poll_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        let answer = self.state.script.lock().unwrap().pop_front();
        match answer {
            Some(Some(results)) => Ok(results),
            Some(None) => Err(ApiError::Service("poll failed".to_string())),
            None => Ok(LiveResults::default()),
        }
    }

    async fn upload_video(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<AnalysisResult, ApiError> {
        self.state.uploads.fetch_add(1, Ordering::SeqCst);
        *self.state.last_upload.lock().unwrap() =
            Some((file_name.to_string(), media_type.to_string(), bytes.len()));

        if self.state.gate_uploads.load(Ordering::SeqCst) {
            self.state.upload_gate.notified().await;
        }

        let outcome = self.state.upload_outcome.lock().unwrap().clone();
        match outcome {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(ApiError::Service(message)),
            None => Err(ApiError::Service("Analysis failed".to_string())),
        }
    }
}
