//! Upload analysis controller.
//!
//! Drives one file through `Empty -> FileSelected -> Analyzing -> Results | Error`.
//! At most one submission is outstanding at a time; a second `analyze()` while one is in
//! flight is a no-op.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error_handling::types::{ApiError, ExportError, UploadError, ValidationError};
use crate::notification::notifier::{NotificationKind, Notifier};
use crate::service_client::detection_service::DetectionService;
use crate::upload_analysis::export::{build_report, write_report, AnalysisRecord, ReportFormat};
use crate::upload_analysis::progress::{
    spawn_simulation, JobId, ProgressSnapshot, ProgressTracker, PROGRESS_TICK,
};
use crate::upload_analysis::rendering::ResultsView;
use crate::upload_analysis::validation::{validate, MediaFile, MAX_UPLOAD_BYTES};

pub const ANALYSIS_SUCCESS_MESSAGE: &str = "Video analysis completed successfully!";

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub max_upload_bytes: u64,
    pub progress_tick: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_UPLOAD_BYTES,
            progress_tick: PROGRESS_TICK,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Empty,
    FileSelected,
    Analyzing,
    Results,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeOutcome {
    /// Nothing staged, or a submission was already in flight.
    Skipped,
    Completed,
}

#[derive(Debug)]
struct UploadState {
    status: UploadStatus,
    staged: Option<MediaFile>,
    job: Option<JobId>,
    last: Option<AnalysisRecord>,
    view: Option<ResultsView>,
}

impl Default for UploadState {
    fn default() -> Self {
        Self {
            status: UploadStatus::Empty,
            staged: None,
            job: None,
            last: None,
            view: None,
        }
    }
}

/// Ends job `job` if `analyze()` is dropped before the service answered.
struct InFlight<'a> {
    state: &'a Mutex<UploadState>,
    progress: &'a ProgressTracker,
    job: JobId,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.job == Some(self.job) {
            state.job = None;
            state.status = if state.staged.is_some() {
                UploadStatus::FileSelected
            } else {
                UploadStatus::Empty
            };
            warn!("Analysis job {} abandoned before completion", self.job);
        }
        drop(state);
        self.progress.complete(self.job);
    }
}

pub struct UploadController<S: DetectionService> {
    service: S,
    notifier: Arc<dyn Notifier>,
    settings: UploadSettings,
    progress: ProgressTracker,
    state: Mutex<UploadState>,
}

impl<S: DetectionService> UploadController<S> {
    pub fn new(service: S, notifier: Arc<dyn Notifier>, settings: UploadSettings) -> Self {
        Self {
            service,
            notifier,
            settings,
            progress: ProgressTracker::new(),
            state: Mutex::new(UploadState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, UploadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify_error(&self, message: &str) {
        self.notifier
            .show_notification(message, NotificationKind::Error, None);
    }

    pub fn status(&self) -> UploadStatus {
        self.state().status.clone()
    }

    pub fn staged_file(&self) -> Option<MediaFile> {
        self.state().staged.clone()
    }

    pub fn results(&self) -> Option<AnalysisRecord> {
        self.state().last.clone()
    }

    pub fn results_view(&self) -> Option<ResultsView> {
        self.state().view.clone()
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }

    /// Validates and stages `file`. A rejected file leaves the controller untouched.
    pub fn select_file(&self, file: MediaFile) -> Result<(), ValidationError> {
        let outcome = {
            let mut state = self.state();
            if state.status == UploadStatus::Analyzing {
                Err(ValidationError::AnalysisInProgress)
            } else {
                validate(&file, self.settings.max_upload_bytes).map(|()| {
                    info!(
                        "Selected {} ({}, {} bytes)",
                        file.name, file.media_type, file.size
                    );
                    state.staged = Some(file);
                    state.status = UploadStatus::FileSelected;
                    state.view = None;
                })
            }
        };

        if let Err(e) = &outcome {
            warn!("File rejected: {}", e);
            self.notify_error(&e.to_string());
        }
        outcome
    }

    pub fn remove_file(&self) -> Result<(), ValidationError> {
        let mut state = self.state();
        if state.status == UploadStatus::Analyzing {
            return Err(ValidationError::AnalysisInProgress);
        }
        state.staged = None;
        state.view = None;
        state.status = UploadStatus::Empty;
        drop(state);
        self.progress.reset();
        debug!("Staged file removed");
        Ok(())
    }

    /// Submits the staged file and waits for the verdict.
    pub async fn analyze(&self) -> Result<AnalyzeOutcome, UploadError> {
        let (job, file) = {
            let mut state = self.state();
            if state.status == UploadStatus::Analyzing {
                debug!("Analysis already in flight, ignoring request");
                return Ok(AnalyzeOutcome::Skipped);
            }
            let Some(file) = state.staged.clone() else {
                debug!("No file staged, nothing to analyze");
                return Ok(AnalyzeOutcome::Skipped);
            };
            let job = JobId::new();
            state.status = UploadStatus::Analyzing;
            state.job = Some(job);
            state.view = None;
            (job, file)
        };

        let in_flight = InFlight {
            state: &self.state,
            progress: &self.progress,
            job,
            armed: true,
        };
        self.progress.begin(job);
        spawn_simulation(
            self.progress.clone(),
            job,
            self.settings.progress_tick,
            StdRng::from_entropy(),
        );
        info!("Analyzing {} (job {})", file.name, job);

        let outcome = match file.read_payload().await {
            Ok(bytes) => {
                self.service
                    .upload_video(&file.name, file.upload_media_type(), bytes)
                    .await
            }
            Err(e) => Err(ApiError::IoError(e)),
        };
        in_flight.disarm();
        self.progress.complete(job);

        let mut state = self.state();
        state.job = None;
        match outcome {
            Ok(result) => {
                info!(
                    "Analysis of {} finished: {} of {} analyzed frames violent",
                    file.name, result.violent_frames, result.analyzed_frames
                );
                state.view = Some(ResultsView::render(&result));
                state.last = Some(AnalysisRecord {
                    file_name: file.name.clone(),
                    file_size: file.size,
                    completed_at: Utc::now(),
                    result,
                });
                state.status = UploadStatus::Results;
                drop(state);
                self.notifier.show_notification(
                    ANALYSIS_SUCCESS_MESSAGE,
                    NotificationKind::Success,
                    None,
                );
                Ok(AnalyzeOutcome::Completed)
            }
            Err(e) => {
                let message = e.to_string();
                state.status = UploadStatus::Error(message.clone());
                drop(state);
                error!("Analysis of {} failed: {}", file.name, message);
                let err = UploadError::Service(e);
                self.notify_error(&err.to_string());
                Err(err)
            }
        }
    }

    pub async fn retry(&self) -> Result<AnalyzeOutcome, UploadError> {
        if self.state().staged.is_none() {
            return Ok(AnalyzeOutcome::Skipped);
        }
        self.analyze().await
    }

    /// Writes the last completed analysis into `dir` in the requested format.
    pub fn export_report(&self, format: ReportFormat, dir: &Path) -> Result<PathBuf, ExportError> {
        let Some(record) = self.results() else {
            let err = ExportError::NoResults;
            self.notify_error(&err.to_string());
            return Err(err);
        };

        let written = build_report(&record, format, Utc::now())
            .and_then(|report| write_report(&report, dir));
        match written {
            Ok(path) => {
                self.notifier.show_notification(
                    format.success_message(),
                    NotificationKind::Success,
                    None,
                );
                Ok(path)
            }
            Err(e) => {
                error!("Export as {} failed: {}", format, e);
                self.notify_error(&e.to_string());
                Err(e)
            }
        }
    }
}
