//! Simulated upload progress.
//!
//! The service gives no progress feedback, so while a submission is in flight a ticker
//! advances a pseudo-random percentage that never passes [`PROGRESS_CEILING`] until the
//! job resolves. Each ticker is bound to a [`JobId`] and exits once its job is no longer
//! the running one.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::trace;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const PROGRESS_TICK: Duration = Duration::from_millis(500);
pub const PROGRESS_CEILING: f64 = 95.0;
/// Exclusive upper bound of one tick's increment.
pub const MAX_INCREMENT: f64 = 15.0;

pub const PROGRESS_CAPTIONS: [&str; 6] = [
    "Uploading video...",
    "Extracting frames...",
    "Analyzing motion patterns...",
    "Detecting violence indicators...",
    "Processing results...",
    "Finalizing analysis...",
];
pub const COMPLETE_CAPTION: &str = "Analysis complete";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Adds `increment` to `current` without crossing the ceiling.
pub fn advance(current: f64, increment: f64) -> f64 {
    (current + increment).min(PROGRESS_CEILING)
}

pub fn caption_for(percent: f64) -> &'static str {
    let index = (percent / 100.0 * PROGRESS_CAPTIONS.len() as f64).floor();
    let index = (index.max(0.0) as usize).min(PROGRESS_CAPTIONS.len() - 1);
    PROGRESS_CAPTIONS[index]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub visible: bool,
    pub percent: f64,
    pub caption: &'static str,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            visible: false,
            percent: 0.0,
            caption: PROGRESS_CAPTIONS[0],
        }
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    running: Option<JobId>,
    snapshot: ProgressSnapshot,
}

/// Shared progress display state.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.lock().snapshot.clone()
    }

    pub fn begin(&self, job: JobId) {
        let mut state = self.lock();
        state.running = Some(job);
        state.snapshot = ProgressSnapshot {
            visible: true,
            percent: 0.0,
            caption: PROGRESS_CAPTIONS[0],
        };
    }

    /// Applies one tick. Returns false once `job` is no longer running.
    pub fn tick(&self, job: JobId, increment: f64) -> bool {
        let mut state = self.lock();
        if state.running != Some(job) {
            return false;
        }
        let percent = advance(state.snapshot.percent, increment);
        state.snapshot.percent = percent;
        state.snapshot.caption = caption_for(percent);
        true
    }

    /// Jumps to 100% and hides the display. Ignored for a job that is not running.
    pub fn complete(&self, job: JobId) {
        let mut state = self.lock();
        if state.running != Some(job) {
            return;
        }
        state.running = None;
        state.snapshot = ProgressSnapshot {
            visible: false,
            percent: 100.0,
            caption: COMPLETE_CAPTION,
        };
    }

    pub fn reset(&self) {
        *self.lock() = TrackerState::default();
    }
}

/// Spawns the ticker for `job`. It ends on its own when the job completes.
pub fn spawn_simulation(
    tracker: ProgressTracker,
    job: JobId,
    period: Duration,
    mut rng: StdRng,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            let increment = rng.gen_range(0.0..MAX_INCREMENT);
            if !tracker.tick(job, increment) {
                trace!("Progress ticker for job {} finished", job);
                break;
            }
        }
    })
}
