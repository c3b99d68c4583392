//! Live session controller.
//!
//! `LiveSessionController` wraps a server-side detection session. Starting it spawns two
//! background tasks bound to the session token:
//!
//! - the poll loop, a single-flight request/response cycle that waits `poll_interval` after a
//!   successful poll and `retry_interval` after a failed one;
//! - the session clock, refreshing the duration label every second.
//!
//! Stopping the session invalidates the token. Both tasks check it before touching state and at
//! every reschedule point, so a poll already in flight finishes but its result is discarded and
//! nothing new is scheduled.
//!
//! ```text
//!   Idle ──start()──▶ Starting ──ok──▶ Active ──stop()──▶ Stopping ──▶ Idle
//!                        │
//!                        └──permission/network error──▶ Idle
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error, info, trace, warn};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::error_handling::types::LiveSessionError;
use crate::live_detection::activity_log::{status_label, ActivityLog, LogEntry};
use crate::live_detection::alert::{AlertLevel, AlertOverlay};
use crate::live_detection::camera::CameraAccess;
use crate::live_detection::rolling_series::RollingSeries;
use crate::live_detection::session::{LivePhase, Session, SessionToken};
use crate::notification::format::confidence_percent;
use crate::notification::{IndicatorState, NotificationKind, Notifier};
use crate::service_client::detection_service::DetectionService;
use crate::service_client::types::{DetectionResult, LiveResults};

/// Badge updated on start and stop.
pub const STATUS_INDICATOR: &str = "status-indicator";
/// Confirmation shown when the host is asked to leave during an active session.
pub const LEAVE_PROMPT: &str = "Detection is currently active. Are you sure you want to leave?";

/// Timing and capacity knobs of the live view.
#[derive(Debug, Clone)]
pub struct LiveSettings {
    pub poll_interval: Duration,
    pub retry_interval: Duration,
    pub clock_interval: Duration,
    pub alert_dismiss_after: Duration,
    /// Confidence strictly above which a violent result raises the alert.
    pub alert_threshold: f64,
    pub chart_capacity: usize,
    pub log_capacity: usize,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            retry_interval: Duration::from_millis(2000),
            clock_interval: Duration::from_secs(1),
            alert_dismiss_after: Duration::from_secs(10),
            alert_threshold: 0.8,
            chart_capacity: 50,
            log_capacity: 20,
        }
    }
}

/// Everything the live page displays, detached from any rendering technology.
#[derive(Debug, Clone)]
pub struct LiveView {
    pub status: &'static str,
    pub is_violent: bool,
    pub confidence_percent: u32,
    pub total_detections: u64,
    pub alert_level: AlertLevel,
    pub session_duration: String,
    pub chart: RollingSeries,
    pub log: ActivityLog,
}

impl LiveView {
    fn new(settings: &LiveSettings) -> Self {
        Self {
            status: status_label(false),
            is_violent: false,
            confidence_percent: 0,
            total_detections: 0,
            alert_level: AlertLevel::Low,
            session_duration: String::from("00:00"),
            chart: RollingSeries::new(settings.chart_capacity),
            log: ActivityLog::new(settings.log_capacity),
        }
    }

    pub fn confidence_label(&self) -> String {
        format!("{}%", self.confidence_percent)
    }

    fn reset_for_session(&mut self) {
        self.reset_current();
        self.total_detections = 0;
        self.alert_level = AlertLevel::Low;
        self.session_duration = String::from("00:00");
        self.chart.clear();
    }

    fn reset_current(&mut self) {
        self.status = status_label(false);
        self.is_violent = false;
        self.confidence_percent = 0;
    }

    fn apply(&mut self, result: &DetectionResult, total_detections: u64, time_label: String) {
        let percent = confidence_percent(result.confidence);
        self.chart.push(result.confidence);
        self.status = status_label(result.is_violent);
        self.is_violent = result.is_violent;
        self.confidence_percent = percent;
        self.total_detections = total_detections;
        self.alert_level = AlertLevel::derive(percent, result.is_violent);
        self.log.insert(LogEntry::from_result(result, time_label));
    }
}

struct LiveState {
    phase: LivePhase,
    view: LiveView,
}

/// Phase a lifecycle call parks the controller in while it awaits the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Starting,
    Stopping,
}

/// Returns the controller to `Idle` if a `start()` or `stop()` future is dropped mid-flight.
struct TransitionGuard<'a> {
    state: &'a Mutex<LiveState>,
    transition: Transition,
    armed: bool,
}

impl<'a> TransitionGuard<'a> {
    fn new(state: &'a Mutex<LiveState>, transition: Transition) -> Self {
        Self {
            state,
            transition,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let parked = matches!(
            (&state.phase, self.transition),
            (LivePhase::Starting, Transition::Starting) | (LivePhase::Stopping, Transition::Stopping)
        );
        if parked {
            state.phase = LivePhase::Idle;
            state.view.reset_current();
            warn!(
                "{:?} abandoned before the server answered, back to idle",
                self.transition
            );
        }
    }
}

struct Inner<S> {
    service: S,
    notifier: Arc<dyn Notifier>,
    camera: Arc<dyn CameraAccess>,
    settings: LiveSettings,
    alert: AlertOverlay,
    state: Mutex<LiveState>,
}

impl<S: DetectionService> Inner<S> {
    fn state(&self) -> MutexGuard<'_, LiveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, token: SessionToken) -> bool {
        self.state().phase.is_current(token)
    }

    fn ingest(&self, token: SessionToken, batch: &LiveResults) -> bool {
        let latest = match batch.latest() {
            Some(result) => result.clone(),
            None => {
                trace!("[{}] empty poll tick", token);
                return false;
            }
        };
        let dropped = batch.results.len() - 1;
        let time_label = self.notifier.format_timestamp(latest.timestamp);

        let raise_alert = {
            let mut state = self.state();
            match &mut state.phase {
                LivePhase::Active(session) if session.token == token => {
                    session.total_detections = batch.total_detections;
                }
                _ => {
                    debug!("[{}] discarding results of a finished session", token);
                    return false;
                }
            }
            state.view.apply(&latest, batch.total_detections, time_label);
            latest.is_violent && latest.confidence > self.settings.alert_threshold
        };

        debug!(
            "[{}] applied result: violent={}, confidence={:.3}, skipped={}",
            token, latest.is_violent, latest.confidence, dropped
        );

        if raise_alert {
            self.alert.raise();
        }
        true
    }
}

/// Owned state of the live detection page; cheap to clone, all clones share one session.
pub struct LiveSessionController<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for LiveSessionController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DetectionService> LiveSessionController<S> {
    pub fn new(
        service: S,
        notifier: Arc<dyn Notifier>,
        camera: Arc<dyn CameraAccess>,
        settings: LiveSettings,
    ) -> Self {
        notifier.update_status_indicator(STATUS_INDICATOR, IndicatorState::Idle, "Idle");
        let view = LiveView::new(&settings);
        Self {
            inner: Arc::new(Inner {
                service,
                notifier,
                camera,
                alert: AlertOverlay::new(settings.alert_dismiss_after),
                settings,
                state: Mutex::new(LiveState {
                    phase: LivePhase::Idle,
                    view,
                }),
            }),
        }
    }

    /// Starts a session. State only changes once the server acknowledged the start.
    pub async fn start(&self) -> Result<SessionToken, LiveSessionError> {
        {
            let mut state = self.inner.state();
            if !matches!(state.phase, LivePhase::Idle) {
                return Err(LiveSessionError::AlreadyActive);
            }
            state.phase = LivePhase::Starting;
        }
        let guard = TransitionGuard::new(&self.inner.state, Transition::Starting);

        let acknowledged = match self.inner.camera.request_access() {
            Ok(()) => self
                .inner
                .service
                .start_live_detection()
                .await
                .map_err(LiveSessionError::from),
            Err(e) => Err(LiveSessionError::from(e)),
        };

        guard.disarm();

        if let Err(e) = acknowledged {
            self.inner.state().phase = LivePhase::Idle;
            error!("Error starting detection: {}", e);
            self.inner.notifier.show_notification(
                "Failed to start detection. Please check camera permissions.",
                NotificationKind::Error,
                None,
            );
            return Err(e);
        }

        let session = Session::begin();
        let token = session.token;
        {
            let mut state = self.inner.state();
            state.view.reset_for_session();
            state.phase = LivePhase::Active(session);
        }

        self.inner
            .notifier
            .update_status_indicator(STATUS_INDICATOR, IndicatorState::Active, "Active");

        tokio::spawn(clock_loop(Arc::clone(&self.inner), token));
        tokio::spawn(poll_loop(Arc::clone(&self.inner), token));

        info!("[{}] Live detection started", token);
        self.inner.notifier.show_notification(
            "Live detection started successfully!",
            NotificationKind::Success,
            None,
        );
        Ok(token)
    }

    /// Stops the session. The display returns to idle whatever the server answers.
    pub async fn stop(&self) -> Result<(), LiveSessionError> {
        let token = {
            let mut state = self.inner.state();
            let token = match state.phase.session() {
                Some(session) => session.token,
                None => return Err(LiveSessionError::NotActive),
            };
            state.phase = LivePhase::Stopping;
            token
        };
        let guard = TransitionGuard::new(&self.inner.state, Transition::Stopping);

        let outcome = self.inner.service.stop_live_detection().await;
        guard.disarm();

        {
            let mut state = self.inner.state();
            state.phase = LivePhase::Idle;
            state.view.reset_current();
        }
        self.inner
            .notifier
            .update_status_indicator(STATUS_INDICATOR, IndicatorState::Idle, "Idle");

        match outcome {
            Ok(()) => {
                info!("[{}] Live detection stopped", token);
                self.inner.notifier.show_notification(
                    "Live detection stopped",
                    NotificationKind::Info,
                    None,
                );
                Ok(())
            }
            Err(e) => {
                error!("[{}] Error stopping detection: {}", token, e);
                self.inner.notifier.show_notification(
                    "Error stopping detection",
                    NotificationKind::Error,
                    None,
                );
                Err(e.into())
            }
        }
    }

    /// Applies one poll answer to the view if `token` is still the running session.
    ///
    /// Only the last result of the batch is used. Returns whether anything was applied.
    pub fn apply_results(&self, token: SessionToken, batch: &LiveResults) -> bool {
        self.inner.ingest(token, batch)
    }

    pub fn is_active(&self) -> bool {
        self.inner.state().phase.is_active()
    }

    pub fn session_token(&self) -> Option<SessionToken> {
        self.inner.state().phase.session().map(|s| s.token)
    }

    /// Snapshot of the current display.
    pub fn view(&self) -> LiveView {
        self.inner.state().view.clone()
    }

    /// Confirmation to show before the host leaves, only while a session is active.
    pub fn leave_prompt(&self) -> Option<&'static str> {
        if self.is_active() {
            Some(LEAVE_PROMPT)
        } else {
            None
        }
    }

    pub fn alert(&self) -> &AlertOverlay {
        &self.inner.alert
    }

    pub fn acknowledge_alert(&self) -> bool {
        self.inner.alert.acknowledge()
    }
}

async fn poll_loop<S: DetectionService>(inner: Arc<Inner<S>>, token: SessionToken) {
    debug!("[{}] polling started", token);
    while inner.is_current(token) {
        let delay = match inner.service.get_live_results().await {
            Ok(batch) => {
                inner.ingest(token, &batch);
                inner.settings.poll_interval
            }
            Err(e) => {
                warn!("[{}] Error fetching results: {}", token, e);
                inner.settings.retry_interval
            }
        };

        if !inner.is_current(token) {
            break;
        }
        tokio::time::sleep(delay).await;
    }
    debug!("[{}] polling stopped", token);
}

async fn clock_loop<S: DetectionService>(inner: Arc<Inner<S>>, token: SessionToken) {
    let period = inner.settings.clock_interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let elapsed = match inner.state().phase.session() {
            Some(session) if session.token == token => session.elapsed_secs(),
            _ => break,
        };
        let label = inner.notifier.format_time(elapsed);

        let mut state = inner.state();
        if !state.phase.is_current(token) {
            break;
        }
        state.view.session_duration = label;
    }
    trace!("[{}] session clock stopped", token);
}
