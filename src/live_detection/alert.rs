//! Alert level derivation and the violence alert overlay.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use uuid::Uuid;

/// Severity band derived from the latest live result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertLevel {
    /// Pure threshold table over the rounded confidence percentage. Thresholds are strict.
    pub fn derive(confidence_percent: u32, is_violent: bool) -> Self {
        if is_violent && confidence_percent > 80 {
            AlertLevel::Critical
        } else if is_violent && confidence_percent > 60 {
            AlertLevel::High
        } else if confidence_percent > 40 {
            AlertLevel::Medium
        } else {
            AlertLevel::Low
        }
    }

    /// Severity class used when styling the level.
    pub fn class(&self) -> &'static str {
        match self {
            AlertLevel::Critical | AlertLevel::High => "danger",
            AlertLevel::Medium => "warning",
            AlertLevel::Low => "safe",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertLevel::Low => write!(f, "Low"),
            AlertLevel::Medium => write!(f, "Medium"),
            AlertLevel::High => write!(f, "High"),
            AlertLevel::Critical => write!(f, "Critical"),
        }
    }
}

#[derive(Debug, Default)]
struct OverlayState {
    /// Id of the alert currently on screen.
    shown: Option<Uuid>,
    raised: u32,
    dismissals: u32,
}

/// Interrupting alert shown on high-confidence violence.
///
/// Only one alert is visible at a time. Each raised alert arms a dismissal timer bound to its
/// id, so a timer never closes an alert it did not open.
#[derive(Debug, Clone)]
pub struct AlertOverlay {
    state: Arc<Mutex<OverlayState>>,
    dismiss_after: Duration,
}

impl AlertOverlay {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(OverlayState::default())),
            dismiss_after,
        }
    }

    fn state(&self) -> MutexGuard<'_, OverlayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shows the alert unless one is already visible. Must run inside a tokio runtime.
    ///
    /// Returns `true` when a new alert was shown.
    pub fn raise(&self) -> bool {
        let id = {
            let mut state = self.state();
            if state.shown.is_some() {
                debug!("Violence alert already visible, not stacking");
                return false;
            }
            let id = Uuid::new_v4();
            state.shown = Some(id);
            state.raised += 1;
            id
        };

        warn!("Violence alert raised ({})", id);
        let overlay = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(overlay.dismiss_after).await;
            if overlay.dismiss_if(id) {
                debug!("Violence alert {} auto-dismissed", id);
            }
        });
        true
    }

    /// Manual acknowledgment. Returns `true` if an alert was visible.
    pub fn acknowledge(&self) -> bool {
        let mut state = self.state();
        match state.shown.take() {
            Some(id) => {
                state.dismissals += 1;
                debug!("Violence alert {} acknowledged", id);
                true
            }
            None => false,
        }
    }

    fn dismiss_if(&self, id: Uuid) -> bool {
        let mut state = self.state();
        if state.shown == Some(id) {
            state.shown = None;
            state.dismissals += 1;
            true
        } else {
            false
        }
    }

    pub fn is_visible(&self) -> bool {
        self.state().shown.is_some()
    }

    /// Number of alerts shown so far.
    pub fn raised(&self) -> u32 {
        self.state().raised
    }

    /// Number of times an alert left the screen, manually or by timer.
    pub fn dismissals(&self) -> u32 {
        self.state().dismissals
    }
}
