//! Notifier trait
//!
//! The host supplies a `Notifier` to both controllers. It owns everything that reaches the user:
//! the status badge, transient notifications and the time formatting used in labels. Formatting
//! has default implementations so most hosts only provide the two side-effecting operations.

use std::fmt;
use std::time::Duration;

use crate::notification::format;

/// Default lifetime of a notification when the caller does not pass one.
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Info => write!(f, "info"),
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Warning => write!(f, "warning"),
            NotificationKind::Error => write!(f, "error"),
        }
    }
}

/// State shown by a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    Idle,
    Active,
}

impl fmt::Display for IndicatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorState::Idle => write!(f, "idle"),
            IndicatorState::Active => write!(f, "active"),
        }
    }
}

pub trait Notifier: Send + Sync {
    /// `MM:SS` rendering of whole seconds.
    fn format_time(&self, seconds: u64) -> String {
        format::format_time(seconds)
    }

    /// Display rendering of an epoch timestamp in seconds.
    fn format_timestamp(&self, timestamp: f64) -> String {
        format::format_timestamp(timestamp)
    }

    /// Updates the badge identified by `indicator`.
    fn update_status_indicator(&self, indicator: &str, state: IndicatorState, label: &str);

    /// Shows a transient message. `None` means [`DEFAULT_NOTIFICATION_DURATION`].
    fn show_notification(&self, message: &str, kind: NotificationKind, duration: Option<Duration>);
}
