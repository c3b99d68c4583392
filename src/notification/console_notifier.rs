use std::time::Duration;

use log::{error, info, warn};

use super::notifier::{IndicatorState, NotificationKind, Notifier, DEFAULT_NOTIFICATION_DURATION};

/// Notifier for terminal hosts: every user-facing message goes through the `log` facade.
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn update_status_indicator(&self, indicator: &str, state: IndicatorState, label: &str) {
        info!("[{}] {} ({})", indicator, label, state);
    }

    fn show_notification(&self, message: &str, kind: NotificationKind, duration: Option<Duration>) {
        let duration = duration.unwrap_or(DEFAULT_NOTIFICATION_DURATION);
        match kind {
            NotificationKind::Error => error!("{}", message),
            NotificationKind::Warning => warn!("{}", message),
            NotificationKind::Info | NotificationKind::Success => {
                info!("{} [{} for {}ms]", message, kind, duration.as_millis())
            }
        }
    }
}
