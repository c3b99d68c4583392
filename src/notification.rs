//! Host collaborator surface: formatting, status badge and notifications.

pub mod console_notifier;
pub mod format;
pub mod notifier;

pub use console_notifier::ConsoleNotifier;
pub use notifier::{IndicatorState, NotificationKind, Notifier, DEFAULT_NOTIFICATION_DURATION};
