use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

/// Identifies one live run. Background tasks hold a copy and stop once it is no longer current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub started_at: DateTime<Utc>,
    /// Monotonic start, drives the duration clock.
    pub started: Instant,
    pub total_detections: u64,
}

impl Session {
    pub fn begin() -> Self {
        Self {
            token: SessionToken::new(),
            started_at: Utc::now(),
            started: Instant::now(),
            total_detections: 0,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// Lifecycle of the live controller. `Starting` and `Stopping` cover the remote round-trips.
#[derive(Debug, Clone)]
pub enum LivePhase {
    Idle,
    Starting,
    Active(Session),
    Stopping,
}

impl LivePhase {
    pub fn session(&self) -> Option<&Session> {
        match self {
            LivePhase::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LivePhase::Active(_))
    }

    /// True while `token` still names the running session.
    pub fn is_current(&self, token: SessionToken) -> bool {
        self.session().map(|s| s.token == token).unwrap_or(false)
    }
}
