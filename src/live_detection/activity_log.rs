//! Newest-first activity log of applied live results.

use std::collections::VecDeque;

use crate::notification::format::confidence_percent;
use crate::service_client::types::DetectionResult;

/// Placeholder text rendered while the log has never received an entry.
pub const EMPTY_LOG_MESSAGE: &str = "No detections yet";

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub is_violent: bool,
    pub status: &'static str,
    pub confidence_percent: u32,
    pub time_label: String,
}

impl LogEntry {
    /// Builds an entry from a result; `time_label` is already formatted by the host.
    pub fn from_result(result: &DetectionResult, time_label: String) -> Self {
        Self {
            is_violent: result.is_violent,
            status: status_label(result.is_violent),
            confidence_percent: confidence_percent(result.confidence),
            time_label,
        }
    }

    pub fn details(&self) -> String {
        format!("Confidence: {}%", self.confidence_percent)
    }
}

pub fn status_label(is_violent: bool) -> &'static str {
    if is_violent {
        "Violence Detected"
    } else {
        "Safe"
    }
}

#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    placeholder_visible: bool,
    placeholder_removals: u32,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            placeholder_visible: true,
            placeholder_removals: 0,
        }
    }

    /// Inserts at the top, dropping the oldest entry once over capacity.
    pub fn insert(&mut self, entry: LogEntry) -> Option<LogEntry> {
        if self.placeholder_visible {
            self.placeholder_visible = false;
            self.placeholder_removals += 1;
        }
        self.entries.push_front(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn newest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn placeholder_visible(&self) -> bool {
        self.placeholder_visible
    }

    pub fn placeholder_removals(&self) -> u32 {
        self.placeholder_removals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: u32) -> LogEntry {
        LogEntry {
            is_violent: n % 2 == 0,
            status: status_label(n % 2 == 0),
            confidence_percent: n,
            time_label: format!("t{}", n),
        }
    }

    #[test]
    fn test_capacity_and_order() {
        let mut log = ActivityLog::new(20);
        for n in 0..20 {
            assert!(log.insert(entry(n)).is_none());
        }
        let evicted = log.insert(entry(20)).unwrap();
        assert_eq!(evicted.confidence_percent, 0);
        assert_eq!(log.len(), 20);
        assert_eq!(log.newest().unwrap().confidence_percent, 20);
        assert_eq!(log.entries().last().unwrap().confidence_percent, 1);
    }

    #[test]
    fn test_placeholder_removed_once() {
        let mut log = ActivityLog::new(20);
        assert!(log.placeholder_visible());
        assert_eq!(log.placeholder_removals(), 0);

        for n in 0..45 {
            log.insert(entry(n));
        }
        assert!(!log.placeholder_visible());
        assert_eq!(log.placeholder_removals(), 1);
    }

    #[test]
    fn test_entry_from_result() {
        let result = DetectionResult {
            confidence: 0.734,
            is_violent: true,
            timestamp: 0.0,
        };
        let entry = LogEntry::from_result(&result, "12:00:00".to_string());
        assert_eq!(entry.status, "Violence Detected");
        assert_eq!(entry.details(), "Confidence: 73%");
        assert_eq!(entry.time_label, "12:00:00");
    }
}
