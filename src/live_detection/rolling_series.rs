//! Fixed-capacity confidence series feeding the live chart.

use std::collections::VecDeque;

/// Confidence above which the current-value marker is drawn as danger.
pub const MARKER_DANGER_THRESHOLD: f64 = 0.6;

/// FIFO buffer of confidence values. Pushing past capacity evicts the oldest value.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingSeries {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RollingSeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `confidence` and returns the evicted value, if any.
    pub fn push(&mut self, confidence: f64) -> Option<f64> {
        self.values.push_back(confidence);
        if self.values.len() > self.capacity {
            self.values.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Polyline points for a `width` x `height` canvas, origin at the top left.
    ///
    /// Points are spaced for a full buffer so the line grows from the left edge.
    pub fn plot(&self, width: f64, height: f64) -> Vec<(f64, f64)> {
        let spacing = if self.capacity > 1 {
            width / (self.capacity - 1) as f64
        } else {
            0.0
        };
        self.values
            .iter()
            .enumerate()
            .map(|(i, c)| (i as f64 * spacing, height - c * height))
            .collect()
    }

    /// Whether the marker on the latest value should be drawn as danger.
    pub fn marker_is_danger(&self) -> bool {
        self.latest()
            .map(|c| c > MARKER_DANGER_THRESHOLD)
            .unwrap_or(false)
    }
}
