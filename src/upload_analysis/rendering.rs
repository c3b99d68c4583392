use std::fmt;

use serde::Serialize;

use crate::notification::format::{confidence_percent, format_count, format_offset};
use crate::service_client::types::{AnalysisResult, FrameResult};

pub const EMPTY_TIMELINE_MESSAGE: &str = "No detailed frame data available";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Safe,
    Danger,
}

impl Verdict {
    pub fn from_result(result: &AnalysisResult) -> Self {
        if result.is_violent_video {
            Verdict::Danger
        } else {
            Verdict::Safe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Safe => "Safe",
            Verdict::Danger => "Violence Detected",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Danger => "danger",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub time_label: String,
    pub is_violent: bool,
    pub status: &'static str,
    pub confidence_label: String,
}

impl TimelineEntry {
    pub fn from_frame(frame: &FrameResult) -> Self {
        Self {
            time_label: format_offset(frame.timestamp),
            is_violent: frame.is_violent,
            status: frame_status(frame.is_violent),
            confidence_label: format!("{}% confidence", confidence_percent(frame.confidence)),
        }
    }
}

pub fn frame_status(is_violent: bool) -> &'static str {
    if is_violent {
        "Violence"
    } else {
        "Safe"
    }
}

/// Whole-number percentage as displayed, rounded half away from zero.
pub fn rounded_percentage(percentage: f64) -> u64 {
    percentage.max(0.0).round() as u64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Timeline {
    Placeholder(&'static str),
    Entries(Vec<TimelineEntry>),
}

/// Display model of a finished analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub verdict: Verdict,
    pub confidence_label: String,
    pub total_frames: String,
    pub analyzed_frames: String,
    pub violent_frames: String,
    pub violence_percentage: String,
    pub timeline: Timeline,
}

impl ResultsView {
    pub fn render(result: &AnalysisResult) -> Self {
        let percentage = rounded_percentage(result.violence_percentage);
        let timeline = if result.frame_results.is_empty() {
            Timeline::Placeholder(EMPTY_TIMELINE_MESSAGE)
        } else {
            Timeline::Entries(
                result
                    .frame_results
                    .iter()
                    .map(TimelineEntry::from_frame)
                    .collect(),
            )
        };

        Self {
            verdict: Verdict::from_result(result),
            confidence_label: format!("Confidence: {}%", percentage),
            total_frames: format_count(result.total_frames),
            analyzed_frames: format_count(result.analyzed_frames),
            violent_frames: format_count(result.violent_frames),
            violence_percentage: format!("{}%", percentage),
            timeline,
        }
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Verdict: {} ({})", self.verdict, self.confidence_label)?;
        writeln!(f, "Total frames:        {}", self.total_frames)?;
        writeln!(f, "Analyzed frames:     {}", self.analyzed_frames)?;
        writeln!(f, "Violent frames:      {}", self.violent_frames)?;
        writeln!(f, "Violence percentage: {}", self.violence_percentage)?;
        writeln!(f, "Timeline:")?;
        match &self.timeline {
            Timeline::Placeholder(message) => writeln!(f, "  {}", message),
            Timeline::Entries(entries) => {
                for entry in entries {
                    writeln!(
                        f,
                        "  {}  {:<8}  {}",
                        entry.time_label, entry.status, entry.confidence_label
                    )?;
                }
                Ok(())
            }
        }
    }
}
