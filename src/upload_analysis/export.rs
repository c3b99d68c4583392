//! Report export of the last completed analysis.
//!
//! Three formats are produced from the same [`AnalysisRecord`]: pretty printed JSON,
//! a flat per-frame CSV and a human readable text report. Every artifact shares the
//! timestamped base name `violence_detection_report_<YYYY-MM-DDTHH-MM-SS>`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error_handling::types::ExportError;
use crate::notification::format::{confidence_percent, format_file_size, format_offset};
use crate::service_client::types::{AnalysisResult, FrameResult};
use crate::upload_analysis::rendering::{frame_status, rounded_percentage, Verdict};

pub const REPORT_PREFIX: &str = "violence_detection_report";
pub const CSV_HEADER: &str = "Frame,Timestamp,Is_Violent,Confidence";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ReportFormat {
    Json,
    Csv,
    #[value(name = "txt", alias = "text")]
    Text,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Text => "txt",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Csv => "text/csv",
            ReportFormat::Text => "text/plain",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            ReportFormat::Json => "JSON report exported successfully",
            ReportFormat::Csv => "CSV report exported successfully",
            ReportFormat::Text => "Text report exported successfully",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A finished analysis together with the file it was produced from.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub file_name: String,
    pub file_size: u64,
    pub completed_at: DateTime<Utc>,
    pub result: AnalysisResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInfo {
    pub file_name: String,
    pub file_size: u64,
    pub analysis_date: String,
    pub total_frames: u64,
    pub analyzed_frames: u64,
    pub violent_frames: u64,
    pub violence_percentage: f64,
    pub is_violent_video: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonReport {
    pub analysis_info: AnalysisInfo,
    pub frame_results: Vec<FrameResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedReport {
    pub format: ReportFormat,
    pub file_name: String,
    pub contents: String,
}

pub fn report_base_name(now: DateTime<Utc>) -> String {
    format!("{}_{}", REPORT_PREFIX, now.format("%Y-%m-%dT%H-%M-%S"))
}

pub fn build_report(
    record: &AnalysisRecord,
    format: ReportFormat,
    now: DateTime<Utc>,
) -> Result<ExportedReport, ExportError> {
    let contents = match format {
        ReportFormat::Json => json_report(record, now)?,
        ReportFormat::Csv => csv_report(&record.result),
        ReportFormat::Text => text_report(record, now),
    };
    Ok(ExportedReport {
        format,
        file_name: format!("{}.{}", report_base_name(now), format.extension()),
        contents,
    })
}

pub fn json_report(record: &AnalysisRecord, now: DateTime<Utc>) -> Result<String, ExportError> {
    let result = &record.result;
    let report = JsonReport {
        analysis_info: AnalysisInfo {
            file_name: record.file_name.clone(),
            file_size: record.file_size,
            analysis_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_frames: result.total_frames,
            analyzed_frames: result.analyzed_frames,
            violent_frames: result.violent_frames,
            violence_percentage: result.violence_percentage,
            is_violent_video: result.is_violent_video,
        },
        frame_results: result.frame_results.clone(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn csv_report(result: &AnalysisResult) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for frame in &result.frame_results {
        let _ = writeln!(
            out,
            "{},{},{},{}",
            frame.frame, frame.timestamp, frame.is_violent, frame.confidence
        );
    }
    out
}

pub fn text_report(record: &AnalysisRecord, now: DateTime<Utc>) -> String {
    let result = &record.result;
    let generated = now.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");

    let mut out = String::new();
    let _ = writeln!(out, "Violence Detection Report");
    let _ = writeln!(out, "Generated: {}", generated);
    let _ = writeln!(out);
    let _ = writeln!(out, "File Information:");
    let _ = writeln!(out, "- Name: {}", record.file_name);
    let _ = writeln!(out, "- Size: {}", format_file_size(record.file_size));
    let _ = writeln!(out);
    let _ = writeln!(out, "Analysis Results:");
    let _ = writeln!(out, "- Total Frames: {}", result.total_frames);
    let _ = writeln!(out, "- Analyzed Frames: {}", result.analyzed_frames);
    let _ = writeln!(out, "- Violent Frames: {}", result.violent_frames);
    let _ = writeln!(
        out,
        "- Violence Percentage: {}%",
        rounded_percentage(result.violence_percentage)
    );
    let _ = writeln!(out, "- Overall Verdict: {}", Verdict::from_result(result));
    let _ = writeln!(out);

    if !result.frame_results.is_empty() {
        let _ = writeln!(out, "Frame-by-Frame Results:");
        for frame in &result.frame_results {
            let _ = writeln!(
                out,
                "{}: {} ({}%)",
                format_offset(frame.timestamp),
                frame_status(frame.is_violent),
                confidence_percent(frame.confidence)
            );
        }
    }
    out
}

/// Writes `report` into `dir`, creating the directory when missing.
pub fn write_report(report: &ExportedReport, dir: &Path) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&report.file_name);
    std::fs::write(&path, report.contents.as_bytes())?;
    info!(
        "Exported {} report to {} ({})",
        report.format,
        path.display(),
        report.format.mime()
    );
    Ok(path)
}
