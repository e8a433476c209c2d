// Tracing log adapter - Progress, per-item and summary reporting through tracing

use tracing::{error, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::format_eta;
use crate::ports::*;
use crate::utils::Utils;

/// Reporting sink that writes the run log as tracing events
#[derive(Debug, Default)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

/// `[current/total - percent%] ETA: Hh Mm`
pub fn progress_line(progress: &ProgressSnapshot) -> String {
    let eta = progress
        .eta()
        .map(format_eta)
        .unwrap_or_else(|| "calculating".to_string());
    format!(
        "[{}/{} - {}%] ETA: {}",
        progress.current,
        progress.total,
        progress.percent(),
        eta
    )
}

fn resolution_label(resolution: Option<Resolution>) -> String {
    resolution
        .map(|r| r.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn size_label(size: Option<u64>) -> String {
    size.map(Utils::format_file_size)
        .unwrap_or_else(|| "unknown".to_string())
}

/// `-75.0%` style label, `N/A` when the original size gives no ratio
pub fn reduction_label(reduction: Option<f64>) -> String {
    match reduction {
        Some(percent) => format!("{:.1}%", percent),
        None => "N/A".to_string(),
    }
}

impl ReportPort for TracingReporter {
    fn on_run_start(&self, source: &str, total: usize) {
        info!(source, total, "Found {} video(s) to convert in {}", total, source);
    }

    fn on_item_start(&self, progress: &ProgressSnapshot, entry: &VideoEntry) {
        info!(
            current = progress.current,
            total = progress.total,
            "{} Processing {}",
            progress_line(progress),
            entry.path
        );
    }

    fn on_item_finished(&self, progress: &ProgressSnapshot, record: &ItemRecord) {
        if record.succeeded() {
            info!(
                item = record.index,
                duration_ms = record.duration_ms,
                "Converted {} -> {} | original: {}, {} | converted: {}, {} | reduction: {}",
                record.source_path,
                record.output_path,
                resolution_label(record.original_resolution),
                size_label(record.original_size),
                resolution_label(record.converted_resolution),
                size_label(record.converted_size),
                reduction_label(record.size_reduction()),
            );
        } else {
            error!(
                item = record.index,
                kind = record.failure_kind.as_deref().unwrap_or("unknown"),
                "Failed {}: {} ({} ok / {} failed so far)",
                record.source_path,
                record.failure_reason.as_deref().unwrap_or("unknown error"),
                progress.succeeded,
                progress.failed,
            );
        }
    }

    fn on_cleanup_warning(&self, warning: &CleanupWarning) {
        warn!(path = %warning.path, "{}", warning);
    }

    fn on_run_complete(&self, summary: &RunSummary) {
        info!("=== Conversion summary ===");
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Videos: {} total, {} succeeded, {} failed",
            summary.total,
            summary.succeeded,
            summary.failed
        );
        info!(
            "Directories: {} added, {} already present, {} failed",
            summary.directories.added,
            summary.directories.already_present,
            summary.directories.failed
        );
        info!(
            "Archive size: {} -> {} ({} reduction)",
            Utils::format_file_size(summary.source_size),
            Utils::format_file_size(summary.destination_size),
            reduction_label(summary.size_reduction())
        );
        info!(
            "Elapsed: {} | Output: {}",
            Utils::format_duration(std::time::Duration::from_millis(summary.elapsed_ms)),
            summary.destination_archive
        );
        if !summary.all_succeeded() {
            warn!("{} video(s) failed; see the log above for details", summary.failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_progress_line_format() {
        let snapshot = ProgressSnapshot {
            total: 4,
            current: 3,
            succeeded: 1,
            failed: 1,
            elapsed: Duration::from_secs(2 * 3600),
        };
        assert_eq!(progress_line(&snapshot), "[3/4 - 75%] ETA: 2h 0m");
    }

    #[test]
    fn test_progress_line_before_first_completion() {
        let snapshot = ProgressSnapshot {
            total: 2,
            current: 1,
            succeeded: 0,
            failed: 0,
            elapsed: Duration::from_secs(3),
        };
        assert_eq!(progress_line(&snapshot), "[1/2 - 50%] ETA: calculating");
    }

    #[test]
    fn test_reduction_label() {
        assert_eq!(reduction_label(Some(75.04)), "75.0%");
        assert_eq!(reduction_label(None), "N/A");
    }
}
