// Inspect interactor - Shows what a conversion run would do with an archive

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::model::*;
use crate::error::{ZipScaleError, ZipScaleResult};
use crate::ports::*;
use crate::utils::Utils;

/// Output format of the inspect command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectFormat {
    Text,
    Json,
}

/// One listed entry and how it would be treated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectedEntry {
    pub path: String,
    pub kind: EntryKind,
    /// Destination path for videos
    pub output_path: Option<String>,
}

/// Classification of a whole archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectReport {
    pub archive: String,
    pub archive_size: u64,
    pub videos: usize,
    pub shadows: usize,
    pub directories: usize,
    pub others: usize,
    pub entries: Vec<InspectedEntry>,
}

/// Interactor for archive inspection use case
pub struct InspectInteractor {
    reader: Arc<dyn ArchiveReaderPort>,
    filter: VideoFilter,
    suffix: String,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(reader: Arc<dyn ArchiveReaderPort>, filter: VideoFilter, suffix: String) -> Self {
        Self {
            reader,
            filter,
            suffix,
        }
    }

    /// Classify every entry of `archive`
    pub async fn execute(&self, archive: &str) -> ZipScaleResult<InspectReport> {
        info!("Starting archive inspection for: {}", archive);
        let listed = self.reader.list_entries().await?;

        let mut report = InspectReport {
            archive: archive.to_string(),
            archive_size: self.reader.archive_size(),
            videos: 0,
            shadows: 0,
            directories: 0,
            others: 0,
            entries: Vec::with_capacity(listed.len()),
        };

        for entry in listed {
            let kind = self.filter.classify(&entry);
            let output_path = match kind {
                EntryKind::Video => {
                    report.videos += 1;
                    Some(VideoEntry { path: entry.path.clone() }.output_path(&self.suffix))
                }
                EntryKind::Shadow => {
                    report.shadows += 1;
                    None
                }
                EntryKind::Directory => {
                    report.directories += 1;
                    None
                }
                EntryKind::Other => {
                    report.others += 1;
                    None
                }
            };
            report.entries.push(InspectedEntry {
                path: entry.path,
                kind,
                output_path,
            });
        }

        info!("Archive inspection completed: {} video(s)", report.videos);
        Ok(report)
    }

    /// Render a report in the requested format
    pub fn render(&self, report: &InspectReport, format: InspectFormat) -> ZipScaleResult<String> {
        match format {
            InspectFormat::Json => Self::format_as_json(report),
            InspectFormat::Text => Ok(Self::format_as_text(report)),
        }
    }

    fn format_as_json(report: &InspectReport) -> ZipScaleResult<String> {
        serde_json::to_string_pretty(report).map_err(|e| ZipScaleError::ReportError {
            message: format!("JSON serialization failed: {}", e),
        })
    }

    fn format_as_text(report: &InspectReport) -> String {
        let mut output = String::new();

        output.push_str("Archive Information:\n");
        output.push_str(&format!("  File: {}\n", report.archive));
        output.push_str(&format!(
            "  Size: {}\n",
            Utils::format_file_size(report.archive_size)
        ));
        output.push_str(&format!(
            "  Entries: {} ({} video, {} shadow, {} directory, {} other)\n",
            report.entries.len(),
            report.videos,
            report.shadows,
            report.directories,
            report.others
        ));

        if report.videos > 0 {
            output.push_str(&format!("\nVideos to convert ({}):\n", report.videos));
            for entry in report.entries.iter().filter(|e| e.kind == EntryKind::Video) {
                if let Some(target) = &entry.output_path {
                    output.push_str(&format!("  {} -> {}\n", entry.path, target));
                }
            }
        }

        let skipped: Vec<&InspectedEntry> = report
            .entries
            .iter()
            .filter(|e| e.kind == EntryKind::Shadow || e.kind == EntryKind::Other)
            .collect();
        if !skipped.is_empty() {
            output.push_str(&format!("\nSkipped ({}):\n", skipped.len()));
            for entry in skipped {
                output.push_str(&format!("  [{}] {}\n", entry.kind, entry.path));
            }
        }

        if report.directories > 0 {
            output.push_str(&format!("\nDirectories ({}):\n", report.directories));
            for entry in report.entries.iter().filter(|e| e.kind == EntryKind::Directory) {
                output.push_str(&format!("  {}\n", entry.path));
            }
        }

        output
    }
}
