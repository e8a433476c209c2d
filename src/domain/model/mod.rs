// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::rules;

/// One record from an archive's table of contents
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Internal slash-separated path
    pub path: String,
    pub is_directory: bool,
}

impl ArchiveEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self { path: path.into(), is_directory: false }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self { path: path.into(), is_directory: true }
    }
}

/// How the pipeline treats a listed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Video,
    Shadow,
    Directory,
    Other,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Video => "video",
            EntryKind::Shadow => "shadow",
            EntryKind::Directory => "directory",
            EntryKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// Decides which entries are units of work
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFilter {
    extensions: Vec<String>,
    shadow_prefix: String,
}

impl VideoFilter {
    /// Create a filter; extensions are matched case-insensitively, with or without a leading dot
    pub fn new<I, S>(extensions: I, shadow_prefix: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self {
            extensions,
            shadow_prefix: shadow_prefix.into(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn classify(&self, entry: &ArchiveEntry) -> EntryKind {
        if entry.is_directory || entry.path.ends_with('/') {
            return EntryKind::Directory;
        }
        if !rules::has_video_extension(&entry.path, &self.extensions) {
            return EntryKind::Other;
        }
        if rules::is_shadow_path(&entry.path, &self.shadow_prefix) {
            return EntryKind::Shadow;
        }
        EntryKind::Video
    }

    /// Video entries in listing order
    pub fn select(&self, entries: &[ArchiveEntry]) -> Vec<VideoEntry> {
        entries
            .iter()
            .filter(|entry| self.classify(entry) == EntryKind::Video)
            .map(|entry| VideoEntry { path: entry.path.clone() })
            .collect()
    }
}

impl Default for VideoFilter {
    fn default() -> Self {
        Self::new(["mp4", "mov", "m4v", "mkv", "avi"], "._")
    }
}

/// An archive entry that will be transcoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub path: String,
}

impl VideoEntry {
    pub fn output_path(&self, suffix: &str) -> String {
        rules::derive_output_path(&self.path, suffix)
    }
}

/// Pixel dimensions of a video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Encoder settings handed to the transform port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodeSettings {
    pub target_height: u32,
    pub crf: u8,
    pub preset: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Kill the transcoder after this long; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            target_height: 720,
            crf: 23,
            preset: "medium".to_string(),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            timeout: Some(Duration::from_secs(2 * 60 * 60)),
        }
    }
}

impl TranscodeSettings {
    /// Default output suffix for these settings, e.g. `_720p`
    pub fn default_suffix(&self) -> String {
        format!("_{}p", self.target_height)
    }
}

/// Input and declared output of one transform invocation
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Lifecycle of a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Pending,
    Extracted,
    Converted,
    Appended,
    Failed,
}

impl ItemState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemState::Appended | ItemState::Failed)
    }
}

/// Ephemeral per-entry state owned by one loop iteration
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub source_path: String,
    pub output_internal_path: String,
    pub extracted_path: Option<PathBuf>,
    pub transformed_path: Option<PathBuf>,
    state: ItemState,
    failure: Option<DomainError>,
}

impl WorkItem {
    pub fn new(entry: &VideoEntry, suffix: &str) -> Self {
        Self {
            source_path: entry.path.clone(),
            output_internal_path: entry.output_path(suffix),
            extracted_path: None,
            transformed_path: None,
            state: ItemState::Pending,
            failure: None,
        }
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn failure(&self) -> Option<&DomainError> {
        self.failure.as_ref()
    }

    pub fn mark_extracted(&mut self, path: PathBuf) {
        self.advance(ItemState::Pending, ItemState::Extracted);
        self.extracted_path = Some(path);
    }

    pub fn mark_converted(&mut self, path: PathBuf) {
        self.advance(ItemState::Extracted, ItemState::Converted);
        self.transformed_path = Some(path);
    }

    pub fn mark_appended(&mut self) {
        self.advance(ItemState::Converted, ItemState::Appended);
    }

    /// First error wins; terminal items are left untouched
    pub fn fail(&mut self, error: DomainError) {
        if self.state.is_terminal() {
            return;
        }
        self.state = ItemState::Failed;
        self.failure = Some(error);
    }

    fn advance(&mut self, from: ItemState, to: ItemState) {
        debug_assert_eq!(self.state, from, "illegal transition to {:?}", to);
        if self.state == from {
            self.state = to;
        }
    }
}

/// Terminal outcome of one item, as reported and persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub index: usize,
    pub source_path: String,
    pub output_path: String,
    pub state: ItemState,
    pub failure_kind: Option<String>,
    pub failure_reason: Option<String>,
    pub original_size: Option<u64>,
    pub converted_size: Option<u64>,
    pub original_resolution: Option<Resolution>,
    pub converted_resolution: Option<Resolution>,
    pub duration_ms: u64,
}

impl ItemRecord {
    pub fn succeeded(&self) -> bool {
        self.state == ItemState::Appended
    }

    pub fn size_reduction(&self) -> Option<f64> {
        match (self.original_size, self.converted_size) {
            (Some(original), Some(converted)) => rules::size_reduction_percent(original, converted),
            _ => None,
        }
    }
}

/// Read-only view of the run's progress handed to reporting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub current: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn percent(&self) -> u32 {
        rules::progress_percent(self.current, self.total)
    }

    pub fn eta(&self) -> Option<Duration> {
        rules::estimate_remaining(self.elapsed, self.completed(), self.total)
    }
}

/// Run counters, owned and mutated by the orchestrator only
#[derive(Debug, Clone)]
pub struct ProgressState {
    total: usize,
    current: usize,
    succeeded: usize,
    failed: usize,
    started: Instant,
}

impl ProgressState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            current: 0,
            succeeded: 0,
            failed: 0,
            started: Instant::now(),
        }
    }

    /// Move to the next item; returns its 1-based index
    pub fn begin_item(&mut self) -> usize {
        debug_assert!(self.current < self.total, "more items than listed");
        debug_assert_eq!(self.current, self.succeeded + self.failed, "previous item not recorded");
        self.current += 1;
        self.current
    }

    pub fn record(&mut self, succeeded: bool) {
        if succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        debug_assert_eq!(self.current, self.succeeded + self.failed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total,
            current: self.current,
            succeeded: self.succeeded,
            failed: self.failed,
            elapsed: self.started.elapsed(),
        }
    }
}

/// Outcome of replaying directory entries into the destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationReport {
    pub added: usize,
    pub already_present: usize,
    pub failed: usize,
}

/// Final immutable snapshot of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub source_archive: String,
    pub destination_archive: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub source_size: u64,
    pub destination_size: u64,
    pub directories: ReplicationReport,
    pub elapsed_ms: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    pub fn size_reduction(&self) -> Option<f64> {
        rules::size_reduction_percent(self.source_size, self.destination_size)
    }
}

/// Persisted run result: summary plus every item's outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub items: Vec<ItemRecord>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &ItemRecord> {
        self.items.iter().filter(|item| !item.succeeded())
    }
}

#[cfg(test)]
mod tests;
