// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::error::ZipScaleResult;

/// Port for reading the source archive
#[async_trait]
pub trait ArchiveReaderPort: Send + Sync {
    /// List every entry from the table of contents, in archive order
    async fn list_entries(&self) -> ZipScaleResult<Vec<ArchiveEntry>>;

    /// Materialize exactly one entry under `destination_root`, preserving its relative path
    async fn extract_entry(
        &self,
        path: &str,
        destination_root: &Path,
    ) -> Result<PathBuf, DomainError>;

    /// Size of the archive file on disk
    fn archive_size(&self) -> u64;
}

/// Whether a directory marker was written or already existed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerOutcome {
    Added,
    AlreadyPresent,
}

/// Port for building the destination archive incrementally
#[async_trait]
pub trait ArchiveWriterPort: Send + Sync {
    /// Add one local file under `internal_path`; the archive is valid once this returns
    async fn append_file(&self, local_path: &Path, internal_path: &str) -> Result<(), DomainError>;

    /// Add a zero-length directory entry, tolerating an existing one
    async fn add_directory_marker(&self, internal_path: &str) -> Result<MarkerOutcome, DomainError>;

    /// Size of the archive file on disk
    fn archive_size(&self) -> u64;
}

/// Port for the external media transcoder
#[async_trait]
pub trait TransformPort: Send + Sync {
    /// Confirm the transcoder can be run at all
    async fn check_available(&self) -> ZipScaleResult<()>;

    /// Transcode `request.input` into `request.output`; succeeds only if the output exists
    async fn transform(&self, request: &TransformRequest) -> Result<PathBuf, DomainError>;
}

/// Port for reading stream dimensions
#[async_trait]
pub trait ProbePort: Send + Sync {
    async fn probe_resolution(&self, file_path: &Path) -> Result<Resolution, DomainError>;
}

/// Port for the human-readable reporting side channel
pub trait ReportPort: Send + Sync {
    /// Called once after listing
    fn on_run_start(&self, source: &str, total: usize);

    /// Called before an item is extracted
    fn on_item_start(&self, progress: &ProgressSnapshot, entry: &VideoEntry);

    /// Called once an item reaches a terminal state
    fn on_item_finished(&self, progress: &ProgressSnapshot, record: &ItemRecord);

    /// Called for scratch files that could not be removed
    fn on_cleanup_warning(&self, warning: &CleanupWarning);

    /// Called once after directory replication
    fn on_run_complete(&self, summary: &RunSummary);
}
