// Convert interactor - Orchestrates the extract, transcode, append, cleanup pipeline

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};

use crate::adapters::fs_scratch::{ScratchLease, ScratchSpace};
use crate::app::structure_replicator::StructureReplicator;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::error::{ZipScaleError, ZipScaleResult};
use crate::ports::*;

/// Display names and selection rules for one conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub source_label: String,
    pub destination_label: String,
    pub filter: VideoFilter,
    pub suffix: String,
}

/// Interactor for the archive conversion use case
pub struct ConvertInteractor {
    reader: Arc<dyn ArchiveReaderPort>,
    writer: Arc<dyn ArchiveWriterPort>,
    transform_port: Arc<dyn TransformPort>,
    probe_port: Arc<dyn ProbePort>,
    report_port: Arc<dyn ReportPort>,
    scratch: ScratchSpace,
    options: ConvertOptions,
}

/// Facts gathered about an item while it moves through the pipeline
#[derive(Debug, Default)]
struct ItemMetrics {
    original_size: Option<u64>,
    converted_size: Option<u64>,
    original_resolution: Option<Resolution>,
    converted_resolution: Option<Resolution>,
}

fn local_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}

impl ConvertInteractor {
    /// Create new convert interactor with injected ports
    pub fn new(
        reader: Arc<dyn ArchiveReaderPort>,
        writer: Arc<dyn ArchiveWriterPort>,
        transform_port: Arc<dyn TransformPort>,
        probe_port: Arc<dyn ProbePort>,
        report_port: Arc<dyn ReportPort>,
        scratch: ScratchSpace,
        options: ConvertOptions,
    ) -> Self {
        Self {
            reader,
            writer,
            transform_port,
            probe_port,
            report_port,
            scratch,
            options,
        }
    }

    pub fn scratch(&self) -> &ScratchSpace {
        &self.scratch
    }

    /// Run the whole conversion. Only listing the source can fail the run; every
    /// per-item error is recorded and the loop moves on.
    pub async fn execute(&self) -> ZipScaleResult<RunReport> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let entries = self.reader.list_entries().await?;
        let videos = self.options.filter.select(&entries);
        info!(
            "Listed {} entries in {}, {} selected for conversion",
            entries.len(),
            self.options.source_label,
            videos.len()
        );
        self.report_port.on_run_start(&self.options.source_label, videos.len());

        let mut progress = ProgressState::new(videos.len());
        let mut items = Vec::with_capacity(videos.len());

        for entry in &videos {
            let index = progress.begin_item();
            self.report_port.on_item_start(&progress.snapshot(), entry);

            let record = self.process_item(index, entry).await;
            progress.record(record.succeeded());
            self.report_port.on_item_finished(&progress.snapshot(), &record);
            self.report_residual_files(index);
            items.push(record);
        }

        let directories = StructureReplicator::new(Arc::clone(&self.writer))
            .replicate(&entries)
            .await;

        let final_progress = progress.snapshot();
        debug_assert_eq!(final_progress.completed(), videos.len());

        let summary = RunSummary {
            source_archive: self.options.source_label.clone(),
            destination_archive: self.options.destination_label.clone(),
            total: videos.len(),
            succeeded: final_progress.succeeded,
            failed: final_progress.failed,
            source_size: self.reader.archive_size(),
            destination_size: self.writer.archive_size(),
            directories,
            elapsed_ms: clock.elapsed().as_millis() as u64,
            started_at,
            finished_at: Utc::now(),
        };
        self.report_port.on_run_complete(&summary);

        Ok(RunReport { summary, items })
    }

    /// Drive one item to a terminal state; scratch files are gone when this returns
    async fn process_item(&self, index: usize, entry: &VideoEntry) -> ItemRecord {
        let started = Instant::now();
        let mut item = WorkItem::new(entry, &self.options.suffix);
        let mut metrics = ItemMetrics::default();
        let mut lease = self.scratch.lease();

        if let Err(error) = self
            .run_stages(index, &mut item, &mut lease, &mut metrics)
            .await
        {
            debug!("Item {} failed in state {:?}", index, item.state());
            item.fail(error);
        }

        for warning in lease.release() {
            self.report_port.on_cleanup_warning(&warning);
        }

        let failure = item.failure();
        ItemRecord {
            index,
            source_path: item.source_path.clone(),
            output_path: item.output_internal_path.clone(),
            state: item.state(),
            failure_kind: failure.map(|e| e.kind().to_string()),
            failure_reason: failure.map(|e| e.to_string()),
            original_size: metrics.original_size,
            converted_size: metrics.converted_size,
            original_resolution: metrics.original_resolution,
            converted_resolution: metrics.converted_resolution,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    async fn run_stages(
        &self,
        index: usize,
        item: &mut WorkItem,
        lease: &mut ScratchLease,
        metrics: &mut ItemMetrics,
    ) -> Result<(), DomainError> {
        let extracted = self
            .reader
            .extract_entry(&item.source_path, &self.scratch.extract_root())
            .await?;
        lease.track(&extracted);
        item.mark_extracted(extracted.clone());
        metrics.original_size = local_size(&extracted);
        metrics.original_resolution = self.probe(&extracted).await;

        // Registered before the transform runs so partial output is always removed
        let request = TransformRequest {
            input: extracted,
            output: self.scratch.converted_path(index, &item.output_internal_path),
        };
        lease.track(&request.output);

        let converted = self.transform_port.transform(&request).await?;
        lease.track(&converted);
        item.mark_converted(converted.clone());
        metrics.converted_size = local_size(&converted);
        metrics.converted_resolution = self.probe(&converted).await;

        self.writer
            .append_file(&converted, &item.output_internal_path)
            .await?;
        item.mark_appended();
        Ok(())
    }

    async fn probe(&self, path: &Path) -> Option<Resolution> {
        match self.probe_port.probe_resolution(path).await {
            Ok(resolution) => Some(resolution),
            Err(e) => {
                debug!("Resolution unknown for {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Anything still under the scratch root after an item has been released leaked
    fn report_residual_files(&self, index: usize) {
        for path in self.scratch.residual_files() {
            self.report_port.on_cleanup_warning(&CleanupWarning {
                path: path.display().to_string(),
                reason: format!("still present after item {} finished", index),
            });
        }
    }
}

/// Persist a run report as pretty-printed JSON
pub fn write_report(report: &RunReport, path: &Path) -> ZipScaleResult<()> {
    let json = serde_json::to_string_pretty(report).map_err(|e| ZipScaleError::ReportError {
        message: format!("JSON serialization failed: {}", e),
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ZipScaleError::ReportError {
            message: format!("Failed to create {}: {}", parent.display(), e),
        })?;
    }
    std::fs::write(path, json).map_err(|e| ZipScaleError::ReportError {
        message: format!("Failed to write {}: {}", path.display(), e),
    })?;
    info!("Run report written to {}", path.display());
    Ok(())
}
