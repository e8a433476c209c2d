// Structure replicator - Recreates the source archive's directory entries in the destination

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::model::*;
use crate::ports::*;

/// Replays directory markers after all videos have been processed
pub struct StructureReplicator {
    writer: Arc<dyn ArchiveWriterPort>,
}

impl StructureReplicator {
    pub fn new(writer: Arc<dyn ArchiveWriterPort>) -> Self {
        Self { writer }
    }

    /// Add a marker for every directory entry; existing markers are counted, not errors
    pub async fn replicate(&self, entries: &[ArchiveEntry]) -> ReplicationReport {
        let mut report = ReplicationReport::default();

        for entry in entries.iter().filter(|e| e.is_directory) {
            match self.writer.add_directory_marker(&entry.path).await {
                Ok(MarkerOutcome::Added) => {
                    debug!("Added directory {}", entry.path);
                    report.added += 1;
                }
                Ok(MarkerOutcome::AlreadyPresent) => {
                    debug!("Directory {} already present", entry.path);
                    report.already_present += 1;
                }
                Err(e) => {
                    warn!("Could not add directory {}: {}", entry.path, e);
                    report.failed += 1;
                }
            }
        }
        report
    }
}
