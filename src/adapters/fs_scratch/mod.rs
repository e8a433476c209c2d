// Scratch filesystem adapter - Run-scoped working directory and per-item cleanup guards

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::domain::errors::CleanupWarning;
use crate::error::{ZipScaleError, ZipScaleResult};

const EXTRACT_DIR: &str = "extract";
const CONVERTED_DIR: &str = "converted";

/// Working directory unique to one run; removed when dropped
pub struct ScratchSpace {
    root: TempDir,
}

impl ScratchSpace {
    /// Create `zipscale-XXXX` under `parent` (system temp dir when `None`)
    pub fn create(parent: Option<&Path>) -> ZipScaleResult<Self> {
        let parent = parent
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir);
        let unavailable = |e: io::Error| ZipScaleError::ScratchUnavailable {
            path: parent.display().to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(&parent).map_err(unavailable)?;
        let root = tempfile::Builder::new()
            .prefix("zipscale-")
            .tempdir_in(&parent)
            .map_err(unavailable)?;
        for sub in [EXTRACT_DIR, CONVERTED_DIR] {
            fs::create_dir_all(root.path().join(sub)).map_err(unavailable)?;
        }

        debug!("Scratch space at {}", root.path().display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Where the reader materializes entries
    pub fn extract_root(&self) -> PathBuf {
        self.root.path().join(EXTRACT_DIR)
    }

    /// Declared transform output for an item, flattened to avoid colliding subpaths
    pub fn converted_path(&self, index: usize, output_internal_path: &str) -> PathBuf {
        let file_name = output_internal_path
            .rsplit('/')
            .next()
            .unwrap_or(output_internal_path);
        self.root
            .path()
            .join(CONVERTED_DIR)
            .join(format!("{:06}-{}", index, file_name))
    }

    /// Start tracking the files of one item
    pub fn lease(&self) -> ScratchLease {
        ScratchLease {
            files: Vec::new(),
            prune_stop: self.root.path().to_path_buf(),
            warnings: Vec::new(),
        }
    }

    /// Regular files currently present anywhere under the scratch root
    pub fn residual_files(&self) -> Vec<PathBuf> {
        WalkDir::new(self.root.path())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect()
    }
}

/// Owns the scratch files of one item and deletes them when released or dropped.
///
/// Files are registered before the operation that creates them runs, so a transform
/// that dies half-way still has its partial output removed.
pub struct ScratchLease {
    files: Vec<PathBuf>,
    prune_stop: PathBuf,
    warnings: Vec<CleanupWarning>,
}

impl ScratchLease {
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.files.contains(&path) {
            self.files.push(path);
        }
    }

    pub fn tracked(&self) -> &[PathBuf] {
        &self.files
    }

    /// Delete everything tracked and report what could not be removed
    pub fn release(mut self) -> Vec<CleanupWarning> {
        self.cleanup();
        std::mem::take(&mut self.warnings)
    }

    fn cleanup(&mut self) {
        for path in std::mem::take(&mut self.files) {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed scratch file {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    self.warnings.push(CleanupWarning {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            }
            self.prune_empty_parents(&path);
        }
    }

    /// Remove directories left empty by extraction, stopping below the scratch root
    fn prune_empty_parents(&self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir == self.prune_stop || !dir.starts_with(&self.prune_stop) {
                break;
            }
            if dir.file_name().map_or(false, |n| n == EXTRACT_DIR || n == CONVERTED_DIR)
                && dir.parent() == Some(self.prune_stop.as_path())
            {
                break;
            }
            if fs::remove_dir(dir).is_err() {
                break;
            }
            current = dir.parent();
        }
    }
}

impl Drop for ScratchLease {
    fn drop(&mut self) {
        if self.files.is_empty() {
            return;
        }
        self.cleanup();
        for warning in self.warnings.drain(..) {
            warn!("{}", warning);
        }
    }
}
