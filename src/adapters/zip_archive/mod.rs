// Zip archive adapter - Entry listing, single-entry extraction and incremental appends

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::directory_marker_name;
use crate::error::{ZipScaleError, ZipScaleResult};
use crate::ports::*;

/// Read side of the pipeline, backed by one open handle on the source archive
pub struct ZipArchiveReader {
    path: PathBuf,
    archive: Mutex<ZipArchive<BufReader<File>>>,
}

impl ZipArchiveReader {
    /// Open and parse the central directory; fails if the file is not a readable zip
    pub fn open(path: impl AsRef<Path>) -> ZipScaleResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| unreadable(&path, e))?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|e| unreadable(&path, e))?;
        debug!("Opened {} ({} entries)", path.display(), archive.len());

        Ok(Self {
            path,
            archive: Mutex::new(archive),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn unreadable(path: &Path, error: impl std::fmt::Display) -> ZipScaleError {
    ZipScaleError::ArchiveUnreadable {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

fn extraction_failed(path: &str, reason: impl std::fmt::Display) -> DomainError {
    DomainError::ExtractionFailed {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn append_failed(path: &str, reason: impl std::fmt::Display) -> DomainError {
    DomainError::AppendFailed {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Directories between `root` and `target` that do not exist yet, innermost first
fn missing_parents(target: &Path, root: &Path) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    let mut current = target.parent();
    while let Some(dir) = current {
        if dir == root || !dir.starts_with(root) || dir.exists() {
            break;
        }
        missing.push(dir.to_path_buf());
        current = dir.parent();
    }
    missing
}

fn remove_created(dirs: &[PathBuf]) {
    for dir in dirs {
        if fs::remove_dir(dir).is_err() {
            break;
        }
    }
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[async_trait]
impl ArchiveReaderPort for ZipArchiveReader {
    async fn list_entries(&self) -> ZipScaleResult<Vec<ArchiveEntry>> {
        let mut archive = self
            .archive
            .lock()
            .map_err(|_| unreadable(&self.path, "archive handle poisoned"))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(|e| unreadable(&self.path, e))?;
            entries.push(ArchiveEntry {
                path: file.name().to_string(),
                is_directory: file.is_dir(),
            });
        }
        Ok(entries)
    }

    async fn extract_entry(
        &self,
        path: &str,
        destination_root: &Path,
    ) -> Result<PathBuf, DomainError> {
        let mut archive = self
            .archive
            .lock()
            .map_err(|_| extraction_failed(path, "archive handle poisoned"))?;

        let mut entry = archive
            .by_name(path)
            .map_err(|e| extraction_failed(path, e))?;
        if entry.is_dir() {
            return Err(extraction_failed(path, "entry is a directory"));
        }
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| extraction_failed(path, "entry path escapes the extraction root"))?;

        let target = destination_root.join(relative);
        let created = missing_parents(&target, destination_root);
        let failed = |e: io::Error| {
            remove_created(&created);
            extraction_failed(path, e)
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(failed)?;
        }

        let mut output = File::create(&target).map_err(failed)?;
        let copied = io::copy(&mut entry, &mut output).and_then(|bytes| {
            output.sync_all()?;
            Ok(bytes)
        });

        match copied {
            Ok(bytes) => {
                debug!("Extracted {} ({} bytes) to {}", path, bytes, target.display());
                Ok(target)
            }
            Err(e) => {
                drop(output);
                let _ = fs::remove_file(&target);
                Err(failed(e))
            }
        }
    }

    fn archive_size(&self) -> u64 {
        file_size(&self.path)
    }
}

/// Write side of the pipeline.
///
/// Every call reopens the archive in append mode and finishes it again, so the central
/// directory on disk always describes every entry written so far. Calls are serialized
/// through `write_lock`; the archive format does not tolerate concurrent appenders.
pub struct ZipArchiveWriter {
    path: PathBuf,
    compression: CompressionMethod,
    write_lock: Mutex<()>,
}

impl ZipArchiveWriter {
    /// Create (or truncate) the destination as an empty, valid archive
    pub fn create(path: impl AsRef<Path>, compress: bool) -> ZipScaleResult<Self> {
        let path = path.as_ref().to_path_buf();
        let unwritable = |message: String| ZipScaleError::DestinationUnwritable {
            path: path.display().to_string(),
            message,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| unwritable(e.to_string()))?;
        }
        let file = File::create(&path).map_err(|e| unwritable(e.to_string()))?;
        ZipWriter::new(file)
            .finish()
            .map_err(|e| unwritable(e.to_string()))?;

        let compression = if compress {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };

        Ok(Self {
            path,
            compression,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_for_append(&self) -> zip::result::ZipResult<ZipWriter<File>> {
        let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        ZipWriter::new_append(file)
    }

    fn contains(&self, name: &str) -> zip::result::ZipResult<bool> {
        let archive = ZipArchive::new(BufReader::new(File::open(&self.path)?))?;
        let found = archive.file_names().any(|existing| existing == name);
        Ok(found)
    }
}

#[async_trait]
impl ArchiveWriterPort for ZipArchiveWriter {
    async fn append_file(&self, local_path: &Path, internal_path: &str) -> Result<(), DomainError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| append_failed(internal_path, "writer lock poisoned"))?;

        let mut source = File::open(local_path).map_err(|e| append_failed(internal_path, e))?;
        let size = source
            .metadata()
            .map_err(|e| append_failed(internal_path, e))?
            .len();
        let options = SimpleFileOptions::default()
            .compression_method(self.compression)
            .large_file(size >= u32::MAX as u64);

        let mut writer = self
            .open_for_append()
            .map_err(|e| append_failed(internal_path, e))?;
        writer
            .start_file(internal_path, options)
            .map_err(|e| append_failed(internal_path, e))?;

        if let Err(e) = io::copy(&mut source, &mut writer) {
            // Drop the half-written entry so the finished archive stays consistent
            let _ = writer.abort_file();
            let _ = writer.finish();
            return Err(append_failed(internal_path, e));
        }

        let file = writer
            .finish()
            .map_err(|e| append_failed(internal_path, e))?;
        file.sync_all().map_err(|e| append_failed(internal_path, e))?;
        debug!("Appended {} ({} bytes)", internal_path, size);
        Ok(())
    }

    async fn add_directory_marker(&self, internal_path: &str) -> Result<MarkerOutcome, DomainError> {
        let name = directory_marker_name(internal_path);
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| append_failed(&name, "writer lock poisoned"))?;

        if self.contains(&name).map_err(|e| append_failed(&name, e))? {
            return Ok(MarkerOutcome::AlreadyPresent);
        }

        let mut writer = self.open_for_append().map_err(|e| append_failed(&name, e))?;
        writer
            .add_directory(name.as_str(), SimpleFileOptions::default())
            .map_err(|e| append_failed(&name, e))?;
        let file = writer.finish().map_err(|e| append_failed(&name, e))?;
        file.sync_all().map_err(|e| append_failed(&name, e))?;
        Ok(MarkerOutcome::Added)
    }

    fn archive_size(&self) -> u64 {
        file_size(&self.path)
    }
}
