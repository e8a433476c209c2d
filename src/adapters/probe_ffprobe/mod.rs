//! FFprobe adapter for media file probing
//!
//! Reads the dimensions of the first video stream so per-item status lines can show
//! the resolution before and after conversion.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    binary: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    /// True when `ffprobe -version` runs successfully
    pub async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

/// Pull the first stream's dimensions out of `ffprobe -of json` output
pub fn parse_resolution(json: &[u8]) -> Result<Resolution, DomainError> {
    let parsed: ProbeOutput = serde_json::from_slice(json)
        .map_err(|e| DomainError::ProbeFailed(format!("unreadable ffprobe output: {}", e)))?;

    parsed
        .streams
        .into_iter()
        .find_map(|stream| match (stream.width, stream.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => {
                Some(Resolution { width, height })
            }
            _ => None,
        })
        .ok_or_else(|| DomainError::ProbeFailed("no video stream found".to_string()))
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_resolution(&self, file_path: &Path) -> Result<Resolution, DomainError> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-of",
                "json",
            ])
            .arg(file_path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::ProbeFailed(format!("could not run ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(DomainError::ProbeFailed(format!(
                "ffprobe exited with {} for {}",
                output.status,
                file_path.display()
            )));
        }
        parse_resolution(&output.stdout)
    }
}

/// Probe used when ffprobe is not installed; every lookup reports "unknown"
pub struct DisabledProbeAdapter;

#[async_trait]
impl ProbePort for DisabledProbeAdapter {
    async fn probe_resolution(&self, _file_path: &Path) -> Result<Resolution, DomainError> {
        Err(DomainError::ProbeFailed("probing disabled".to_string()))
    }
}
