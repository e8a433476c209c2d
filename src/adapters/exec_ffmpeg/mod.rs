//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` binary as a child process to produce the downscaled,
//! streaming-ready copy of one extracted video.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::scale_filter;
use crate::error::{ZipScaleError, ZipScaleResult};
use crate::ports::*;

/// Lines of ffmpeg stderr kept in a failure diagnostic
const DIAGNOSTIC_LINES: usize = 8;

/// FFmpeg-based transform adapter
pub struct FFmpegTransformAdapter {
    binary: PathBuf,
    settings: TranscodeSettings,
}

impl FFmpegTransformAdapter {
    /// Create new FFmpeg adapter; rejects settings ffmpeg could not honor
    pub fn new(binary: impl Into<PathBuf>, settings: TranscodeSettings) -> Result<Self, DomainError> {
        scale_filter(settings.target_height)?;
        if settings.crf > 51 {
            return Err(DomainError::BadArgs(format!(
                "CRF must be between 0 and 51, got {}",
                settings.crf
            )));
        }
        Ok(Self {
            binary: binary.into(),
            settings,
        })
    }

    pub fn settings(&self) -> &TranscodeSettings {
        &self.settings
    }

    /// Full argument list for one invocation
    pub fn build_args(&self, request: &TransformRequest) -> Result<Vec<OsString>, DomainError> {
        let s = &self.settings;
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(request.input.clone().into_os_string());

        let encode = [
            "-vf".to_string(),
            scale_filter(s.target_height)?,
            "-c:v".to_string(),
            s.video_codec.clone(),
            "-crf".to_string(),
            s.crf.to_string(),
            "-preset".to_string(),
            s.preset.clone(),
            "-c:a".to_string(),
            s.audio_codec.clone(),
            "-b:a".to_string(),
            s.audio_bitrate.clone(),
            // Index ahead of payload so playback can start before the download finishes
            "-movflags".to_string(),
            "+faststart".to_string(),
        ];
        args.extend(encode.into_iter().map(OsString::from));
        args.push(request.output.clone().into_os_string());
        Ok(args)
    }

    fn failed(request: &TransformRequest, diagnostic: impl Into<String>) -> DomainError {
        DomainError::TransformFailed {
            input: request.input.display().to_string(),
            diagnostic: diagnostic.into(),
        }
    }
}

/// Last few non-empty lines of a process's stderr
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(DIAGNOSTIC_LINES);
    lines[start..].join(" | ")
}

#[async_trait]
impl TransformPort for FFmpegTransformAdapter {
    async fn check_available(&self) -> ZipScaleResult<()> {
        let unavailable = |message: String| ZipScaleError::ToolUnavailable {
            tool: self.binary.display().to_string(),
            message,
        };

        let status = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !status.success() {
            return Err(unavailable(format!("`-version` exited with {}", status)));
        }
        info!("Using transcoder {}", self.binary.display());
        Ok(())
    }

    async fn transform(&self, request: &TransformRequest) -> Result<PathBuf, DomainError> {
        let args = self.build_args(request)?;
        debug!("Running {} {:?}", self.binary.display(), args);

        let child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Self::failed(request, format!("could not start transcoder: {}", e)))?;

        // Dropping the wait future on timeout drops the child, which kills it
        let waited = match self.settings.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(Self::failed(
                        request,
                        format!("timed out after {}s, transcoder killed", limit.as_secs()),
                    ))
                }
            },
            None => child.wait_with_output().await,
        };
        let output = waited.map_err(|e| Self::failed(request, e.to_string()))?;

        if !output.status.success() {
            return Err(Self::failed(
                request,
                format!("exited with {}: {}", output.status, stderr_tail(&output.stderr)),
            ));
        }

        // A zero exit status alone does not prove an output was written
        match tokio::fs::metadata(&request.output).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(request.output.clone()),
            Ok(_) => Err(Self::failed(
                request,
                format!("output {} is empty", request.output.display()),
            )),
            Err(_) => Err(Self::failed(
                request,
                format!(
                    "transcoder reported success but {} does not exist",
                    request.output.display()
                ),
            )),
        }
    }
}
