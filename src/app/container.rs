use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::{
    AppConfig, DisabledProbeAdapter, FFmpegTransformAdapter, FFprobeAdapter, ScratchSpace,
    TracingReporter, ZipArchiveReader, ZipArchiveWriter,
};
use crate::app::{ConvertInteractor, ConvertOptions, InspectInteractor};
use crate::error::{ZipScaleError, ZipScaleResult};
use crate::ports::{
    ArchiveReaderPort, ArchiveWriterPort, ProbePort, ReportPort, TransformPort,
};

/// Wires adapters into interactors from a resolved configuration
pub struct DefaultAppContainer {
    config: AppConfig,
}

impl DefaultAppContainer {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run every setup check, then create the destination. Nothing is written
    /// unless the source opens, the transcoder runs and scratch space exists.
    pub async fn convert_interactor(
        &self,
        input: &Path,
        output: &Path,
    ) -> ZipScaleResult<ConvertInteractor> {
        if same_file(input, output) {
            return Err(ZipScaleError::SameArchive {
                path: output.display().to_string(),
            });
        }

        let reader = Arc::new(ZipArchiveReader::open(input)?);

        let transform = FFmpegTransformAdapter::new(
            self.config.paths.ffmpeg.clone(),
            self.config.transcode_settings(),
        )
        .map_err(|e| ZipScaleError::ConfigError {
            message: e.to_string(),
        })?;
        transform.check_available().await?;
        let settings = transform.settings();
        info!(
            "Target {}p, crf {}, preset {}, audio {} {}",
            settings.target_height,
            settings.crf,
            settings.preset,
            settings.audio_codec,
            settings.audio_bitrate
        );

        let probe = self.probe_port().await;
        let scratch = ScratchSpace::create(self.config.paths.scratch_dir.as_deref())?;
        let writer = Arc::new(ZipArchiveWriter::create(output, self.config.output.compress)?);

        let options = ConvertOptions {
            source_label: input.display().to_string(),
            destination_label: output.display().to_string(),
            filter: self.config.video_filter(),
            suffix: self.config.suffix(),
        };

        Ok(ConvertInteractor::new(
            reader as Arc<dyn ArchiveReaderPort>,
            writer as Arc<dyn ArchiveWriterPort>,
            Arc::new(transform) as Arc<dyn TransformPort>,
            probe,
            Arc::new(TracingReporter::new()) as Arc<dyn ReportPort>,
            scratch,
            options,
        ))
    }

    pub fn inspect_interactor(&self, input: &Path) -> ZipScaleResult<InspectInteractor> {
        let reader = Arc::new(ZipArchiveReader::open(input)?);
        Ok(InspectInteractor::new(
            reader as Arc<dyn ArchiveReaderPort>,
            self.config.video_filter(),
            self.config.suffix(),
        ))
    }

    /// ffprobe is optional; without it resolutions are reported as unknown
    async fn probe_port(&self) -> Arc<dyn ProbePort> {
        let ffprobe = FFprobeAdapter::new(self.config.paths.ffprobe.clone());
        if ffprobe.is_available().await {
            Arc::new(ffprobe)
        } else {
            warn!(
                "{} is not available; resolutions will be reported as unknown",
                self.config.paths.ffprobe.display()
            );
            Arc::new(DisabledProbeAdapter)
        }
    }
}

/// Absolute form of `path`, resolving symlinks of whatever part already exists
fn resolved(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolved(parent).join(name)
        }
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// True when both paths name the same file
pub fn same_file(a: &Path, b: &Path) -> bool {
    resolved(a) == resolved(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_same_file_sees_through_relative_segments() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.zip");
        std::fs::write(&input, b"zip").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        assert!(same_file(&input, &dir.path().join("sub/../in.zip")));
        assert!(!same_file(&input, &dir.path().join("out.zip")));
        assert!(!same_file(&input, &dir.path().join("missing/in.zip")));
    }

    #[tokio::test]
    async fn test_same_input_and_output_is_rejected() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.zip");
        std::fs::write(&input, b"zip").unwrap();

        let container = DefaultAppContainer::new(AppConfig::default());
        match container.convert_interactor(&input, &input).await {
            Err(ZipScaleError::SameArchive { .. }) => {}
            Err(other) => panic!("expected SameArchive, got {:?}", other),
            Ok(_) => panic!("expected SameArchive"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_source_fails_before_destination_exists() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.zip");
        std::fs::write(&input, b"not a zip").unwrap();
        let output = dir.path().join("out.zip");

        let container = DefaultAppContainer::new(AppConfig::default());
        match container.convert_interactor(&input, &output).await {
            Err(ZipScaleError::ArchiveUnreadable { .. }) => {}
            Err(other) => panic!("expected ArchiveUnreadable, got {:?}", other),
            Ok(_) => panic!("expected ArchiveUnreadable"),
        }
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_transcoder_fails_before_destination_exists() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.zip");
        zip::ZipWriter::new(std::fs::File::create(&input).unwrap())
            .finish()
            .unwrap();
        let output = dir.path().join("out.zip");

        let mut config = AppConfig::default();
        config.paths.ffmpeg = dir.path().join("no-such-ffmpeg");
        let container = DefaultAppContainer::new(config);
        match container.convert_interactor(&input, &output).await {
            Err(ZipScaleError::ToolUnavailable { .. }) => {}
            Err(other) => panic!("expected ToolUnavailable, got {:?}", other),
            Ok(_) => panic!("expected ToolUnavailable"),
        }
        assert!(!output.exists());
    }
}
