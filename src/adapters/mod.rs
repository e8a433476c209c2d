// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod fs_scratch;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;
pub mod zip_archive;

// Re-export adapters
pub use exec_ffmpeg::FFmpegTransformAdapter;
pub use fs_scratch::{ScratchLease, ScratchSpace};
pub use probe_ffprobe::{DisabledProbeAdapter, FFprobeAdapter};
pub use toml_config::{AppConfig, TomlConfigAdapter};
pub use tracing_log::TracingReporter;
pub use zip_archive::{ZipArchiveReader, ZipArchiveWriter};
