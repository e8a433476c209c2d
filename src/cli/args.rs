//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::config_initialization::ConfigOverrides;

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source zip archive
    #[arg(short, long)]
    pub input: PathBuf,

    /// Destination zip archive (created or overwritten)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Configuration file (default: zipscale.toml or config/zipscale.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Target video height in pixels (must be even)
    #[arg(long)]
    pub height: Option<u32>,

    /// Constant Rate Factor (0-51)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: Option<u8>,

    /// Encoding preset
    #[arg(long)]
    pub preset: Option<String>,

    /// Audio bitrate, e.g. 128k
    #[arg(long)]
    pub audio_bitrate: Option<String>,

    /// Parent directory for scratch files
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Per-video transcode timeout in seconds (0 disables)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Suffix inserted before the extension of converted entries
    #[arg(long)]
    pub suffix: Option<String>,

    /// ffmpeg binary
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe binary
    #[arg(long)]
    pub ffprobe: Option<PathBuf>,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl ConvertArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            target_height: self.height,
            crf: self.crf,
            preset: self.preset.clone(),
            audio_bitrate: self.audio_bitrate.clone(),
            scratch_dir: self.scratch_dir.clone(),
            timeout_secs: self.timeout_secs,
            suffix: self.suffix.clone(),
            ffmpeg: self.ffmpeg.clone(),
            ffprobe: self.ffprobe.clone(),
        }
    }
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Source zip archive
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Configuration file (default: zipscale.toml or config/zipscale.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl InspectArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_file: self.config.clone(),
            ..ConfigOverrides::default()
        }
    }
}
