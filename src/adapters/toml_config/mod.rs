// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::{TranscodeSettings, VideoFilter};
use crate::domain::rules::scale_filter;
use crate::error::{ZipScaleError, ZipScaleResult};
use crate::utils::logging::LoggingConfig;

/// Files tried, in order, when no `--config` is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["zipscale.toml", "config/zipscale.toml"];

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub transcode: TranscodeSection,
    pub filter: FilterSection,
    pub paths: PathsSection,
    pub output: OutputSection,
    pub logging: LoggingConfig,
}

/// `[transcode]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeSection {
    pub target_height: u32,
    pub crf: u8,
    pub preset: String,
    pub video_codec: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Per-video limit in seconds; 0 disables it
    pub timeout_secs: u64,
}

/// `[filter]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub extensions: Vec<String>,
    pub shadow_prefix: String,
}

/// `[paths]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Parent of the per-run scratch directory; system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

/// `[output]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Inserted before the extension; `_<height>p` when unset
    pub suffix: Option<String>,
    /// Deflate appended videos instead of storing them
    pub compress: bool,
}

impl Default for TranscodeSection {
    fn default() -> Self {
        let settings = TranscodeSettings::default();
        Self {
            target_height: settings.target_height,
            crf: settings.crf,
            preset: settings.preset,
            video_codec: settings.video_codec,
            audio_codec: settings.audio_codec,
            audio_bitrate: settings.audio_bitrate,
            timeout_secs: settings.timeout.map(|t| t.as_secs()).unwrap_or(0),
        }
    }
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            extensions: ["mp4", "mov", "m4v", "mkv", "avi"]
                .into_iter()
                .map(String::from)
                .collect(),
            shadow_prefix: "._".to_string(),
        }
    }
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl AppConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> ZipScaleResult<Self> {
        toml::from_str(content).map_err(|e| ZipScaleError::ConfigError {
            message: format!("Failed to parse TOML config: {}", e),
        })
    }

    pub fn transcode_settings(&self) -> TranscodeSettings {
        let t = &self.transcode;
        TranscodeSettings {
            target_height: t.target_height,
            crf: t.crf,
            preset: t.preset.clone(),
            video_codec: t.video_codec.clone(),
            audio_codec: t.audio_codec.clone(),
            audio_bitrate: t.audio_bitrate.clone(),
            timeout: (t.timeout_secs > 0).then(|| Duration::from_secs(t.timeout_secs)),
        }
    }

    pub fn video_filter(&self) -> VideoFilter {
        VideoFilter::new(&self.filter.extensions, self.filter.shadow_prefix.clone())
    }

    /// Effective output suffix
    pub fn suffix(&self) -> String {
        self.output
            .suffix
            .clone()
            .unwrap_or_else(|| self.transcode_settings().default_suffix())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> ZipScaleResult<()> {
        let invalid = |message: String| Err(ZipScaleError::ConfigError { message });

        scale_filter(self.transcode.target_height).map_err(|e| ZipScaleError::ConfigError {
            message: e.to_string(),
        })?;
        if self.transcode.crf > 51 {
            return invalid(format!("crf must be between 0 and 51, got {}", self.transcode.crf));
        }
        if self.transcode.preset.trim().is_empty() {
            return invalid("preset must not be empty".to_string());
        }
        if self.transcode.audio_bitrate.trim().is_empty() {
            return invalid("audio_bitrate must not be empty".to_string());
        }
        if self.video_filter().extensions().is_empty() {
            return invalid("at least one video extension is required".to_string());
        }
        if self.filter.shadow_prefix.is_empty() {
            return invalid("shadow_prefix must not be empty".to_string());
        }
        if self.suffix().is_empty() {
            return invalid("output suffix must not be empty".to_string());
        }
        if self.suffix().contains('/') {
            return invalid(format!("output suffix {:?} must not contain '/'", self.suffix()));
        }
        Ok(())
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Resolve which file to load: the explicit path, else the first default that exists
    pub fn locate(explicit: Option<&Path>, base_dir: &Path) -> ZipScaleResult<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ZipScaleError::ConfigError {
                    message: format!("Config file does not exist: {}", path.display()),
                });
            }
            return Ok(Some(path.to_path_buf()));
        }

        let found = DEFAULT_CONFIG_PATHS
            .iter()
            .map(|candidate| base_dir.join(candidate))
            .find(|candidate| candidate.is_file());
        if found.is_none() {
            debug!("No config file found in {}", base_dir.display());
        }
        Ok(found)
    }

    /// Load and parse one config file
    pub fn load(path: &Path) -> ZipScaleResult<AppConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| ZipScaleError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config = AppConfig::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.suffix(), "_720p");
        assert_eq!(
            config.transcode_settings().timeout,
            Some(Duration::from_secs(7200))
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [transcode]
            target_height = 480
            timeout_secs = 0

            [filter]
            extensions = ["MP4", ".webm"]

            [output]
            compress = true
            "#,
        )
        .unwrap();

        assert_eq!(config.transcode.target_height, 480);
        assert_eq!(config.transcode.crf, 23);
        assert_eq!(config.suffix(), "_480p");
        assert!(config.transcode_settings().timeout.is_none());
        assert_eq!(config.video_filter().extensions(), ["mp4", "webm"]);
        assert!(config.output.compress);
        assert_eq!(config.paths.ffmpeg, PathBuf::from("ffmpeg"));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        match AppConfig::from_toml_str("[transcode\ncrf = ") {
            Err(ZipScaleError::ConfigError { .. }) => {}
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.transcode.target_height = 721;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.transcode.crf = 52;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.filter.extensions = vec![".".to_string()];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.output.suffix = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_locate_prefers_explicit_then_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(TomlConfigAdapter::locate(None, dir.path()).unwrap(), None);

        std::fs::create_dir(dir.path().join("config")).unwrap();
        let nested = dir.path().join("config/zipscale.toml");
        std::fs::write(&nested, "").unwrap();
        assert_eq!(
            TomlConfigAdapter::locate(None, dir.path()).unwrap(),
            Some(nested.clone())
        );

        let top = dir.path().join("zipscale.toml");
        std::fs::write(&top, "").unwrap();
        assert_eq!(TomlConfigAdapter::locate(None, dir.path()).unwrap(), Some(top));

        assert_eq!(
            TomlConfigAdapter::locate(Some(&nested), dir.path()).unwrap(),
            Some(nested)
        );
        assert!(TomlConfigAdapter::locate(Some(&dir.path().join("missing.toml")), dir.path()).is_err());
    }

    #[test]
    fn test_load_reads_logging_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zipscale.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\nformat = \"json\"\n").unwrap();

        let config = TomlConfigAdapter::load(&path).unwrap();
        assert_eq!(config.logging.level, crate::utils::logging::LogLevel::Debug);
        assert_eq!(config.logging.format, crate::utils::logging::LogFormat::Json);
    }
}
