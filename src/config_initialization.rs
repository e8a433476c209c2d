//! Configuration initialization and hierarchy management

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter};
use crate::error::{ZipScaleError, ZipScaleResult};

/// Prefix shared by every recognized environment variable
pub const ENV_PREFIX: &str = "ZIPSCALE_";

/// Values given on the command line; `None` leaves the lower layers in charge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub target_height: Option<u32>,
    pub crf: Option<u8>,
    pub preset: Option<String>,
    pub audio_bitrate: Option<String>,
    pub scratch_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub suffix: Option<String>,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
}

/// Snapshot of the `ZIPSCALE_*` variables in the process environment
pub fn environment_snapshot() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(ENV_PREFIX))
        .collect()
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(
    overrides: &ConfigOverrides,
    env: &HashMap<String, String>,
    base_dir: &Path,
) -> ZipScaleResult<AppConfig> {
    info!("Initializing configuration hierarchy");

    // Step 1 + 2: defaults, then the config file if there is one
    let mut config = match TomlConfigAdapter::locate(overrides.config_file.as_deref(), base_dir)? {
        Some(path) => TomlConfigAdapter::load(&path)?,
        None => {
            info!("No config file loaded, using defaults");
            AppConfig::default()
        }
    };

    // Step 3: environment variables
    apply_environment(&mut config, env)?;

    // Step 4: CLI arguments
    apply_cli_overrides(&mut config, overrides);

    config.validate()?;
    info!("Configuration hierarchy initialized successfully");
    Ok(config)
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> ZipScaleResult<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| ZipScaleError::ConfigError {
        message: format!("{}{}={:?} is invalid: {}", ENV_PREFIX, key, value, e),
    })
}

/// Apply `ZIPSCALE_*` overrides onto `config`
pub fn apply_environment(config: &mut AppConfig, env: &HashMap<String, String>) -> ZipScaleResult<()> {
    let mut env_overrides = 0;
    for (name, value) in env {
        let Some(key) = name.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        match key {
            "TARGET_HEIGHT" => config.transcode.target_height = parse_env(key, value)?,
            "CRF" => config.transcode.crf = parse_env(key, value)?,
            "PRESET" => config.transcode.preset = value.clone(),
            "AUDIO_BITRATE" => config.transcode.audio_bitrate = value.clone(),
            "TIMEOUT_SECS" => config.transcode.timeout_secs = parse_env(key, value)?,
            "SCRATCH_DIR" => config.paths.scratch_dir = Some(PathBuf::from(value)),
            "FFMPEG" => config.paths.ffmpeg = PathBuf::from(value),
            "FFPROBE" => config.paths.ffprobe = PathBuf::from(value),
            "SUFFIX" => config.output.suffix = Some(value.clone()),
            // Logging variables are read by clap directly
            _ => continue,
        }
        info!("Found environment override: {} = {}", name, value);
        env_overrides += 1;
    }

    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }
    Ok(())
}

/// Apply command-line overrides onto `config`
pub fn apply_cli_overrides(config: &mut AppConfig, overrides: &ConfigOverrides) {
    let mut cli_overrides = 0;

    if let Some(height) = overrides.target_height {
        config.transcode.target_height = height;
        cli_overrides += 1;
    }
    if let Some(crf) = overrides.crf {
        config.transcode.crf = crf;
        cli_overrides += 1;
    }
    if let Some(preset) = &overrides.preset {
        config.transcode.preset = preset.clone();
        cli_overrides += 1;
    }
    if let Some(bitrate) = &overrides.audio_bitrate {
        config.transcode.audio_bitrate = bitrate.clone();
        cli_overrides += 1;
    }
    if let Some(timeout) = overrides.timeout_secs {
        config.transcode.timeout_secs = timeout;
        cli_overrides += 1;
    }
    if let Some(dir) = &overrides.scratch_dir {
        config.paths.scratch_dir = Some(dir.clone());
        cli_overrides += 1;
    }
    if let Some(suffix) = &overrides.suffix {
        config.output.suffix = Some(suffix.clone());
        cli_overrides += 1;
    }
    if let Some(ffmpeg) = &overrides.ffmpeg {
        config.paths.ffmpeg = ffmpeg.clone();
        cli_overrides += 1;
    }
    if let Some(ffprobe) = &overrides.ffprobe {
        config.paths.ffprobe = ffprobe.clone();
        cli_overrides += 1;
    }

    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_file_env_or_cli() {
        let dir = TempDir::new().unwrap();
        let config =
            initialize_configuration_hierarchy(&ConfigOverrides::default(), &HashMap::new(), dir.path())
                .unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("zipscale.toml"),
            "[transcode]\ntarget_height = 480\ncrf = 30\npreset = \"slow\"\n",
        )
        .unwrap();

        let env = env(&[("ZIPSCALE_CRF", "28"), ("ZIPSCALE_PRESET", "fast")]);
        let overrides = ConfigOverrides {
            preset: Some("veryfast".to_string()),
            ..ConfigOverrides::default()
        };

        let config = initialize_configuration_hierarchy(&overrides, &env, dir.path()).unwrap();
        assert_eq!(config.transcode.target_height, 480);
        assert_eq!(config.transcode.crf, 28);
        assert_eq!(config.transcode.preset, "veryfast");
        assert_eq!(config.suffix(), "_480p");
    }

    #[test]
    fn test_environment_paths_and_suffix() {
        let mut config = AppConfig::default();
        let env = env(&[
            ("ZIPSCALE_FFMPEG", "/opt/ffmpeg/bin/ffmpeg"),
            ("ZIPSCALE_SCRATCH_DIR", "/mnt/scratch"),
            ("ZIPSCALE_SUFFIX", "_small"),
            ("ZIPSCALE_TIMEOUT_SECS", "0"),
            ("UNRELATED", "x"),
        ]);
        apply_environment(&mut config, &env).unwrap();

        assert_eq!(config.paths.ffmpeg, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.paths.scratch_dir, Some(PathBuf::from("/mnt/scratch")));
        assert_eq!(config.suffix(), "_small");
        assert!(config.transcode_settings().timeout.is_none());
    }

    #[test]
    fn test_unparsable_environment_value_is_rejected() {
        let mut config = AppConfig::default();
        let err = apply_environment(&mut config, &env(&[("ZIPSCALE_CRF", "high")])).unwrap_err();
        assert!(err.to_string().contains("ZIPSCALE_CRF"));
    }

    #[test]
    fn test_invalid_result_fails_validation() {
        let dir = TempDir::new().unwrap();
        let overrides = ConfigOverrides {
            target_height: Some(719),
            ..ConfigOverrides::default()
        };
        assert!(initialize_configuration_hierarchy(&overrides, &HashMap::new(), dir.path()).is_err());
    }
}
