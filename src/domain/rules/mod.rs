// Business rules - Pure functions the pipeline is built on

use std::time::Duration;

use crate::domain::errors::DomainError;

/// True when any slash-separated segment of an internal path starts with the shadow prefix
pub fn is_shadow_path(path: &str, shadow_prefix: &str) -> bool {
    if shadow_prefix.is_empty() {
        return false;
    }
    path.split('/')
        .any(|segment| segment.starts_with(shadow_prefix))
}

/// Lowercased extension of the last path segment, if it has one
pub fn extension_of(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let dot = name.rfind('.')?;
    if dot == 0 || dot + 1 == name.len() {
        return None;
    }
    Some(name[dot + 1..].to_ascii_lowercase())
}

/// Case-insensitive extension match against an already-lowercased list
pub fn has_video_extension(path: &str, extensions: &[String]) -> bool {
    match extension_of(path) {
        Some(ext) => extensions.iter().any(|known| known == &ext),
        None => false,
    }
}

/// Insert `suffix` before the extension of the final segment, keeping directory and extension.
///
/// `b/c.MOV` with `_720p` becomes `b/c_720p.MOV`. Names without an extension get the suffix
/// appended; a leading dot (`.hidden`) is not treated as an extension separator.
pub fn derive_output_path(path: &str, suffix: &str) -> String {
    let (dir, name) = match path.rfind('/') {
        Some(slash) => (&path[..=slash], &path[slash + 1..]),
        None => ("", path),
    };

    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}{}{}", dir, &name[..dot], suffix, &name[dot..]),
        _ => format!("{}{}{}", dir, name, suffix),
    }
}

/// ffmpeg scale filter for a fixed height; `-2` keeps the width even and the aspect ratio intact
pub fn scale_filter(target_height: u32) -> Result<String, DomainError> {
    if target_height == 0 || target_height % 2 != 0 {
        return Err(DomainError::BadArgs(format!(
            "Target height must be a positive even number, got {}",
            target_height
        )));
    }
    Ok(format!("scale=-2:{}", target_height))
}

/// `floor(current * 100 / total)`, 0 for an empty run
pub fn progress_percent(current: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((current as u64 * 100) / total as u64) as u32
}

/// Average duration of completed items times the items still to go
pub fn estimate_remaining(elapsed: Duration, completed: usize, total: usize) -> Option<Duration> {
    if completed == 0 || completed > total {
        return None;
    }
    let remaining = (total - completed) as u32;
    Some(elapsed / completed as u32 * remaining)
}

/// Render an ETA as `Hh Mm`
pub fn format_eta(eta: Duration) -> String {
    let total_minutes = eta.as_secs() / 60;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Percentage saved going from `original` to `converted` bytes; `None` when the original is empty
pub fn size_reduction_percent(original: u64, converted: u64) -> Option<f64> {
    if original == 0 {
        return None;
    }
    Some((1.0 - converted as f64 / original as f64) * 100.0)
}

/// Normalize a directory entry name to carry exactly one trailing slash
pub fn directory_marker_name(path: &str) -> String {
    format!("{}/", path.trim_end_matches('/'))
}
