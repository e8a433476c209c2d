#![cfg(unix)]

mod common;

use std::path::Path;

use tempfile::TempDir;
use zipscale_cli::adapters::AppConfig;
use zipscale_cli::app::container::DefaultAppContainer;
use zipscale_cli::app::convert_interactor::write_report;
use zipscale_cli::domain::model::{ItemState, RunReport};

use common::*;

fn config_for(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.paths.ffmpeg = fake_ffmpeg(dir);
    config.paths.ffprobe = dir.join("no-ffprobe");
    config.paths.scratch_dir = Some(dir.join("scratch"));
    config
}

async fn convert(config: AppConfig, input: &Path, output: &Path) -> RunReport {
    let container = DefaultAppContainer::new(config);
    let interactor = container.convert_interactor(input, output).await.unwrap();
    interactor.execute().await.unwrap()
}

fn scratch_files(dir: &Path) -> usize {
    walkdir::WalkDir::new(dir.join("scratch"))
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count()
}

#[tokio::test]
async fn test_reference_archive_is_converted() {
    let _lock = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.zip");
    let output = dir.path().join("out/converted.zip");
    reference_archive(&input);

    let report = convert(config_for(dir.path()), &input, &output).await;

    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(report.summary.failed, 0);
    assert_eq!(report.summary.directories.added, 1);

    let names: Vec<String> = entry_names(&output).into_iter().collect();
    assert_eq!(names, vec!["a_720p.mp4", "b/", "b/c_720p.MOV"]);
    assert_eq!(read_entry(&output, "a_720p.mp4"), b"converted");
    assert_eq!(read_entry(&output, "b/c_720p.MOV"), b"converted");
    assert_eq!(scratch_files(dir.path()), 0);
}

#[tokio::test]
async fn test_silent_transcoder_failure_is_counted() {
    let _lock = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.zip");
    let output = dir.path().join("out.zip");
    build_archive(
        &input,
        &[
            Fixture::File("broken.mp4", b"unplayable"),
            Fixture::File("fine.mov", b"playable"),
        ],
    );

    let report = convert(config_for(dir.path()), &input, &output).await;

    assert_eq!(report.summary.succeeded + report.summary.failed, 2);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.items[0].state, ItemState::Failed);
    assert_eq!(report.items[0].failure_kind.as_deref(), Some("transform_failed"));
    assert!(report.items[1].succeeded());

    let names = entry_names(&output);
    assert!(names.contains("fine_720p.mov"));
    assert!(!names.contains("broken_720p.mp4"));
    assert!(!names.contains("fine.mov"));
    assert_eq!(scratch_files(dir.path()), 0);
}

#[tokio::test]
async fn test_destination_is_overwritten() {
    let _lock = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.zip");
    let output = dir.path().join("out.zip");
    reference_archive(&input);
    build_archive(&output, &[Fixture::File("stale.mp4", b"old run")]);

    convert(config_for(dir.path()), &input, &output).await;

    let names = entry_names(&output);
    assert!(!names.contains("stale.mp4"));
    assert_eq!(names.len(), 3);
}

#[tokio::test]
async fn test_archive_without_videos_keeps_directories() {
    let _lock = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.zip");
    let output = dir.path().join("out.zip");
    build_archive(
        &input,
        &[
            Fixture::Dir("docs/"),
            Fixture::File("docs/readme.txt", b"text"),
            Fixture::File("docs/._clip.mp4", b"fork"),
        ],
    );

    let report = convert(config_for(dir.path()), &input, &output).await;

    assert_eq!(report.summary.total, 0);
    let names: Vec<String> = entry_names(&output).into_iter().collect();
    assert_eq!(names, vec!["docs/"]);
}

#[tokio::test]
async fn test_report_round_trips_through_json() {
    let _lock = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.zip");
    let output = dir.path().join("out.zip");
    reference_archive(&input);

    let report = convert(config_for(dir.path()), &input, &output).await;
    let report_path = dir.path().join("report.json");
    write_report(&report, &report_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["summary"]["succeeded"], 2);
    assert_eq!(json["items"][1]["output_path"], "b/c_720p.MOV");
    assert_eq!(json["items"][1]["state"], "appended");
}
