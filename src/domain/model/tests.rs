// Unit tests for domain models

use super::*;

fn listing() -> Vec<ArchiveEntry> {
    vec![
        ArchiveEntry::file("a.mp4"),
        ArchiveEntry::file("b/._shadow.mp4"),
        ArchiveEntry::file("b/c.MOV"),
        ArchiveEntry::directory("b/"),
        ArchiveEntry::file("readme.txt"),
    ]
}

#[test]
fn test_filter_selects_videos_in_listing_order() {
    let filter = VideoFilter::default();
    let videos = filter.select(&listing());
    let paths: Vec<&str> = videos.iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["a.mp4", "b/c.MOV"]);
}

#[test]
fn test_filter_classification() {
    let filter = VideoFilter::default();
    assert_eq!(filter.classify(&ArchiveEntry::file("IMG_0001.MOV")), EntryKind::Video);
    assert_eq!(filter.classify(&ArchiveEntry::file("clip.mp4")), EntryKind::Video);
    assert_eq!(filter.classify(&ArchiveEntry::file("clip.MP4")), EntryKind::Video);
    assert_eq!(
        filter.classify(&ArchiveEntry::file("folder/._IMG_0001.MOV")),
        EntryKind::Shadow
    );
    assert_eq!(filter.classify(&ArchiveEntry::file("movies.mp4/")), EntryKind::Directory);
    assert_eq!(filter.classify(&ArchiveEntry::directory("b/")), EntryKind::Directory);
    assert_eq!(filter.classify(&ArchiveEntry::file("notes.txt")), EntryKind::Other);
}

#[test]
fn test_filter_normalizes_configured_extensions() {
    let filter = VideoFilter::new([".MP4", "Mov", ""], "._");
    assert_eq!(filter.extensions(), &["mp4".to_string(), "mov".to_string()]);
}

#[test]
fn test_video_entry_output_path() {
    let entry = VideoEntry { path: "b/c.MOV".to_string() };
    assert_eq!(entry.output_path("_720p"), "b/c_720p.MOV");
}

#[test]
fn test_work_item_success_path() {
    let entry = VideoEntry { path: "a.mp4".to_string() };
    let mut item = WorkItem::new(&entry, "_720p");
    assert_eq!(item.state(), ItemState::Pending);
    assert_eq!(item.output_internal_path, "a_720p.mp4");

    item.mark_extracted(PathBuf::from("/scratch/a.mp4"));
    assert_eq!(item.state(), ItemState::Extracted);
    item.mark_converted(PathBuf::from("/scratch/out/a_720p.mp4"));
    assert_eq!(item.state(), ItemState::Converted);
    item.mark_appended();
    assert_eq!(item.state(), ItemState::Appended);
    assert!(item.failure().is_none());
}

#[test]
fn test_work_item_first_failure_wins() {
    let entry = VideoEntry { path: "a.mp4".to_string() };
    let mut item = WorkItem::new(&entry, "_720p");
    item.mark_extracted(PathBuf::from("/scratch/a.mp4"));
    item.fail(DomainError::TransformFailed {
        input: "a.mp4".to_string(),
        diagnostic: "exit status 1".to_string(),
    });
    item.fail(DomainError::AppendFailed {
        path: "a_720p.mp4".to_string(),
        reason: "late".to_string(),
    });
    assert_eq!(item.state(), ItemState::Failed);
    assert_eq!(item.failure().map(|e| e.kind()), Some("transform_failed"));
}

#[test]
fn test_appended_item_cannot_fail() {
    let entry = VideoEntry { path: "a.mp4".to_string() };
    let mut item = WorkItem::new(&entry, "_720p");
    item.mark_extracted(PathBuf::from("x"));
    item.mark_converted(PathBuf::from("y"));
    item.mark_appended();
    item.fail(DomainError::BadArgs("ignored".to_string()));
    assert_eq!(item.state(), ItemState::Appended);
}

#[test]
fn test_progress_counters_match_completed_items() {
    let mut progress = ProgressState::new(3);
    assert_eq!(progress.begin_item(), 1);
    progress.record(true);
    assert_eq!(progress.begin_item(), 2);
    progress.record(false);
    assert_eq!(progress.begin_item(), 3);
    progress.record(true);

    let snapshot = progress.snapshot();
    assert_eq!(snapshot.succeeded + snapshot.failed, snapshot.current);
    assert_eq!(snapshot.succeeded, 2);
    assert_eq!(snapshot.failed, 1);
    assert_eq!(snapshot.percent(), 100);
    assert_eq!(snapshot.eta(), Some(Duration::ZERO));
}

#[test]
fn test_snapshot_eta_unknown_before_any_completion() {
    let mut progress = ProgressState::new(2);
    progress.begin_item();
    let snapshot = progress.snapshot();
    assert_eq!(snapshot.percent(), 50);
    assert_eq!(snapshot.eta(), None);
}

#[test]
fn test_item_record_size_reduction() {
    let record = ItemRecord {
        index: 1,
        source_path: "a.mp4".to_string(),
        output_path: "a_720p.mp4".to_string(),
        state: ItemState::Appended,
        failure_kind: None,
        failure_reason: None,
        original_size: Some(1000),
        converted_size: Some(250),
        original_resolution: Some(Resolution { width: 1920, height: 1080 }),
        converted_resolution: Some(Resolution { width: 1280, height: 720 }),
        duration_ms: 10,
    };
    assert!(record.succeeded());
    assert_eq!(record.size_reduction(), Some(75.0));

    let empty = ItemRecord { original_size: Some(0), ..record };
    assert_eq!(empty.size_reduction(), None);
}

#[test]
fn test_resolution_display() {
    assert_eq!(Resolution { width: 1280, height: 720 }.to_string(), "1280x720");
}

#[test]
fn test_default_suffix_follows_target_height() {
    let settings = TranscodeSettings { target_height: 480, ..TranscodeSettings::default() };
    assert_eq!(settings.default_suffix(), "_480p");
}
