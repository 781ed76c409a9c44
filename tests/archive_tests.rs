// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the batch archiver

use camera_archive::media::read_info_from_file;
use camera_archive::pipelines::archive::ArchiveEncoder;
use camera_archive::{
    ArchiveError, ArchiveOutcome, BatchArchiver, CancelFlag, Config, ExportAsset, ExportItem,
    ImageSink, JpegFileSink, Media, MediaInfo,
};
use image::{DynamicImage, GenericImageView, RgbImage};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

struct Dirs {
    _root: TempDir,
    save: PathBuf,
    temp: PathBuf,
}

fn dirs() -> Dirs {
    let root = tempfile::tempdir().unwrap();
    let save = root.path().join("save");
    let temp = root.path().join("temp");
    std::fs::create_dir_all(&save).unwrap();
    std::fs::create_dir_all(&temp).unwrap();
    Dirs {
        _root: root,
        save,
        temp,
    }
}

fn archiver_for(dirs: &Dirs) -> BatchArchiver {
    let config = Config {
        save_dir: dirs.save.clone(),
        temp_dir: dirs.temp.clone(),
        ..Config::default()
    };
    BatchArchiver::new(&config).unwrap()
}

fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([value, 64, 255 - value])))
}

fn info_for(index: usize) -> MediaInfo {
    let mut info = MediaInfo::new();
    info.insert("index", index);
    info.insert("filter", "noir");
    info
}

fn image_item(index: usize) -> ExportItem {
    let width = 8 + index as u32;
    ExportItem::image(solid(width, 6, 200), solid(width, 6, 20), info_for(index))
}

fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Sink that records nothing on disk and answers with the image width
struct WidthSink {
    delay: fn(u32) -> Duration,
    fail_width: Option<u32>,
    panic_width: Option<u32>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl WidthSink {
    fn new() -> Self {
        Self {
            delay: |_| Duration::ZERO,
            fail_width: None,
            panic_width: None,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

impl ImageSink for WidthSink {
    fn persist(&self, image: &DynamicImage, _info: &MediaInfo) -> Result<PathBuf, ArchiveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let width = image.width();
        std::thread::sleep((self.delay)(width));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_width == Some(width) {
            panic!("sink exploded on width {}", width);
        }
        if self.fail_width == Some(width) {
            return Err(ArchiveError::SaveFailed(format!("width {} is unwritable", width)));
        }
        Ok(PathBuf::from(format!("w{}", width)))
    }
}

#[tokio::test]
async fn test_outcome_count_matches_input() {
    let dirs = dirs();
    let archiver = archiver_for(&dirs);

    for n in [0usize, 1, 3, 7] {
        let items = (0..n)
            .map(|i| if i % 2 == 0 { Some(image_item(i)) } else { None })
            .collect();
        let outcomes = archiver.archive_all(items).await.unwrap();
        assert_eq!(outcomes.len(), n);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_order_preserved_when_later_items_finish_first() {
    // Earlier (narrower) images sleep longer, so completion order is reversed
    let sink = Arc::new(WidthSink {
        delay: |width| Duration::from_millis(u64::from(40 - width.min(40)) * 5),
        ..WidthSink::new()
    });
    let archiver = BatchArchiver::with_sinks(sink.clone(), sink);

    let items: Vec<_> = (0..12).map(|i| Some(image_item(i))).collect();
    let outcomes = archiver.archive_all(items).await.unwrap();

    for (index, outcome) in outcomes.iter().enumerate() {
        let media = outcome.media().expect("archived");
        assert_eq!(media.edited_path(), Path::new(&format!("w{}", 8 + index)));
        assert_eq!(media.info(), &info_for(index));
    }
}

#[tokio::test]
async fn test_empty_slot_yields_empty_without_writing() {
    let dirs = dirs();
    let archiver = archiver_for(&dirs);

    let outcomes = archiver
        .archive_all(vec![None, Some(image_item(1)), None])
        .await
        .unwrap();

    assert_eq!(outcomes[0], ArchiveOutcome::Empty);
    assert!(outcomes[1].is_archived());
    assert_eq!(outcomes[2], ArchiveOutcome::Empty);

    // Only the one real item produced files
    assert_eq!(file_count(&dirs.save), 1);
    assert_eq!(file_count(&dirs.temp), 1);

    let outcomes = archiver.archive_all(vec![None]).await.unwrap();
    assert_eq!(outcomes, vec![ArchiveOutcome::Empty]);
    assert_eq!(file_count(&dirs.save), 1);
}

#[tokio::test]
async fn test_image_written_to_both_directories_with_metadata() {
    let dirs = dirs();
    let archiver = archiver_for(&dirs);

    let outcomes = archiver.archive_all(vec![Some(image_item(3))]).await.unwrap();
    let Some(Media::Image {
        edited,
        original,
        info,
    }) = outcomes[0].media()
    else {
        panic!("expected archived image, got {:?}", outcomes[0]);
    };

    assert!(edited.exists());
    assert!(original.exists());
    assert_eq!(edited.parent().unwrap(), dirs.temp);
    assert_eq!(original.parent().unwrap(), dirs.save);
    assert_eq!(edited.extension().unwrap(), "jpg");

    assert_eq!(read_info_from_file(original).unwrap().as_ref(), Some(info));
    assert_eq!(read_info_from_file(edited).unwrap().as_ref(), Some(info));

    let decoded = image::open(original).unwrap();
    assert_eq!(decoded.dimensions(), (11, 6));
}

#[tokio::test]
async fn test_video_passes_through_without_io() {
    let dirs = dirs();
    let archiver = archiver_for(&dirs);
    let edited = dirs.temp.join("edited.mp4");
    let original = dirs.save.join("original.mp4");
    std::fs::write(&edited, b"edited").unwrap();
    std::fs::write(&original, b"original").unwrap();

    let outcomes = archiver
        .archive_all(vec![Some(ExportItem::video(&edited, &original, info_for(0)))])
        .await
        .unwrap();

    let media = outcomes[0].media().expect("archived");
    assert!(media.is_video());
    assert_eq!(media.edited_path(), edited);
    assert_eq!(media.original_path(), original);
    assert_eq!(file_count(&dirs.temp), 1);
    assert_eq!(file_count(&dirs.save), 1);
}

#[tokio::test]
async fn test_mismatched_kinds_fail_only_their_slot() {
    let dirs = dirs();
    let archiver = archiver_for(&dirs);
    let malformed = ExportItem {
        result: ExportAsset::Image(Arc::new(solid(4, 4, 1))),
        original: ExportAsset::Video(PathBuf::from("original.mp4")),
        info: MediaInfo::new(),
    };

    let outcomes = archiver
        .archive_all(vec![Some(malformed), Some(image_item(0))])
        .await
        .unwrap();

    assert_eq!(
        outcomes[0],
        ArchiveOutcome::Failed(ArchiveError::KindMismatch {
            result: "image",
            original: "video",
        })
    );
    assert!(outcomes[1].is_archived());
    assert_eq!(file_count(&dirs.temp), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_fifty_concurrent_items_get_distinct_files() {
    let dirs = dirs();
    let archiver = archiver_for(&dirs);

    let items: Vec<_> = (0..50).map(|i| Some(image_item(i))).collect();
    let outcomes = archiver.archive_all(items).await.unwrap();

    let mut seen = HashSet::new();
    for (index, outcome) in outcomes.iter().enumerate() {
        let media = outcome.media().expect("archived");
        assert!(seen.insert(media.edited_path().to_path_buf()));
        assert!(seen.insert(media.original_path().to_path_buf()));

        // Each file still holds its own item's content
        let expected_width = 8 + index as u32;
        for path in [media.edited_path(), media.original_path()] {
            assert_eq!(image::open(path).unwrap().width(), expected_width);
            assert_eq!(read_info_from_file(path).unwrap(), Some(info_for(index)));
        }
    }

    assert_eq!(file_count(&dirs.temp), 50);
    assert_eq!(file_count(&dirs.save), 50);
}

#[tokio::test]
async fn test_write_failure_is_contained_to_its_slot() {
    let edited_sink = Arc::new(WidthSink::new());
    let original_sink = Arc::new(WidthSink {
        fail_width: Some(10),
        ..WidthSink::new()
    });
    let archiver = BatchArchiver::with_sinks(edited_sink, original_sink);

    let items = (0..4).map(|i| Some(image_item(i))).collect();
    let outcomes = archiver.archive_all(items).await.unwrap();

    assert!(outcomes[0].is_archived());
    assert!(outcomes[1].is_archived());
    assert_eq!(
        outcomes[2],
        ArchiveOutcome::Failed(ArchiveError::SaveFailed("width 10 is unwritable".to_string()))
    );
    assert!(outcomes[3].is_archived());
}

#[tokio::test]
async fn test_failed_original_removes_edited_file() {
    let dirs = dirs();
    let edited_sink = Arc::new(JpegFileSink::new(&dirs.temp, ArchiveEncoder::new()));
    let original_sink = Arc::new(WidthSink {
        fail_width: Some(8),
        ..WidthSink::new()
    });
    let archiver = BatchArchiver::with_sinks(edited_sink, original_sink);

    let outcomes = archiver.archive_all(vec![Some(image_item(0))]).await.unwrap();

    assert!(matches!(outcomes[0], ArchiveOutcome::Failed(ArchiveError::SaveFailed(_))));
    assert_eq!(file_count(&dirs.temp), 0);
}

#[tokio::test]
async fn test_bounded_concurrency() {
    let sink = Arc::new(WidthSink {
        delay: |_| Duration::from_millis(10),
        ..WidthSink::new()
    });
    let archiver = BatchArchiver::with_sinks(sink.clone(), sink.clone()).with_max_concurrent(1);

    let items = (0..6).map(|i| Some(image_item(i))).collect();
    let outcomes = archiver.archive_all(items).await.unwrap();

    assert!(outcomes.iter().all(ArchiveOutcome::is_archived));
    assert_eq!(sink.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_batch_writes_nothing() {
    let dirs = dirs();
    let cancel = CancelFlag::new();
    let archiver = archiver_for(&dirs).with_cancel_flag(cancel.clone());
    cancel.cancel();

    let outcomes = archiver
        .archive_all(vec![Some(image_item(0)), None, Some(image_item(2))])
        .await
        .unwrap();

    assert_eq!(outcomes[0], ArchiveOutcome::Failed(ArchiveError::Cancelled));
    assert_eq!(outcomes[1], ArchiveOutcome::Empty);
    assert_eq!(outcomes[2], ArchiveOutcome::Failed(ArchiveError::Cancelled));
    assert_eq!(file_count(&dirs.temp), 0);
    assert_eq!(file_count(&dirs.save), 0);

    // Reset makes the same archiver usable again
    archiver.cancel_flag().reset();
    let outcomes = archiver.archive_all(vec![Some(image_item(0))]).await.unwrap();
    assert!(outcomes[0].is_archived());
}

#[tokio::test]
async fn test_panicking_sink_aborts_only_its_slot() {
    let sink = Arc::new(WidthSink {
        panic_width: Some(9),
        ..WidthSink::new()
    });
    let archiver = BatchArchiver::with_sinks(sink.clone(), sink);

    let items = (0..3).map(|i| Some(image_item(i))).collect();
    let outcomes = archiver.archive_all(items).await.unwrap();

    assert!(outcomes[0].is_archived());
    assert!(matches!(outcomes[1], ArchiveOutcome::Failed(ArchiveError::TaskAborted(_))));
    assert!(outcomes[2].is_archived());
}

#[tokio::test]
async fn test_panicking_original_sink_removes_edited_file() {
    let dirs = dirs();
    let edited_sink = Arc::new(JpegFileSink::new(&dirs.temp, ArchiveEncoder::new()));
    let original_sink = Arc::new(WidthSink {
        panic_width: Some(9),
        ..WidthSink::new()
    });
    let archiver = BatchArchiver::with_sinks(edited_sink, original_sink);

    let items = (0..3).map(|i| Some(image_item(i))).collect();
    let outcomes = archiver.archive_all(items).await.unwrap();

    assert!(outcomes[0].is_archived());
    assert!(matches!(outcomes[1], ArchiveOutcome::Failed(ArchiveError::TaskAborted(_))));
    assert!(outcomes[2].is_archived());

    // Only the two archived items keep their edited files
    assert_eq!(file_count(&dirs.temp), 2);
}

#[tokio::test]
async fn test_dropped_batch_aborts_pending_items() {
    let sink = Arc::new(WidthSink {
        delay: |_| Duration::from_millis(50),
        ..WidthSink::new()
    });
    let archiver = BatchArchiver::with_sinks(sink.clone(), sink.clone()).with_max_concurrent(1);

    let items = (0..4).map(|i| Some(image_item(i))).collect();
    let batch = archiver.archive_all(items);
    assert!(tokio::time::timeout(Duration::from_millis(20), batch).await.is_err());

    // The write already on the blocking pool finishes; nothing else starts
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_destination_fails_whole_batch() {
    let dirs = dirs();
    let archiver = archiver_for(&dirs);
    std::fs::remove_dir(&dirs.save).unwrap();

    let result = archiver.archive_all(vec![Some(image_item(0)), None]).await;
    assert_eq!(result, Err(ArchiveError::DestinationUnavailable(dirs.save.clone())));

    // Nothing was dispatched
    assert_eq!(file_count(&dirs.temp), 0);

    // Video-only batches do not touch the directories
    let video = ExportItem::video("edited.mp4", "original.mp4", MediaInfo::new());
    let outcomes = archiver.archive_all(vec![Some(video)]).await.unwrap();
    assert!(outcomes[0].is_archived());
}
