//! Frame counting tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`
//! (125-frame sample video); they skip themselves when fixtures are absent.

use std::path::Path;

use frametally::{
    CountOptions, CountStrategy, MediaProbe, TallyError, VideoSource, analyze_timing,
    count_frames,
};

const SAMPLE_FRAMES: u64 = 125;

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn sample_stream_path() -> &'static str {
    "tests/fixtures/sample_stream.h264"
}

#[test]
fn decode_count_is_exact() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let count = count_frames(path, CountStrategy::Decode, &CountOptions::new())
        .expect("Decode count failed");
    assert_eq!(count.frames, SAMPLE_FRAMES);
    assert!(count.exact);
    assert_eq!(count.strategy, CountStrategy::Decode);
}

#[test]
fn metadata_count_matches_decode_on_container() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let count = count_frames(path, CountStrategy::Metadata, &CountOptions::new())
        .expect("Metadata count failed");
    assert_eq!(count.frames, SAMPLE_FRAMES);
    assert!(!count.exact);
    assert_eq!(count.strategy, CountStrategy::Metadata);
}

#[test]
fn auto_uses_headers_on_container() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let count = count_frames(path, CountStrategy::Auto, &CountOptions::new())
        .expect("Auto count failed");
    assert_eq!(count.frames, SAMPLE_FRAMES);
    assert_eq!(count.strategy, CountStrategy::Metadata);
}

#[test]
fn auto_falls_back_to_decode_on_elementary_stream() {
    let path = sample_stream_path();
    if !Path::new(path).exists() {
        return;
    }

    // Raw streams carry no duration, so headers cannot produce a count.
    let count = count_frames(path, CountStrategy::Auto, &CountOptions::new())
        .expect("Auto count failed");
    assert_eq!(count.frames, SAMPLE_FRAMES);
    assert!(count.exact);
    assert_eq!(count.strategy, CountStrategy::Decode);
}

#[test]
fn metadata_count_errors_on_elementary_stream() {
    let path = sample_stream_path();
    if !Path::new(path).exists() {
        return;
    }

    let result = count_frames(path, CountStrategy::Metadata, &CountOptions::new());
    assert!(matches!(
        result,
        Err(TallyError::MetadataUnavailable { .. }),
    ));
}

#[test]
fn probe_reports_video_stream() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let metadata = MediaProbe::probe(path).expect("Probe failed");
    let video = metadata.video.expect("Expected a video stream");
    assert_eq!(video.width, 640);
    assert_eq!(video.height, 480);
    assert!((video.frames_per_second - 25.0).abs() < 0.01);
    assert_eq!(
        video.frame_count_from_headers(metadata.duration),
        Some(SAMPLE_FRAMES),
    );
}

#[test]
fn fixture_is_constant_frame_rate() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let source = VideoSource::open(path).expect("Failed to open fixture");
    let analysis = analyze_timing(source).expect("Timing analysis failed");
    assert!(!analysis.is_vfr);
    assert_eq!(analysis.packets_seen, SAMPLE_FRAMES);
    assert!((analysis.mean_fps - 25.0).abs() < 0.5);
}

#[test]
fn open_nonexistent_file() {
    let result = VideoSource::open("this_file_does_not_exist.mp4");
    assert!(result.is_err());

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to open video file"),
        "Error message should mention file open failure: {error_message}",
    );
}

#[test]
fn open_invalid_file() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_path = directory.path().join("invalid.mp4");
    std::fs::write(&invalid_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    let result = VideoSource::open(&invalid_path);
    assert!(result.is_err(), "Expected error for invalid media file");
}

#[test]
fn cancelled_decode_count_returns_cancelled() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let token = frametally::CancellationToken::new();
    token.cancel();
    let options = CountOptions::new().with_cancellation(token);

    let result = count_frames(path, CountStrategy::Decode, &options);
    assert!(matches!(result, Err(TallyError::Cancelled)));
}
