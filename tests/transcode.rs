//! Elementary stream wrapping tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`;
//! they skip themselves when fixtures are absent.

use std::path::Path;

use frametally::{
    CountOptions, CountStrategy, Mp4Transcoder, TallyError, container_output_path, count_frames,
};

const SAMPLE_FRAMES: u64 = 125;

fn sample_stream_path() -> &'static str {
    "tests/fixtures/sample_stream.h264"
}

#[test]
fn wrapped_stream_counts_via_metadata() {
    let input = sample_stream_path();
    if !Path::new(input).exists() {
        return;
    }

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = container_output_path(Path::new(input), directory.path());

    Mp4Transcoder::new(input, &output)
        .expect("Failed to create transcoder")
        .assume_frame_rate(25.0)
        .run()
        .expect("Transcode failed");

    assert!(output.exists(), "Output container should exist");
    assert!(
        Path::new(input).exists(),
        "Source stream must not be deleted",
    );

    // The wrapped container carries the metadata the fast path needs, and
    // the count must match the stream's true frame count.
    let count = count_frames(&output, CountStrategy::Metadata, &CountOptions::new())
        .expect("Metadata count on wrapped file failed");
    assert_eq!(count.frames, SAMPLE_FRAMES);

    let decoded = count_frames(&output, CountStrategy::Decode, &CountOptions::new())
        .expect("Decode count on wrapped file failed");
    assert_eq!(decoded.frames, SAMPLE_FRAMES);
}

#[test]
fn missing_input_is_an_error() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = directory.path().join("out.mp4");

    let result = Mp4Transcoder::new("this_file_does_not_exist.h264", &output);
    assert!(matches!(result, Err(TallyError::FileOpen { .. })));
}

#[test]
fn garbage_input_fails_without_panicking() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = directory.path().join("garbage.h264");
    std::fs::write(&input, b"not an elementary stream").expect("Failed to write garbage");
    let output = directory.path().join("out.mp4");

    let result = Mp4Transcoder::new(&input, &output).and_then(|transcoder| transcoder.run());
    assert!(result.is_err(), "Expected error for garbage input");
}
