//! Counts CSV writer tests.

use std::fs;

use frametally::{COUNTS_FILE_NAME, CountRecord, write_counts_csv};

fn record(filename: &str, framecount: u64) -> CountRecord {
    CountRecord {
        filename: filename.to_string(),
        framecount,
    }
}

#[test]
fn writes_header_and_rows() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join(COUNTS_FILE_NAME);

    write_counts_csv(&path, &[record("a.mp4", 120), record("b.h264", 60)])
        .expect("Failed to write CSV");

    let contents = fs::read_to_string(&path).expect("Failed to read CSV");
    assert_eq!(contents, "filename,framecount\na.mp4,120\nb.h264,60\n");
}

#[test]
fn empty_record_set_writes_header_only() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join(COUNTS_FILE_NAME);

    write_counts_csv(&path, &[]).expect("Failed to write CSV");

    let contents = fs::read_to_string(&path).expect("Failed to read CSV");
    assert_eq!(contents, "filename,framecount\n");
}

#[test]
fn quotes_filenames_containing_separators() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join(COUNTS_FILE_NAME);

    write_counts_csv(&path, &[record("we,ird.mp4", 7)]).expect("Failed to write CSV");

    let contents = fs::read_to_string(&path).expect("Failed to read CSV");
    assert_eq!(contents, "filename,framecount\n\"we,ird.mp4\",7\n");
}

#[test]
fn overwrites_existing_file() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join(COUNTS_FILE_NAME);

    fs::write(&path, "stale contents").expect("Failed to seed file");
    write_counts_csv(&path, &[record("a.mp4", 1)]).expect("Failed to write CSV");

    let contents = fs::read_to_string(&path).expect("Failed to read CSV");
    assert_eq!(contents, "filename,framecount\na.mp4,1\n");
}

#[test]
fn rewriting_identical_records_is_byte_identical() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let path = directory.path().join(COUNTS_FILE_NAME);
    let records = [record("a.mp4", 120), record("b.h264", 60)];

    write_counts_csv(&path, &records).expect("Failed to write CSV");
    let first = fs::read(&path).expect("Failed to read CSV");

    write_counts_csv(&path, &records).expect("Failed to rewrite CSV");
    let second = fs::read(&path).expect("Failed to re-read CSV");

    assert_eq!(first, second);
}
