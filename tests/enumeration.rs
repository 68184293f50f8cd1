//! Directory enumeration tests.

use std::fs;

use frametally::{TallyError, VideoKind, enumerate_videos};

#[test]
fn filters_and_sorts_by_filename() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    for name in ["b.h264", "a.mp4", "notes.txt", "clip.mkv"] {
        fs::write(directory.path().join(name), b"x").expect("Failed to write file");
    }
    fs::create_dir(directory.path().join("nested.mp4")).expect("Failed to create subdir");

    let videos = enumerate_videos(directory.path()).expect("Enumeration failed");

    let names: Vec<String> = videos.iter().map(|video| video.file_name()).collect();
    assert_eq!(names, ["a.mp4", "b.h264"]);
    assert_eq!(videos[0].kind, VideoKind::Mp4);
    assert_eq!(videos[1].kind, VideoKind::H264);
}

#[test]
fn extension_matching_is_case_insensitive() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    for name in ["UPPER.MP4", "raw.H264"] {
        fs::write(directory.path().join(name), b"x").expect("Failed to write file");
    }

    let videos = enumerate_videos(directory.path()).expect("Enumeration failed");
    assert_eq!(videos.len(), 2);
    assert_eq!(videos[0].kind, VideoKind::Mp4);
    assert_eq!(videos[1].kind, VideoKind::H264);
}

#[test]
fn empty_directory_yields_empty_list() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let videos = enumerate_videos(directory.path()).expect("Enumeration failed");
    assert!(videos.is_empty());
}

#[test]
fn missing_directory_is_an_error() {
    let result = enumerate_videos("this_directory_does_not_exist");
    assert!(matches!(
        result,
        Err(TallyError::DirectoryNotFound { .. }),
    ));

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("not found"),
        "Error message should mention the missing directory: {error_message}",
    );
}

#[test]
fn file_path_is_not_a_directory() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = directory.path().join("plain.mp4");
    fs::write(&file_path, b"x").expect("Failed to write file");

    let result = enumerate_videos(&file_path);
    assert!(matches!(result, Err(TallyError::NotADirectory { .. })));
}
