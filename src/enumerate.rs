//! Video file enumeration.
//!
//! [`enumerate_videos`] lists a single directory level and keeps only the
//! file kinds this crate knows how to count: `.mp4` containers and raw
//! `.h264` elementary streams. The result is sorted by file name so that
//! repeated runs over an unchanged directory process (and report) files in
//! the same order.
//!
//! # Example
//!
//! ```no_run
//! use frametally::enumerate_videos;
//!
//! let videos = enumerate_videos("recordings")?;
//! for video in &videos {
//!     println!("{} ({:?})", video.file_name(), video.kind);
//! }
//! # Ok::<(), frametally::TallyError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::TallyError;

/// The kind of video file, detected from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoKind {
    /// An `.mp4` container with stream-level metadata.
    Mp4,
    /// A raw `.h264` elementary stream without container framing.
    H264,
}

impl VideoKind {
    /// Detect the kind from a file extension (without the leading dot).
    ///
    /// Matching is case-insensitive; unrecognized extensions return `None`.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "mp4" => Some(VideoKind::Mp4),
            "h264" => Some(VideoKind::H264),
            _ => None,
        }
    }

    /// Whether this kind is a raw elementary stream (no container metadata).
    pub fn is_elementary(self) -> bool {
        matches!(self, VideoKind::H264)
    }
}

/// One discovered video file: a path plus its detected kind.
///
/// Immutable once enumerated.
#[derive(Debug, Clone)]
pub struct VideoFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// Detected extension kind.
    pub kind: VideoKind,
}

impl VideoFile {
    /// The file name component as a `String` (lossy for non-UTF-8 names).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// List the video files in `directory`, sorted by file name.
///
/// Only regular files whose extension is `.mp4` or `.h264`
/// (case-insensitive) are returned. Subdirectories are not descended into.
///
/// # Errors
///
/// Returns [`TallyError::DirectoryNotFound`] if the path does not exist and
/// [`TallyError::NotADirectory`] if it exists but is not a directory. These
/// are the only errors that abort a batch run before any file is processed.
pub fn enumerate_videos<P: AsRef<Path>>(directory: P) -> Result<Vec<VideoFile>, TallyError> {
    let directory = directory.as_ref();

    if !directory.exists() {
        return Err(TallyError::DirectoryNotFound {
            path: directory.to_path_buf(),
        });
    }
    if !directory.is_dir() {
        return Err(TallyError::NotADirectory {
            path: directory.to_path_buf(),
        });
    }

    let mut videos: Vec<VideoFile> = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        let Some(kind) = path
            .extension()
            .and_then(|extension| extension.to_str())
            .and_then(VideoKind::from_extension)
        else {
            continue;
        };

        videos.push(VideoFile { path, kind });
    }

    videos.sort_by_key(|video| video.path.file_name().map(|name| name.to_owned()));

    log::debug!(
        "Enumerated {} video file(s) in {}",
        videos.len(),
        directory.display(),
    );

    Ok(videos)
}

#[cfg(test)]
mod tests {
    use super::VideoKind;

    #[test]
    fn extension_detection() {
        assert_eq!(VideoKind::from_extension("mp4"), Some(VideoKind::Mp4));
        assert_eq!(VideoKind::from_extension("MP4"), Some(VideoKind::Mp4));
        assert_eq!(VideoKind::from_extension("h264"), Some(VideoKind::H264));
        assert_eq!(VideoKind::from_extension("H264"), Some(VideoKind::H264));
        assert_eq!(VideoKind::from_extension("mkv"), None);
        assert_eq!(VideoKind::from_extension(""), None);
    }

    #[test]
    fn elementary_kinds() {
        assert!(VideoKind::H264.is_elementary());
        assert!(!VideoKind::Mp4.is_elementary());
    }
}
