//! Error types for the `frametally` crate.
//!
//! This module defines [`TallyError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry enough context to diagnose
//! a failure from the message alone, including file paths and upstream error
//! text.

use std::{io::Error as IoError, path::PathBuf};

use csv::Error as CsvError;
use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `frametally` operations.
///
/// Every public method that can fail returns `Result<T, TallyError>`.
/// Batch processing treats only the directory-level variants
/// ([`DirectoryNotFound`](TallyError::DirectoryNotFound),
/// [`NotADirectory`](TallyError::NotADirectory)) as fatal; per-file variants
/// are logged and recorded as skips.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TallyError {
    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The input directory does not exist.
    #[error("Video directory not found: {path}")]
    DirectoryNotFound {
        /// The directory that was requested.
        path: PathBuf,
    },

    /// The input path exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded during counting.
    #[error("Failed to decode video stream: {0}")]
    DecodeError(String),

    /// The container carries neither a frame-count field nor a usable
    /// duration/frame-rate pair, so a metadata-based count is impossible.
    #[error("No usable frame-count metadata in {path}")]
    MetadataUnavailable {
        /// The file whose headers were inspected.
        path: PathBuf,
    },

    /// Wrapping an elementary stream into a container failed.
    #[error("Transcode error: {0}")]
    TranscodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// Writing the counts CSV failed.
    #[error("CSV error: {0}")]
    CsvError(#[from] CsvError),

    /// The operation was cancelled via a
    /// [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for TallyError {
    fn from(error: FfmpegError) -> Self {
        TallyError::FfmpegError(error.to_string())
    }
}
