//! Lightweight media file probing.
//!
//! [`MediaProbe`] extracts metadata from a video file without keeping the
//! demuxer open. This is what the fast counting path uses to inspect many
//! files without the cost of retaining an FFmpeg input context per file.
//!
//! For decode-based counting, use [`VideoSource::open`](crate::VideoSource::open)
//! instead.

use std::path::Path;

use crate::error::TallyError;
use crate::metadata::MediaMetadata;
use crate::source::VideoSource;

/// Lightweight media file probe.
///
/// Opens the file, extracts metadata, and immediately closes the demuxer.
/// The resulting [`MediaMetadata`] is identical to what
/// [`VideoSource::metadata`](crate::VideoSource::metadata) returns, but
/// without keeping the file open.
///
/// # Example
///
/// ```no_run
/// use frametally::MediaProbe;
///
/// let metadata = MediaProbe::probe("input.mp4")?;
/// println!("Duration: {:?}, format: {}", metadata.duration, metadata.format);
/// if let Some(video) = &metadata.video {
///     println!("Video: {}x{} @ {} fps", video.width, video.height, video.frames_per_second);
/// }
/// # Ok::<(), frametally::TallyError>(())
/// ```
pub struct MediaProbe;

impl MediaProbe {
    /// Probe a video file and return its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::FileOpen`] if the file cannot be opened or
    /// recognised as a media file.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<MediaMetadata, TallyError> {
        let source = VideoSource::open(path)?;
        Ok(source.metadata.clone())
    }

    /// Probe multiple video files and return their metadata.
    ///
    /// Files that cannot be probed produce an `Err` entry in the result
    /// vector rather than aborting the entire batch.
    pub fn probe_many<P: AsRef<Path>>(paths: &[P]) -> Vec<Result<MediaMetadata, TallyError>> {
        paths.iter().map(|path| Self::probe(path)).collect()
    }
}
