//! Media metadata types.
//!
//! This module defines the metadata structures returned by
//! [`VideoSource::metadata`](crate::VideoSource::metadata) and
//! [`MediaProbe::probe`](crate::MediaProbe::probe). Metadata is extracted
//! once when the file is opened and cached for the lifetime of the source.

use std::time::Duration;

/// Container-level metadata for a media file.
#[derive(Debug, Clone)]
#[must_use]
pub struct MediaMetadata {
    /// Video stream metadata, if a video stream is present.
    pub video: Option<VideoMetadata>,
    /// Total duration of the media file. Zero when the container does not
    /// report one (raw elementary streams).
    pub duration: Duration,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"h264"`).
    pub format: String,
}

/// Metadata for a video stream.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate
    /// content, and zero when the container reports none).
    pub frames_per_second: f64,
    /// The container's own frame-count field (`nb_frames`), when present
    /// and positive. This is the authoritative fast-path count.
    pub nb_frames: Option<u64>,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Derive a frame count from this metadata alone, without decoding.
    ///
    /// Prefers the container's `nb_frames` field; otherwise computes
    /// `round(duration_seconds * frames_per_second)`. Returns `None` when
    /// neither source is usable — callers must then fall back to a full
    /// decode rather than report a fabricated count.
    pub fn frame_count_from_headers(&self, duration: Duration) -> Option<u64> {
        if let Some(frames) = self.nb_frames {
            return Some(frames);
        }
        if self.frames_per_second > 0.0 && duration > Duration::ZERO {
            return Some((duration.as_secs_f64() * self.frames_per_second).round() as u64);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::VideoMetadata;

    fn metadata(nb_frames: Option<u64>, fps: f64) -> VideoMetadata {
        VideoMetadata {
            width: 640,
            height: 480,
            frames_per_second: fps,
            nb_frames,
            codec: "h264".to_string(),
        }
    }

    #[test]
    fn header_count_prefers_nb_frames() {
        let meta = metadata(Some(120), 30.0);
        assert_eq!(
            meta.frame_count_from_headers(Duration::from_secs(5)),
            Some(120),
        );
    }

    #[test]
    fn header_count_rounds_duration_times_rate() {
        let meta = metadata(None, 29.97);
        // 10s * 29.97 = 299.7 -> rounds to 300.
        assert_eq!(
            meta.frame_count_from_headers(Duration::from_secs(10)),
            Some(300),
        );
    }

    #[test]
    fn header_count_unavailable_without_rate_or_duration() {
        let meta = metadata(None, 0.0);
        assert_eq!(meta.frame_count_from_headers(Duration::from_secs(10)), None);

        let meta = metadata(None, 25.0);
        assert_eq!(meta.frame_count_from_headers(Duration::ZERO), None);
    }
}
