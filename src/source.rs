//! Core [`VideoSource`] implementation.
//!
//! `VideoSource` is the main entry point for single-file work. It opens a
//! video file, extracts and caches metadata, and exposes the decode-based
//! counting loop that the fast path falls back to.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, codec::context::Context as CodecContext,
    format::context::Input, frame::Video as VideoFrame, media::Type,
};

use crate::{
    count::CountOptions,
    error::TallyError,
    metadata::{MediaMetadata, VideoMetadata},
    progress::{OperationType, ProgressTracker},
};

/// An opened video file: demuxer context plus cached metadata.
///
/// Created via [`VideoSource::open`]. Metadata is read once at open time;
/// [`count_decoded`](VideoSource::count_decoded) consumes the demuxer to
/// produce an exact frame count.
///
/// # Example
///
/// ```no_run
/// use frametally::{CountOptions, VideoSource};
///
/// let mut source = VideoSource::open("input.mp4")?;
/// println!("codec: {:?}", source.metadata().video);
/// let frames = source.count_decoded(&CountOptions::new())?;
/// println!("{frames} frames");
/// # Ok::<(), frametally::TallyError>(())
/// ```
pub struct VideoSource {
    /// The opened FFmpeg input (demuxer) context.
    pub(crate) input_context: Input,
    /// Cached metadata extracted at open time.
    pub(crate) metadata: MediaMetadata,
    /// Index of the best video stream, if one exists.
    pub(crate) video_stream_index: Option<usize>,
    /// Path to the opened file (kept for error messages).
    pub(crate) file_path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file for counting.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, and caches its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::FileOpen`] if the file cannot be opened or is
    /// not recognisable as media.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TallyError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening video file: {}", file_path.display());

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| TallyError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| TallyError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let video_stream_index = input_context
            .streams()
            .best(Type::Video)
            .map(|stream| stream.index());

        // Container-level duration. Raw elementary streams report none.
        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let format = input_context.format().name().to_string();

        let video_metadata = match video_stream_index {
            Some(index) => Some(read_video_metadata(&input_context, index, &file_path)?),
            None => None,
        };

        let metadata = MediaMetadata {
            video: video_metadata,
            duration,
            format,
        };

        log::info!(
            "Opened video file: {} (format={}, duration={:.2}s)",
            file_path.display(),
            metadata.format,
            metadata.duration.as_secs_f64(),
        );

        if let Some(video) = &metadata.video {
            log::debug!(
                "Best video stream: {}x{}, {:.2} fps, codec={}, nb_frames={:?}",
                video.width,
                video.height,
                video.frames_per_second,
                video.codec,
                video.nb_frames,
            );
        }

        Ok(Self {
            input_context,
            metadata,
            video_stream_index,
            file_path,
        })
    }

    /// Get a reference to the cached metadata.
    ///
    /// Metadata is extracted once during [`open`](VideoSource::open) and
    /// does not require additional decoding.
    pub fn metadata(&self) -> &MediaMetadata {
        &self.metadata
    }

    /// Count frames by fully decoding the video stream.
    ///
    /// Feeds every video packet to the decoder, counts received frames, and
    /// flushes the decoder at end-of-stream so delayed frames are included.
    /// This is exact and codec-agnostic, at the cost of decode time.
    ///
    /// Consumes the source: the demuxer is read to the end and cannot be
    /// rewound.
    ///
    /// # Errors
    ///
    /// - [`TallyError::NoVideoStream`] if no video stream exists.
    /// - [`TallyError::DecodeError`] if the decoder cannot be constructed
    ///   or rejects a packet.
    /// - [`TallyError::Cancelled`] if the configured token fires.
    pub fn count_decoded(mut self, options: &CountOptions) -> Result<u64, TallyError> {
        let video_stream_index = self
            .video_stream_index
            .ok_or(TallyError::NoVideoStream)?;

        let stream = self
            .input_context
            .stream(video_stream_index)
            .ok_or(TallyError::NoVideoStream)?;
        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| TallyError::DecodeError(error.to_string()))?;
        let mut decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| TallyError::DecodeError(error.to_string()))?;

        log::debug!(
            "Decode count started for {} (stream={video_stream_index})",
            self.file_path.display(),
        );

        let mut tracker = ProgressTracker::new(
            options.progress.clone(),
            OperationType::FrameCounting,
            None,
            options.batch_size,
        );

        let mut count: u64 = 0;
        let mut decoded_frame = VideoFrame::empty();
        let mut packet = Packet::empty();

        loop {
            if options.is_cancelled() {
                return Err(TallyError::Cancelled);
            }

            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() != video_stream_index {
                        continue;
                    }
                    decoder
                        .send_packet(&packet)
                        .map_err(|error| TallyError::DecodeError(error.to_string()))?;
                    while decoder.receive_frame(&mut decoded_frame).is_ok() {
                        count += 1;
                        tracker.advance();
                    }
                }
                Err(FfmpegError::Eof) => break,
                Err(_) => {
                    // Damaged packet. Skip it and keep reading; the frames
                    // that do decode are still counted.
                    continue;
                }
            }
        }

        // Drain delayed frames.
        decoder
            .send_eof()
            .map_err(|error| TallyError::DecodeError(error.to_string()))?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            count += 1;
            tracker.advance();
        }

        tracker.finish();

        log::info!(
            "Decode count finished for {}: {count} frame(s)",
            self.file_path.display(),
        );

        Ok(count)
    }
}

/// Read dimensions, frame rate, `nb_frames`, and codec name for one stream.
fn read_video_metadata(
    input_context: &Input,
    stream_index: usize,
    file_path: &Path,
) -> Result<VideoMetadata, TallyError> {
    let stream = input_context
        .stream(stream_index)
        .ok_or(TallyError::NoVideoStream)?;

    let decoder_context =
        CodecContext::from_parameters(stream.parameters()).map_err(|error| {
            TallyError::FileOpen {
                path: file_path.to_path_buf(),
                reason: format!(
                    "Failed to read video codec parameters for stream {stream_index}: {error}"
                ),
            }
        })?;
    let video_decoder = decoder_context
        .decoder()
        .video()
        .map_err(|error| TallyError::FileOpen {
            path: file_path.to_path_buf(),
            reason: format!("Failed to create video decoder for stream {stream_index}: {error}"),
        })?;

    let frame_rate = stream.avg_frame_rate();
    let frames_per_second = if frame_rate.denominator() != 0 {
        frame_rate.numerator() as f64 / frame_rate.denominator() as f64
    } else {
        let rate = stream.rate();
        if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        }
    };

    let nb_frames = match stream.frames() {
        frames if frames > 0 => Some(frames as u64),
        _ => None,
    };

    let codec = video_decoder
        .codec()
        .map(|codec| codec.name().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(VideoMetadata {
        width: video_decoder.width(),
        height: video_decoder.height(),
        frames_per_second,
        nb_frames,
        codec,
    })
}
