//! Frame timing analysis.
//!
//! [`FrameTimingAnalysis`] classifies a video stream as constant or variable
//! frame rate by scanning packet timestamps — no decoding involved. The
//! automatic counting strategy uses this to decide whether
//! `duration × frame_rate` can be trusted or a full decode is required.
//!
//! # Example
//!
//! ```no_run
//! use frametally::{VideoSource, analyze_timing};
//!
//! let source = VideoSource::open("input.mp4")?;
//! let analysis = analyze_timing(source)?;
//! if analysis.is_vfr {
//!     println!(
//!         "VFR stream, observed fps {:.2}..{:.2}",
//!         analysis.min_fps, analysis.max_fps,
//!     );
//! }
//! # Ok::<(), frametally::TallyError>(())
//! ```

use ffmpeg_next::{Error as FfmpegError, Packet, Rational};

use crate::error::TallyError;
use crate::source::VideoSource;

/// Relative frame-duration jitter above which a stream counts as VFR.
const VFR_STDDEV_RATIO: f64 = 0.10;

/// Results of packet-timing analysis on a video stream.
#[derive(Debug, Clone)]
pub struct FrameTimingAnalysis {
    /// Whether the stream appears to be variable frame rate.
    ///
    /// `true` when the standard deviation of frame durations exceeds 10% of
    /// the mean frame duration.
    pub is_vfr: bool,
    /// Mean frame duration in seconds.
    pub mean_frame_duration: f64,
    /// Standard deviation of frame durations in seconds.
    pub frame_duration_stddev: f64,
    /// Minimum instantaneous FPS observed.
    pub min_fps: f64,
    /// Maximum instantaneous FPS observed.
    pub max_fps: f64,
    /// Mean FPS (1 / mean frame duration), clamped to the observed range.
    pub mean_fps: f64,
    /// Number of timestamped packets seen on the video stream.
    pub packets_seen: u64,
}

/// Scan packet timestamps of the video stream and classify its timing.
///
/// Consumes the source: all packets are read through to end-of-stream.
/// Packets without a PTS (common in raw elementary streams) are ignored;
/// with fewer than two timestamped packets the stream is reported as CFR
/// with zeroed statistics.
///
/// # Errors
///
/// Returns [`TallyError::NoVideoStream`] if no video stream exists, or a
/// wrapped FFmpeg error if packet reading fails.
pub fn analyze_timing(mut source: VideoSource) -> Result<FrameTimingAnalysis, TallyError> {
    let video_stream_index = source
        .video_stream_index
        .ok_or(TallyError::NoVideoStream)?;

    let time_base: Rational = source
        .input_context
        .stream(video_stream_index)
        .ok_or(TallyError::NoVideoStream)?
        .time_base();

    log::debug!(
        "Analyzing frame timing for {} (stream={video_stream_index})",
        source.file_path.display(),
    );

    let tb_num = time_base.numerator() as f64;
    let tb_den = time_base.denominator().max(1) as f64;

    let mut pts_values: Vec<i64> = Vec::new();
    let mut packet = Packet::empty();
    loop {
        match packet.read(&mut source.input_context) {
            Ok(()) => {
                if packet.stream() != video_stream_index {
                    continue;
                }
                if let Some(pts) = packet.pts() {
                    pts_values.push(pts);
                }
            }
            Err(FfmpegError::Eof) => break,
            Err(error) => return Err(TallyError::from(error)),
        }
    }

    // Packets arrive in decode order; sort into display order.
    pts_values.sort_unstable();

    let durations: Vec<f64> = pts_values
        .windows(2)
        .map(|window| ((window[1] - window[0]) as f64) * tb_num / tb_den)
        .filter(|&duration| duration > 0.0)
        .collect();

    Ok(classify_durations(&durations, pts_values.len() as u64))
}

/// Compute the timing statistics from a list of inter-frame durations.
fn classify_durations(durations_seconds: &[f64], packets_seen: u64) -> FrameTimingAnalysis {
    if durations_seconds.is_empty() {
        return FrameTimingAnalysis {
            is_vfr: false,
            mean_frame_duration: 0.0,
            frame_duration_stddev: 0.0,
            min_fps: 0.0,
            max_fps: 0.0,
            mean_fps: 0.0,
            packets_seen,
        };
    }

    let mean = durations_seconds.iter().sum::<f64>() / durations_seconds.len() as f64;
    let variance = durations_seconds
        .iter()
        .map(|duration| (duration - mean).powi(2))
        .sum::<f64>()
        / durations_seconds.len() as f64;
    let stddev = variance.sqrt();

    let min_duration = durations_seconds
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    let max_duration = durations_seconds.iter().copied().fold(0.0_f64, f64::max);

    let max_fps = if min_duration > 0.0 { 1.0 / min_duration } else { 0.0 };
    let min_fps = if max_duration > 0.0 { 1.0 / max_duration } else { 0.0 };
    let mean_fps = if mean > 0.0 { 1.0 / mean } else { 0.0 };

    // Clamp to the observed range to avoid floating-point rounding artifacts
    // where 1/mean lands slightly outside [min_fps, max_fps].
    let mean_fps = mean_fps.clamp(min_fps, max_fps);

    let is_vfr = mean > 0.0 && (stddev / mean) > VFR_STDDEV_RATIO;

    FrameTimingAnalysis {
        is_vfr,
        mean_frame_duration: mean,
        frame_duration_stddev: stddev,
        min_fps,
        max_fps,
        mean_fps,
        packets_seen,
    }
}

#[cfg(test)]
mod tests {
    use super::classify_durations;

    #[test]
    fn constant_durations_are_cfr() {
        let durations = vec![0.04; 100];
        let analysis = classify_durations(&durations, 101);
        assert!(!analysis.is_vfr);
        assert!((analysis.mean_fps - 25.0).abs() < 1e-9);
        assert_eq!(analysis.packets_seen, 101);
    }

    #[test]
    fn jittery_durations_are_vfr() {
        // Alternating 30 fps / 15 fps frame spacing.
        let durations: Vec<f64> = (0..100)
            .map(|i| if i % 2 == 0 { 1.0 / 30.0 } else { 1.0 / 15.0 })
            .collect();
        let analysis = classify_durations(&durations, 101);
        assert!(analysis.is_vfr);
        assert!(analysis.min_fps < analysis.max_fps);
    }

    #[test]
    fn too_few_samples_default_to_cfr() {
        let analysis = classify_durations(&[], 1);
        assert!(!analysis.is_vfr);
        assert_eq!(analysis.mean_fps, 0.0);
    }
}
