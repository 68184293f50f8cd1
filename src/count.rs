//! Frame counting strategies.
//!
//! A count can come from two places: decoding every frame
//! ([`CountStrategy::Decode`], exact, slow) or reading container headers
//! ([`CountStrategy::Metadata`], fast, only as good as the headers). The
//! default [`CountStrategy::Auto`] makes the decision explicit: it tries the
//! headers first and falls back to a full decode whenever they are missing
//! or untrustworthy, rather than silently reporting a wrong number.
//!
//! # Example
//!
//! ```no_run
//! use frametally::{CountOptions, CountStrategy, count_frames};
//!
//! let count = count_frames("input.mp4", CountStrategy::Auto, &CountOptions::new())?;
//! println!("{} frames ({})", count.frames, if count.exact { "exact" } else { "from headers" });
//! # Ok::<(), frametally::TallyError>(())
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;
use std::sync::Arc;

use crate::error::TallyError;
use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};
use crate::source::VideoSource;
use crate::timing::analyze_timing;

/// How to determine a file's frame count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountStrategy {
    /// Headers first, decode fallback when they are absent or unreliable.
    /// This is the default.
    #[default]
    Auto,
    /// Always decode the full stream. Exact.
    Decode,
    /// Only read container headers; errors when they carry no usable count.
    Metadata,
}

/// A frame count together with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCount {
    /// The number of frames. Zero is a valid count (empty stream).
    pub frames: u64,
    /// `true` when every frame was decoded; `false` for header-derived
    /// counts, which may be estimates on damaged or variable-rate streams.
    pub exact: bool,
    /// The strategy that actually produced the number — [`CountStrategy::Decode`]
    /// or [`CountStrategy::Metadata`], never [`CountStrategy::Auto`].
    pub strategy: CountStrategy,
}

/// Options threaded through counting operations.
///
/// Carries the progress callback, cancellation token, progress cadence, and
/// whether [`CountStrategy::Auto`] verifies stream timing before trusting a
/// `duration × frame_rate` estimate.
///
/// A default-constructed value reports progress every 10 000 frames to a
/// no-op callback, never cancels, and verifies timing.
#[derive(Clone)]
pub struct CountOptions {
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// How often to fire the progress callback (every N frames).
    pub(crate) batch_size: u64,
    /// Whether `Auto` runs a packet-timing scan before accepting a
    /// `duration × frame_rate` estimate.
    pub(crate) verify_timing: bool,
}

impl CountOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 10_000,
            verify_timing: true,
        }
    }

    /// Set a progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Set a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Set the progress cadence (every N frames). Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Enable or disable the packet-timing scan in [`CountStrategy::Auto`].
    ///
    /// With the scan disabled, `Auto` accepts any `duration × frame_rate`
    /// estimate, which may be wrong for variable-frame-rate streams.
    #[must_use]
    pub fn with_timing_check(mut self, verify_timing: bool) -> Self {
        self.verify_timing = verify_timing;
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

impl Default for CountOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for CountOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CountOptions")
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .field("verify_timing", &self.verify_timing)
            .finish()
    }
}

/// Count the frames of one video file using the given strategy.
///
/// # Errors
///
/// - [`TallyError::FileOpen`] if the file cannot be opened.
/// - [`TallyError::NoVideoStream`] if it has no video stream.
/// - [`TallyError::MetadataUnavailable`] when
///   [`CountStrategy::Metadata`] finds no usable header count.
/// - [`TallyError::DecodeError`] / [`TallyError::Cancelled`] from the decode
///   path.
pub fn count_frames<P: AsRef<Path>>(
    path: P,
    strategy: CountStrategy,
    options: &CountOptions,
) -> Result<FrameCount, TallyError> {
    let path = path.as_ref();
    let source = VideoSource::open(path)?;

    match strategy {
        CountStrategy::Decode => decode_count(source, options),
        CountStrategy::Metadata => metadata_count(&source, path),
        CountStrategy::Auto => auto_count(source, path, options),
    }
}

fn decode_count(source: VideoSource, options: &CountOptions) -> Result<FrameCount, TallyError> {
    let frames = source.count_decoded(options)?;
    Ok(FrameCount {
        frames,
        exact: true,
        strategy: CountStrategy::Decode,
    })
}

fn metadata_count(source: &VideoSource, path: &Path) -> Result<FrameCount, TallyError> {
    let metadata = source.metadata();
    let video = metadata.video.as_ref().ok_or(TallyError::NoVideoStream)?;

    let frames = video
        .frame_count_from_headers(metadata.duration)
        .ok_or_else(|| TallyError::MetadataUnavailable {
            path: path.to_path_buf(),
        })?;

    Ok(FrameCount {
        frames,
        exact: false,
        strategy: CountStrategy::Metadata,
    })
}

/// The explicit fast/slow decision: headers when trustworthy, decode
/// otherwise.
fn auto_count(
    source: VideoSource,
    path: &Path,
    options: &CountOptions,
) -> Result<FrameCount, TallyError> {
    let metadata = source.metadata();
    let video = metadata.video.as_ref().ok_or(TallyError::NoVideoStream)?;

    // The container's own frame count needs no timing verification.
    if let Some(frames) = video.nb_frames {
        log::debug!("{}: using container frame count {frames}", path.display());
        return Ok(FrameCount {
            frames,
            exact: false,
            strategy: CountStrategy::Metadata,
        });
    }

    let Some(estimate) = video.frame_count_from_headers(metadata.duration) else {
        // No headers to lean on (raw elementary streams land here).
        log::debug!(
            "{}: no usable header count, falling back to decode",
            path.display(),
        );
        return decode_count(source, options);
    };

    if options.verify_timing {
        // Packet scan, no decode. Consumes the source; decode fallback
        // reopens the file.
        let analysis = analyze_timing(source)?;
        if analysis.is_vfr {
            log::debug!(
                "{}: variable frame rate detected (fps {:.2}..{:.2}), falling back to decode",
                path.display(),
                analysis.min_fps,
                analysis.max_fps,
            );
            return decode_count(VideoSource::open(path)?, options);
        }
    }

    log::debug!("{}: using header estimate {estimate}", path.display());
    Ok(FrameCount {
        frames: estimate,
        exact: false,
        strategy: CountStrategy::Metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::{CountOptions, CountStrategy};

    #[test]
    fn options_defaults() {
        let options = CountOptions::new();
        let debug = format!("{options:?}");
        assert!(debug.contains("has_cancellation: false"));
        assert!(debug.contains("batch_size: 10000"));
        assert!(debug.contains("verify_timing: true"));
    }

    #[test]
    fn options_batch_size_clamps_zero() {
        let options = CountOptions::new().with_batch_size(0);
        let debug = format!("{options:?}");
        assert!(debug.contains("batch_size: 1"));
    }

    #[test]
    fn default_strategy_is_auto() {
        assert_eq!(CountStrategy::default(), CountStrategy::Auto);
    }
}
