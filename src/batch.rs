//! The batch pipeline: enumerate → (transcode) → count → CSV.
//!
//! [`run_batch`] glues the per-file pieces together with per-file
//! isolation: one file failing to open or decode is logged, recorded as a
//! skip, and the run continues. Only an invalid input directory aborts the
//! run before any work happens.
//!
//! Files are processed sequentially by default. With the `rayon` feature
//! enabled they are distributed across the global rayon thread pool; each
//! worker opens its own FFmpeg context, so the only shared state is the
//! append-only outcome collection.
//!
//! # Example
//!
//! ```no_run
//! use frametally::{BatchOptions, run_batch};
//!
//! let summary = run_batch(&BatchOptions::new("recordings").with_output_dir("out"))?;
//! println!(
//!     "{} counted, {} skipped -> {}",
//!     summary.records.len(),
//!     summary.skipped.len(),
//!     summary.csv_path.display(),
//! );
//! # Ok::<(), frametally::TallyError>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::count::{CountOptions, CountStrategy, count_frames};
use crate::enumerate::{VideoFile, enumerate_videos};
use crate::error::TallyError;
use crate::progress::{OperationType, ProgressTracker};
use crate::report::{COUNTS_FILE_NAME, CountRecord, sort_records, write_counts_csv};
use crate::transcode::{Mp4Transcoder, container_output_path};

/// Configuration for one batch run.
///
/// # Example
///
/// ```no_run
/// use frametally::{BatchOptions, CountStrategy};
///
/// let options = BatchOptions::new("recordings")
///     .with_output_dir("out")
///     .with_strategy(CountStrategy::Decode)
///     .with_transcode(true);
/// ```
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory containing the video files.
    pub(crate) video_dir: PathBuf,
    /// Directory receiving `counts.csv` and any transcoded files.
    pub(crate) output_dir: PathBuf,
    /// Counting strategy applied to every file.
    pub(crate) strategy: CountStrategy,
    /// Wrap `.h264` elementary streams into `.mp4` before counting.
    pub(crate) transcode_elementary: bool,
    /// Frame rate assumed when wrapping elementary streams.
    pub(crate) assumed_frame_rate: Option<f64>,
    /// Per-file counting options (progress, cancellation, cadence).
    pub(crate) count: CountOptions,
}

impl BatchOptions {
    /// Create options for counting the videos under `video_dir`.
    ///
    /// Defaults: output to the current directory, [`CountStrategy::Auto`],
    /// no transcoding, default [`CountOptions`].
    pub fn new<P: AsRef<Path>>(video_dir: P) -> Self {
        Self {
            video_dir: video_dir.as_ref().to_path_buf(),
            output_dir: PathBuf::from("."),
            strategy: CountStrategy::Auto,
            transcode_elementary: false,
            assumed_frame_rate: None,
            count: CountOptions::new(),
        }
    }

    /// Set the directory `counts.csv` (and transcoded files) are written to.
    #[must_use]
    pub fn with_output_dir<P: AsRef<Path>>(mut self, output_dir: P) -> Self {
        self.output_dir = output_dir.as_ref().to_path_buf();
        self
    }

    /// Set the counting strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: CountStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable wrapping `.h264` streams into `.mp4` first.
    ///
    /// When enabled, the CSV row for a converted file carries the converted
    /// filename (`<stem>.mp4`), and the count is taken from the converted
    /// container.
    #[must_use]
    pub fn with_transcode(mut self, transcode: bool) -> Self {
        self.transcode_elementary = transcode;
        self
    }

    /// Set the frame rate assumed when wrapping elementary streams.
    #[must_use]
    pub fn with_assumed_frame_rate(mut self, frames_per_second: f64) -> Self {
        self.assumed_frame_rate = Some(frames_per_second);
        self
    }

    /// Set the per-file counting options.
    #[must_use]
    pub fn with_count_options(mut self, count: CountOptions) -> Self {
        self.count = count;
        self
    }
}

/// A file the batch could not count, with the reason it was skipped.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// File name of the video that failed.
    pub filename: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Outcome of one batch run.
#[derive(Debug, Clone)]
#[must_use]
pub struct BatchSummary {
    /// The records written to the CSV, sorted by filename.
    pub records: Vec<CountRecord>,
    /// Files that failed and were skipped.
    pub skipped: Vec<SkippedFile>,
    /// Where the CSV was written.
    pub csv_path: PathBuf,
}

/// Run the full pipeline over one directory.
///
/// Enumerates the videos, counts each one (optionally wrapping `.h264`
/// streams first), and writes `counts.csv` into the output directory.
/// A header-only CSV is written when the directory holds no matching
/// files, and a partial CSV when the run is cancelled midway.
///
/// # Errors
///
/// Returns [`TallyError::DirectoryNotFound`] / [`TallyError::NotADirectory`]
/// for an invalid input directory, and I/O or CSV errors when the output
/// cannot be written. Per-file failures never surface here — they are
/// logged and collected in [`BatchSummary::skipped`].
pub fn run_batch(options: &BatchOptions) -> Result<BatchSummary, TallyError> {
    let videos = enumerate_videos(&options.video_dir)?;
    fs::create_dir_all(&options.output_dir)?;

    log::info!(
        "Counting frames in {} file(s) from {}",
        videos.len(),
        options.video_dir.display(),
    );

    let tracker = Mutex::new(ProgressTracker::new(
        options.count.progress.clone(),
        OperationType::BatchProcessing,
        Some(videos.len() as u64),
        1,
    ));

    let outcomes = process_all(&videos, options, &tracker);

    if let Ok(mut tracker) = tracker.lock() {
        tracker.finish();
    }

    let mut records: Vec<CountRecord> = Vec::with_capacity(videos.len());
    let mut skipped: Vec<SkippedFile> = Vec::new();

    for (video, outcome) in videos.iter().zip(outcomes) {
        match outcome {
            Ok(record) => records.push(record),
            Err(TallyError::Cancelled) => {
                log::debug!("Cancelled before {} was processed", video.file_name());
            }
            Err(error) => {
                log::warn!("Skipping {}: {error}", video.file_name());
                skipped.push(SkippedFile {
                    filename: video.file_name(),
                    reason: error.to_string(),
                });
            }
        }
    }

    sort_records(&mut records);

    let csv_path = options.output_dir.join(COUNTS_FILE_NAME);
    write_counts_csv(&csv_path, &records)?;

    Ok(BatchSummary {
        records,
        skipped,
        csv_path,
    })
}

/// Count one file, transcoding it first when configured.
fn process_file(video: &VideoFile, options: &BatchOptions) -> Result<CountRecord, TallyError> {
    if options.transcode_elementary && video.kind.is_elementary() {
        let target = container_output_path(&video.path, &options.output_dir);

        let mut transcoder = Mp4Transcoder::new(&video.path, &target)?;
        if let Some(frame_rate) = options.assumed_frame_rate {
            transcoder = transcoder.assume_frame_rate(frame_rate);
        }
        transcoder.run()?;

        let count = count_frames(&target, options.strategy, &options.count)?;
        let filename = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        return Ok(CountRecord {
            filename,
            framecount: count.frames,
        });
    }

    let count = count_frames(&video.path, options.strategy, &options.count)?;
    Ok(CountRecord {
        filename: video.file_name(),
        framecount: count.frames,
    })
}

#[cfg(not(feature = "rayon"))]
fn process_all(
    videos: &[VideoFile],
    options: &BatchOptions,
    tracker: &Mutex<ProgressTracker>,
) -> Vec<Result<CountRecord, TallyError>> {
    videos
        .iter()
        .map(|video| {
            if options.count.is_cancelled() {
                return Err(TallyError::Cancelled);
            }
            let outcome = process_file(video, options);
            if let Ok(mut tracker) = tracker.lock() {
                tracker.advance();
            }
            outcome
        })
        .collect()
}

#[cfg(feature = "rayon")]
fn process_all(
    videos: &[VideoFile],
    options: &BatchOptions,
    tracker: &Mutex<ProgressTracker>,
) -> Vec<Result<CountRecord, TallyError>> {
    use rayon::prelude::*;

    videos
        .par_iter()
        .map(|video| {
            if options.count.is_cancelled() {
                return Err(TallyError::Cancelled);
            }
            let outcome = process_file(video, options);
            if let Ok(mut tracker) = tracker.lock() {
                tracker.advance();
            }
            outcome
        })
        .collect()
}
