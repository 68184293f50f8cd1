//! # frametally
//!
//! Tally video frames across a directory of media files and write a counts
//! CSV.
//!
//! `frametally` walks a directory for `.mp4` containers and raw `.h264`
//! elementary streams, determines a frame count for each file — by full
//! decode or from container metadata — and writes a `filename,framecount`
//! CSV, powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Count a Directory
//!
//! ```no_run
//! use frametally::{BatchOptions, run_batch};
//!
//! let summary = run_batch(&BatchOptions::new("recordings"))?;
//! println!("wrote {}", summary.csv_path.display());
//! # Ok::<(), frametally::TallyError>(())
//! ```
//!
//! ### Count a Single File
//!
//! ```no_run
//! use frametally::{CountOptions, CountStrategy, count_frames};
//!
//! let count = count_frames("input.mp4", CountStrategy::Auto, &CountOptions::new())?;
//! println!("{} frames", count.frames);
//! # Ok::<(), frametally::TallyError>(())
//! ```
//!
//! ### Wrap an Elementary Stream
//!
//! ```no_run
//! use frametally::Mp4Transcoder;
//!
//! Mp4Transcoder::new("input.h264", "input.mp4")?.run()?;
//! # Ok::<(), frametally::TallyError>(())
//! ```
//!
//! ## Counting Strategies
//!
//! - [`CountStrategy::Decode`] — feed every packet to the decoder and count
//!   received frames. Exact, slow.
//! - [`CountStrategy::Metadata`] — read the container's `nb_frames` field,
//!   or compute `round(duration × frame_rate)`. Fast, only as good as the
//!   headers.
//! - [`CountStrategy::Auto`] (default) — headers first, with a packet-timing
//!   scan to detect variable frame rate, and a decode fallback whenever the
//!   headers are missing or untrustworthy.
//!
//! ## Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | Distribute batch counting across a worker thread pool |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod batch;
pub mod count;
pub mod enumerate;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod probe;
pub mod progress;
pub mod report;
pub mod source;
pub mod timing;
pub mod transcode;

pub use batch::{BatchOptions, BatchSummary, SkippedFile, run_batch};
pub use count::{CountOptions, CountStrategy, FrameCount, count_frames};
pub use enumerate::{VideoFile, VideoKind, enumerate_videos};
pub use error::TallyError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::{MediaMetadata, VideoMetadata};
pub use probe::MediaProbe;
pub use progress::{CancellationToken, OperationType, ProgressCallback, ProgressInfo};
pub use report::{COUNTS_FILE_NAME, CountRecord, write_counts_csv};
pub use source::VideoSource;
pub use timing::{FrameTimingAnalysis, analyze_timing};
pub use transcode::{Mp4Transcoder, container_output_path};
