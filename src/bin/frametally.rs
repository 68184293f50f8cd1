use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use frametally::{
    BatchOptions, CountOptions, CountStrategy, FfmpegLogLevel, MediaProbe, Mp4Transcoder,
    OperationType, ProgressCallback, ProgressInfo, container_output_path, count_frames,
    run_batch,
};

const CLI_AFTER_HELP: &str = "Examples:\n  frametally count --video-filepath recordings\n  frametally count --video-filepath recordings --output-filepath out --transcode --progress\n  frametally count --video-filepath recordings --strategy decode --verbose\n  frametally probe input.mp4 --json\n  frametally transcode input.h264 --out converted --framerate 30\n  frametally completions zsh > _frametally";

#[derive(Debug, Parser)]
#[command(
    name = "frametally",
    version,
    about = "Tally video frames across a directory and write a counts CSV",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,

    /// Show a progress bar where supported.
    #[arg(long)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Desired worker thread count for thread-aware commands.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Count frames for every video in a directory and write counts.csv.
    #[command(
        about = "Count frames across a directory",
        after_help = "Examples:\n  frametally count --video-filepath recordings\n  frametally count --video-filepath recordings --strategy metadata\n  frametally count --video-filepath recordings --transcode --framerate 30 --progress"
    )]
    Count {
        /// Path to the directory containing the video files.
        #[arg(long)]
        video_filepath: PathBuf,

        /// Where counts.csv (and transcoded files) will be written.
        #[arg(long, default_value = ".")]
        output_filepath: PathBuf,

        /// Counting strategy: auto | decode | metadata.
        #[arg(long, default_value = "auto")]
        strategy: String,

        /// Wrap .h264 elementary streams into .mp4 before counting.
        #[arg(long)]
        transcode: bool,

        /// Frame rate assumed when wrapping elementary streams.
        #[arg(long)]
        framerate: Option<f64>,

        /// Accept duration-based estimates without a packet-timing scan.
        #[arg(long)]
        no_timing_check: bool,
    },

    /// Print video metadata for a single file (alias: info).
    #[command(
        about = "Print video metadata",
        visible_alias = "info",
        after_help = "Examples:\n  frametally probe input.mp4\n  frametally probe input.mp4 --json"
    )]
    Probe {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Wrap one .h264 elementary stream into an .mp4 container.
    #[command(
        about = "Wrap an elementary stream into .mp4",
        after_help = "Examples:\n  frametally transcode input.h264\n  frametally transcode input.h264 --out converted --framerate 30"
    )]
    Transcode {
        /// Input elementary stream path.
        input: PathBuf,

        /// Output directory (defaults to the input's directory).
        #[arg(long)]
        out: Option<PathBuf>,

        /// Frame rate assumed for timestamp generation.
        #[arg(long)]
        framerate: Option<f64>,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_strategy(value: &str) -> Option<CountStrategy> {
    match value.to_ascii_lowercase().as_str() {
        "auto" => Some(CountStrategy::Auto),
        "decode" | "slow" => Some(CountStrategy::Decode),
        "metadata" | "fast" => Some(CountStrategy::Metadata),
        _ => None,
    }
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" | "warn" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let filter = if global.debug {
        "debug"
    } else if global.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        frametally::set_ffmpeg_log_level(parsed);
    }

    #[cfg(feature = "rayon")]
    if let Some(threads) = global.threads {
        if threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()?;
        }
    }

    #[cfg(not(feature = "rayon"))]
    if global.threads.is_some() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "--threads requires building with the `rayon` feature".yellow()
        );
    }

    Ok(())
}

/// Progress bar over the files of a batch run.
///
/// The batch reports per-file progress with a known total; frame-level
/// reports (no total) are shown as a message on the same bar.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        match info.operation {
            OperationType::BatchProcessing => {
                if let Some(total) = info.total {
                    if self.bar.length() != Some(total) {
                        self.bar.set_length(total);
                    }
                    self.bar.set_position(info.current);
                }
            }
            _ => {
                self.bar
                    .set_message(format!("{} frames read", info.current));
            }
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Count {
            video_filepath,
            output_filepath,
            strategy,
            transcode,
            framerate,
            no_timing_check,
        } => {
            let strategy =
                parse_strategy(&strategy).ok_or(format!("unsupported --strategy: {strategy}"))?;

            let mut count_options = CountOptions::new().with_timing_check(!no_timing_check);

            let progress = if cli.global.progress {
                let progress = Arc::new(TerminalProgress::new()?);
                count_options = count_options.with_progress(progress.clone());
                Some(progress)
            } else {
                None
            };

            let mut options = BatchOptions::new(&video_filepath)
                .with_output_dir(&output_filepath)
                .with_strategy(strategy)
                .with_transcode(transcode)
                .with_count_options(count_options);
            if let Some(framerate) = framerate {
                options = options.with_assumed_frame_rate(framerate);
            }

            let summary = run_batch(&options)?;

            if let Some(progress) = progress {
                progress.finish();
            }

            for skip in &summary.skipped {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("skipped {}: {}", skip.filename, skip.reason).yellow()
                );
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "counted {} file(s) ({} skipped) -> {}",
                    summary.records.len(),
                    summary.skipped.len(),
                    summary.csv_path.display(),
                )
                .green()
            );
        }
        Commands::Probe { input, json } => {
            let metadata = MediaProbe::probe(&input)?;
            if json {
                let payload = json!({
                    "format": metadata.format,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "video": metadata.video.as_ref().map(|video| json!({
                        "width": video.width,
                        "height": video.height,
                        "fps": video.frames_per_second,
                        "nb_frames": video.nb_frames,
                        "header_frame_count": video.frame_count_from_headers(metadata.duration),
                        "codec": video.codec,
                    })),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Format: {}", metadata.format);
                println!("Duration: {:?}", metadata.duration);
                if let Some(video) = &metadata.video {
                    println!(
                        "Video: {}x{} @ {:.2} fps [{}]",
                        video.width, video.height, video.frames_per_second, video.codec,
                    );
                    match video.frame_count_from_headers(metadata.duration) {
                        Some(frames) => println!("Frames (headers): {frames}"),
                        None => println!("Frames (headers): unavailable"),
                    }
                }
            }
        }
        Commands::Transcode {
            input,
            out,
            framerate,
        } => {
            let output_dir = match out {
                Some(dir) => dir,
                None => input
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
            };
            std::fs::create_dir_all(&output_dir)?;
            let output_path = container_output_path(&input, &output_dir);

            let mut transcoder = Mp4Transcoder::new(&input, &output_path)?;
            if let Some(framerate) = framerate {
                transcoder = transcoder.assume_frame_rate(framerate);
            }
            transcoder.run()?;

            // Confirm the wrap produced a countable container.
            let count = count_frames(
                &output_path,
                CountStrategy::Metadata,
                &CountOptions::new(),
            )?;

            println!(
                "{} {}",
                "saved".green().bold(),
                format!("{} ({} frames)", output_path.display(), count.frames),
            );
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "frametally", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_log_level, parse_strategy};
    use frametally::CountStrategy;

    #[test]
    fn parse_strategy_aliases() {
        assert_eq!(parse_strategy("auto"), Some(CountStrategy::Auto));
        assert_eq!(parse_strategy("decode"), Some(CountStrategy::Decode));
        assert_eq!(parse_strategy("slow"), Some(CountStrategy::Decode));
        assert_eq!(parse_strategy("METADATA"), Some(CountStrategy::Metadata));
        assert_eq!(parse_strategy("fast"), Some(CountStrategy::Metadata));
        assert_eq!(parse_strategy("exact"), None);
    }

    #[test]
    fn parse_log_level_aliases() {
        assert!(parse_log_level("quiet").is_some());
        assert!(parse_log_level("WARN").is_some());
        assert!(parse_log_level("trace").is_some());
        assert!(parse_log_level("loud").is_none());
    }
}
