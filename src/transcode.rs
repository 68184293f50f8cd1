//! Elementary stream → container conversion.
//!
//! This module provides [`Mp4Transcoder`] for wrapping a raw `.h264`
//! elementary stream into an `.mp4` container via packet-level stream copy.
//! No re-encoding happens: the encoded frames are byte-identical, the
//! container merely adds the framing (and with it the duration and
//! frame-count metadata the fast counting path needs). This is equivalent
//! to `ffmpeg -i input.h264 -c copy output.mp4`.
//!
//! # Example
//!
//! ```no_run
//! use frametally::Mp4Transcoder;
//!
//! Mp4Transcoder::new("input.h264", "output.mp4")?
//!     .assume_frame_rate(30.0)
//!     .run()?;
//! # Ok::<(), frametally::TallyError>(())
//! ```

use std::path::{Path, PathBuf};

use ffmpeg_next::{Dictionary, codec::Id, media::Type};

use crate::error::TallyError;

/// Lossless elementary-stream wrapper.
///
/// Copies the video stream from the input into a new container without
/// re-encoding. The output container format is inferred from the file
/// extension. The source file is never modified or deleted.
///
/// Raw elementary streams carry no timing information, so the demuxer has
/// to assume a frame rate when generating timestamps (FFmpeg's default is
/// 25 fps). Use [`assume_frame_rate`](Mp4Transcoder::assume_frame_rate)
/// when the true capture rate is known.
pub struct Mp4Transcoder {
    input_path: PathBuf,
    output_path: PathBuf,
    assumed_frame_rate: Option<f64>,
}

impl Mp4Transcoder {
    /// Create a new transcoder from an input to an output file.
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::FileOpen`] if the input file does not exist.
    pub fn new<P1: AsRef<Path>, P2: AsRef<Path>>(
        input: P1,
        output: P2,
    ) -> Result<Self, TallyError> {
        let input_path = input.as_ref().to_path_buf();
        let output_path = output.as_ref().to_path_buf();

        ffmpeg_next::init().map_err(|error| TallyError::FileOpen {
            path: input_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        if !input_path.exists() {
            return Err(TallyError::FileOpen {
                path: input_path,
                reason: "File does not exist".to_string(),
            });
        }

        Ok(Self {
            input_path,
            output_path,
            assumed_frame_rate: None,
        })
    }

    /// Set the frame rate assumed for timestamp generation.
    #[must_use]
    pub fn assume_frame_rate(mut self, frames_per_second: f64) -> Self {
        self.assumed_frame_rate = Some(frames_per_second);
        self
    }

    /// Execute the conversion.
    ///
    /// Reads all packets from the input, keeps the video stream, and writes
    /// it to the output container. No re-encoding is performed.
    ///
    /// # Errors
    ///
    /// Returns [`TallyError::FileOpen`] if either file cannot be opened,
    /// [`TallyError::NoVideoStream`] if the input has no video stream, or
    /// [`TallyError::TranscodeError`] if muxing fails.
    pub fn run(&self) -> Result<(), TallyError> {
        log::info!(
            "Wrapping {} into {}",
            self.input_path.display(),
            self.output_path.display(),
        );

        let mut input_options = Dictionary::new();
        if let Some(frame_rate) = self.assumed_frame_rate {
            input_options.set("framerate", &format!("{frame_rate}"));
        }

        let mut input_context =
            ffmpeg_next::format::input_with_dictionary(&self.input_path, input_options).map_err(
                |error| TallyError::FileOpen {
                    path: self.input_path.clone(),
                    reason: error.to_string(),
                },
            )?;

        let mut output_context = ffmpeg_next::format::output(&self.output_path).map_err(
            |error| TallyError::FileOpen {
                path: self.output_path.clone(),
                reason: format!("Failed to create output: {error}"),
            },
        )?;

        // Map the video stream(s) into the output; everything else is
        // dropped. input_stream_index → output_stream_index.
        let mut stream_map: Vec<Option<usize>> = Vec::new();
        let mut output_stream_count: usize = 0;

        for stream in input_context.streams() {
            if stream.parameters().medium() == Type::Video {
                let mut out_stream =
                    output_context.add_stream(ffmpeg_next::encoder::find(Id::None))?;
                out_stream.set_parameters(stream.parameters());
                // Reset codec tag to let the muxer choose.
                unsafe {
                    (*out_stream.parameters().as_mut_ptr()).codec_tag = 0;
                }
                stream_map.push(Some(output_stream_count));
                output_stream_count += 1;
            } else {
                stream_map.push(None);
            }
        }

        if output_stream_count == 0 {
            return Err(TallyError::NoVideoStream);
        }

        output_context
            .write_header()
            .map_err(|error| TallyError::TranscodeError(error.to_string()))?;

        let mut copied: u64 = 0;
        for (stream, mut packet) in input_context.packets() {
            let input_index = stream.index();
            let Some(output_index) = stream_map.get(input_index).copied().flatten() else {
                continue;
            };

            let input_time_base = stream.time_base();
            let output_time_base = output_context
                .stream(output_index)
                .ok_or_else(|| {
                    TallyError::TranscodeError(format!(
                        "Output stream {output_index} disappeared during muxing"
                    ))
                })?
                .time_base();

            packet.set_stream(output_index);
            packet.rescale_ts(input_time_base, output_time_base);
            packet.set_position(-1);
            packet
                .write_interleaved(&mut output_context)
                .map_err(|error| TallyError::TranscodeError(error.to_string()))?;
            copied += 1;
        }

        output_context
            .write_trailer()
            .map_err(|error| TallyError::TranscodeError(error.to_string()))?;

        log::info!(
            "Wrapped {} packet(s) into {}",
            copied,
            self.output_path.display(),
        );

        Ok(())
    }
}

/// The `.mp4` sibling of an elementary-stream path, placed in `output_dir`.
///
/// `recordings/cam0.h264` with output directory `out/` becomes
/// `out/cam0.mp4`.
pub fn container_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
    input: P1,
    output_dir: P2,
) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.as_ref().join(format!("{stem}.mp4"))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::container_output_path;

    #[test]
    fn output_path_swaps_extension_and_directory() {
        let out = container_output_path(
            Path::new("recordings/cam0.h264"),
            Path::new("converted"),
        );
        assert_eq!(out, PathBuf::from("converted/cam0.mp4"));
    }
}
