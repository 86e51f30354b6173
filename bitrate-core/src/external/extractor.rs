// ============================================================================
// bitrate-core/src/external/extractor.rs
// ============================================================================
//
// TRACK EXTRACTION: Writing Single Audio Tracks to Temporary Files
//
// The resolver measures an audio track by writing just that track to disk
// and looking at its size. Three extraction modes exist:
//
// - copy:       demux the stream without re-encoding (byte-exact)
// - transcode:  decode the stream to raw PCM when copying is impossible
// - full audio: decode the first audio track of a file the prober could
//               not read at all, reporting the duration ffmpeg saw
//
// Failures are returned as ExtractFailure values; the resolver decides
// whether to retry with the next mode or give up.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarSpawner};
use crate::config::PcmFormat;
use crate::error::CoreError;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::path::Path;
use std::process::ExitStatus;
use thiserror::Error;

/// Extension used when a codec has no entry in [`extension_for_codec`].
pub const RAW_AUDIO_EXTENSION: &str = "wav";

/// Returns the file extension a stream-copied track of `codec` is written with.
///
/// The extension only selects ffmpeg's output muxer; it has no effect on the
/// measured bitrate. Unknown codecs get a raw PCM container, which makes
/// the copy fail and the resolver fall through to a transcode.
#[must_use]
pub fn extension_for_codec(codec: &str) -> &'static str {
    let codec = codec.to_ascii_lowercase();
    match codec.as_str() {
        "aac" | "alac" => "m4a",
        "mp3" => "mp3",
        "mp2" => "mp2",
        "opus" => "opus",
        "vorbis" => "ogg",
        "flac" => "flac",
        "ac3" => "ac3",
        "eac3" => "eac3",
        "dts" => "dts",
        "truehd" => "thd",
        "wmav2" => "wma",
        c if c.starts_with("pcm_") => "wav",
        _ => RAW_AUDIO_EXTENSION,
    }
}

/// Why an extraction attempt did not produce a track.
#[derive(Error, Debug)]
pub enum ExtractFailure {
    #[error("ffmpeg could not be run: {0}")]
    Tool(#[from] CoreError),

    #[error("ffmpeg exited with {status}{}", format_stderr(.stderr))]
    Exit { status: ExitStatus, stderr: String },
}

fn format_stderr(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", stderr.trim())
    }
}

/// Trait for anything able to write single audio tracks to files.
pub trait TrackExtractor {
    /// Copies audio stream `stream_index` into `output` without re-encoding.
    fn extract_copy(&self, input: &Path, stream_index: usize, output: &Path)
    -> Result<(), ExtractFailure>;

    /// Decodes audio stream `stream_index` into raw PCM at `output`.
    fn extract_transcode(
        &self,
        input: &Path,
        stream_index: usize,
        format: &PcmFormat,
        output: &Path,
    ) -> Result<(), ExtractFailure>;

    /// Decodes the first audio track of `input` into raw PCM at `output`.
    ///
    /// Returns the input duration in seconds when the tool reported one.
    fn extract_full_audio(
        &self,
        input: &Path,
        format: &PcmFormat,
        output: &Path,
    ) -> Result<Option<f64>, ExtractFailure>;
}

impl<T: TrackExtractor + ?Sized> TrackExtractor for &T {
    fn extract_copy(
        &self,
        input: &Path,
        stream_index: usize,
        output: &Path,
    ) -> Result<(), ExtractFailure> {
        (**self).extract_copy(input, stream_index, output)
    }

    fn extract_transcode(
        &self,
        input: &Path,
        stream_index: usize,
        format: &PcmFormat,
        output: &Path,
    ) -> Result<(), ExtractFailure> {
        (**self).extract_transcode(input, stream_index, format, output)
    }

    fn extract_full_audio(
        &self,
        input: &Path,
        format: &PcmFormat,
        output: &Path,
    ) -> Result<Option<f64>, ExtractFailure> {
        (**self).extract_full_audio(input, format, output)
    }
}

/// `TrackExtractor` driving ffmpeg through an [`FfmpegSpawner`].
#[derive(Debug, Clone, Default)]
pub struct FfmpegExtractor<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
}

impl<S: FfmpegSpawner> FfmpegExtractor<S> {
    pub fn new(spawner: S) -> Self {
        Self { spawner }
    }

    /// Runs a prepared command to completion.
    ///
    /// Returns the first input duration ffmpeg logged, if any.
    fn run(&self, cmd: FfmpegCommand, operation: &str) -> Result<Option<f64>, ExtractFailure> {
        log::debug!("Running {} command: {:?}", operation, cmd);

        let mut process = self.spawner.spawn(cmd)?;
        let mut duration = None;
        let mut stderr = String::new();

        process.handle_events(|event| {
            match event {
                FfmpegEvent::ParsedDuration(parsed) => {
                    duration.get_or_insert(parsed.duration);
                }
                FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, message)
                | FfmpegEvent::Error(message) => {
                    stderr.push_str(&message);
                    stderr.push('\n');
                }
                _ => {}
            }
            Ok(())
        })?;

        let status = process.wait()?;
        if !status.success() {
            log::debug!("{} failed with {}: {}", operation, status, stderr.trim());
            return Err(ExtractFailure::Exit { status, stderr });
        }

        Ok(duration)
    }
}

fn base_command(input: &Path, map: String) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.input(input.to_string_lossy().as_ref());
    cmd.arg("-map");
    cmd.arg(map);
    cmd.arg("-vn"); // No video
    cmd.arg("-sn"); // No subtitles
    cmd.arg("-dn"); // No data streams
    cmd
}

fn add_pcm_output(cmd: &mut FfmpegCommand, format: &PcmFormat, output: &Path) {
    cmd.arg("-c:a");
    cmd.arg(format.codec_name());
    cmd.arg("-ar");
    cmd.arg(format.sample_rate.to_string());
    cmd.arg("-y");
    cmd.output(output.to_string_lossy().as_ref());
}

impl<S: FfmpegSpawner> TrackExtractor for FfmpegExtractor<S> {
    fn extract_copy(
        &self,
        input: &Path,
        stream_index: usize,
        output: &Path,
    ) -> Result<(), ExtractFailure> {
        let mut cmd = base_command(input, format!("0:a:{stream_index}"));
        cmd.arg("-c:a");
        cmd.arg("copy");
        cmd.arg("-y");
        cmd.output(output.to_string_lossy().as_ref());

        self.run(cmd, "stream copy").map(|_| ())
    }

    fn extract_transcode(
        &self,
        input: &Path,
        stream_index: usize,
        format: &PcmFormat,
        output: &Path,
    ) -> Result<(), ExtractFailure> {
        let mut cmd = base_command(input, format!("0:a:{stream_index}"));
        add_pcm_output(&mut cmd, format, output);

        self.run(cmd, "transcode").map(|_| ())
    }

    fn extract_full_audio(
        &self,
        input: &Path,
        format: &PcmFormat,
        output: &Path,
    ) -> Result<Option<f64>, ExtractFailure> {
        let mut cmd = base_command(input, "0:a:0".to_string());
        add_pcm_output(&mut cmd, format, output);

        self.run(cmd, "full audio extraction")
    }
}
