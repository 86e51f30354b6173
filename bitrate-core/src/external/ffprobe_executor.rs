//! FFprobe integration for container and stream metadata.
//!
//! This module runs `ffprobe` with JSON output and turns the result into a
//! [`ProbeResult`]: the container duration plus ordered audio and video
//! stream descriptors. Any way in which ffprobe cannot give a usable answer
//! is reported as a [`ProbeFailure`], which callers treat as recoverable.

use crate::media::{StreamDescriptor, StreamKind, display_name};
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// Metadata extracted from a successful probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// Container duration in seconds
    pub duration_secs: f64,
    /// Audio streams in ascending index order
    pub audio_streams: Vec<StreamDescriptor>,
    /// Video streams in ascending index order
    pub video_streams: Vec<StreamDescriptor>,
}

/// Why a probe produced no usable metadata.
#[derive(Error, Debug)]
pub enum ProbeFailure {
    #[error("ffprobe could not be started: {0}")]
    Spawn(#[source] io::Error),

    #[error("ffprobe exited with {status}: {stderr}")]
    Status { status: ExitStatus, stderr: String },

    #[error("ffprobe output could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("ffprobe reported no usable container duration")]
    MissingDuration,
}

/// Trait for anything able to read container and stream metadata.
pub trait MediaProber {
    fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeFailure>;
}

impl<T: MediaProber + ?Sized> MediaProber for &T {
    fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeFailure> {
        (**self).probe(path)
    }
}

/// `MediaProber` backed by the `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: String,
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self {
            program: "ffprobe".to_string(),
        }
    }
}

impl FfprobeProber {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific ffprobe binary instead of the one on `PATH`.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MediaProber for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<ProbeResult, ProbeFailure> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null());

        log::debug!("Running ffprobe on: {}", path.display());

        let output = cmd.output().map_err(ProbeFailure::Spawn)?;
        if !output.status.success() {
            return Err(ProbeFailure::Status {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_ffprobe_json(&output.stdout)
    }
}

// ---- ffprobe JSON model ----

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    bit_rate: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

impl FfprobeStream {
    fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    fn reported_bitrate_kbps(&self) -> Option<f64> {
        self.bit_rate
            .as_deref()
            .and_then(|b| b.trim().parse::<f64>().ok())
            .filter(|bps| bps.is_finite() && *bps > 0.0)
            .map(|bps| bps / 1000.0)
    }

    fn into_descriptor(self, index: usize, kind: StreamKind) -> StreamDescriptor {
        let display_name = display_name(index, self.tag("title"), self.tag("language"));
        StreamDescriptor {
            index,
            kind,
            reported_bitrate_kbps: self.reported_bitrate_kbps(),
            codec_name: self.codec_name.unwrap_or_else(|| "unknown".to_string()),
            display_name,
        }
    }
}

/// Converts raw `ffprobe -print_format json` output into a [`ProbeResult`].
pub fn parse_ffprobe_json(json: &[u8]) -> Result<ProbeResult, ProbeFailure> {
    let output: FfprobeOutput = serde_json::from_slice(json)?;

    let duration_secs = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or(ProbeFailure::MissingDuration)?;

    let mut audio_streams = Vec::new();
    let mut video_streams = Vec::new();

    for stream in output.streams {
        match stream.codec_type.as_deref() {
            Some("audio") => {
                let index = audio_streams.len();
                audio_streams.push(stream.into_descriptor(index, StreamKind::Audio));
            }
            Some("video") => {
                let index = video_streams.len();
                video_streams.push(stream.into_descriptor(index, StreamKind::Video));
            }
            _ => {}
        }
    }

    Ok(ProbeResult {
        duration_secs,
        audio_streams,
        video_streams,
    })
}
