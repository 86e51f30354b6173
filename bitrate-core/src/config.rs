//! Configuration structures and constants for the bitrate-core library.
//!
//! The resolver needs very little configuration: where temporary track
//! extractions are written, the base name they share, and the PCM format used
//! whenever audio has to be decoded instead of copied.

use std::path::{Path, PathBuf};

/// Sample rate used for transcode and full-fallback extractions.
pub const DEFAULT_PCM_SAMPLE_RATE: u32 = 44_100;

/// Bit depth used for transcode and full-fallback extractions.
pub const DEFAULT_PCM_BIT_DEPTH: u16 = 16;

/// Label given to the single track measured by the full fallback.
pub const FALLBACK_TRACK_LABEL: &str = "Audio Track";

/// Raw PCM format targeted when a stream has to be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub bit_depth: u16,
}

impl PcmFormat {
    /// Little-endian signed PCM codec name understood by ffmpeg.
    #[must_use]
    pub fn codec_name(&self) -> &'static str {
        match self.bit_depth {
            24 => "pcm_s24le",
            32 => "pcm_s32le",
            _ => "pcm_s16le",
        }
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_PCM_SAMPLE_RATE,
            bit_depth: DEFAULT_PCM_BIT_DEPTH,
        }
    }
}

/// Configuration for one [`BitrateResolver`](crate::BitrateResolver).
///
/// Temporary files are named `<temp_base>_<index>.<ext>` inside `temp_dir`.
/// Two resolutions running at the same time must not share a `temp_base`
/// in the same directory.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Directory receiving temporary extractions
    pub temp_dir: PathBuf,

    /// Base name shared by every temporary file of a run
    pub temp_base: String,

    /// Target format for decoded audio
    pub pcm_format: PcmFormat,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            temp_base: default_temp_base(),
            pcm_format: PcmFormat::default(),
        }
    }
}

impl ResolverConfig {
    /// Path for a stream-copy extraction of `stream_index`.
    #[must_use]
    pub fn track_path(&self, stream_index: usize, extension: &str) -> PathBuf {
        self.temp_dir
            .join(format!("{}_{stream_index}.{extension}", self.temp_base))
    }

    /// Path for a transcoded extraction of `stream_index`.
    #[must_use]
    pub fn transcode_path(&self, stream_index: usize) -> PathBuf {
        self.temp_dir
            .join(format!("{}_{stream_index}_pcm.wav", self.temp_base))
    }

    /// Path for the whole-file audio extraction of the full fallback.
    #[must_use]
    pub fn full_audio_path(&self) -> PathBuf {
        self.temp_dir.join(format!("{}.wav", self.temp_base))
    }
}

fn default_temp_base() -> String {
    format!("bitrate_calc_{}", std::process::id())
}

/// Builder for creating ResolverConfig instances.
///
/// # Examples
///
/// ```rust
/// use bitrate_core::config::ResolverConfigBuilder;
///
/// let config = ResolverConfigBuilder::new()
///     .temp_dir("/tmp")
///     .temp_base("movie_run")
///     .pcm_sample_rate(48_000)
///     .build();
///
/// assert_eq!(config.temp_base, "movie_run");
/// assert_eq!(config.pcm_format.sample_rate, 48_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResolverConfigBuilder {
    temp_dir: Option<PathBuf>,
    temp_base: Option<String>,
    pcm_format: PcmFormat,
}

impl ResolverConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn temp_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.temp_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn temp_base(mut self, base: impl Into<String>) -> Self {
        self.temp_base = Some(base.into());
        self
    }

    #[must_use]
    pub fn pcm_sample_rate(mut self, sample_rate: u32) -> Self {
        self.pcm_format.sample_rate = sample_rate;
        self
    }

    #[must_use]
    pub fn pcm_bit_depth(mut self, bit_depth: u16) -> Self {
        self.pcm_format.bit_depth = bit_depth;
        self
    }

    #[must_use]
    pub fn build(self) -> ResolverConfig {
        ResolverConfig {
            temp_dir: self.temp_dir.unwrap_or_else(std::env::temp_dir),
            temp_base: self
                .temp_base
                .filter(|base| !base.trim().is_empty())
                .unwrap_or_else(default_temp_base),
            pcm_format: self.pcm_format,
        }
    }
}
