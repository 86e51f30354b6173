//! Core library for estimating audio and video bitrates of media files.
//!
//! Bitrates are taken from container metadata (via ffprobe) when it is
//! available. Audio tracks without a reported bitrate are extracted with
//! ffmpeg and measured by file size over duration, and the video bitrate of
//! a video file is derived by subtracting audio from the container size.
//! When ffprobe cannot read the file at all, a single decoded audio track is
//! measured instead.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use bitrate_core::{DefaultResolver, ResolverConfigBuilder};
//! use std::path::Path;
//!
//! let config = ResolverConfigBuilder::new()
//!     .temp_dir("/tmp")
//!     .temp_base("bitrate_run")
//!     .build();
//!
//! let report = DefaultResolver::with_defaults(config)
//!     .resolve(Path::new("/path/to/movie.mkv"))
//!     .unwrap();
//!
//! for line in report.lines() {
//!     println!("{line}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod media;
pub mod report;
pub mod resolver;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{PcmFormat, ResolverConfig, ResolverConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use external::{
    DurationReader, ExtractFailure, FfmpegExtractor, FfprobeProber, MediaProber, ProbeFailure,
    ProbeResult, SymphoniaDurationReader, TrackExtractor, check_dependency,
};
pub use media::{MediaFile, MediaKind, StreamDescriptor, StreamKind, infer_media_kind};
pub use report::{BitrateReport, ResolvedTrack};
pub use resolver::{BitrateResolver, DefaultResolver, calculate_bitrate};
pub use temp_files::TempArtifacts;
