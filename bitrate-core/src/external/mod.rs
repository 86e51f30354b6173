// ============================================================================
// bitrate-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffprobe, ffmpeg and Audio Demuxers
//
// This module encapsulates everything that reaches outside the process:
// probing container metadata, extracting tracks with ffmpeg and reading
// audio durations. Each concern sits behind a trait so the resolver can be
// driven by fakes in tests.
//
// KEY COMPONENTS:
// - MediaProber / FfprobeProber: container and stream metadata
// - FfmpegSpawner / SidecarSpawner: ffmpeg process execution
// - TrackExtractor / FfmpegExtractor: copy, transcode and full-audio extraction
// - DurationReader / SymphoniaDurationReader: audio-only duration reading

use crate::error::{CoreError, CoreResult};
use std::io;
use std::process::{Command, Stdio};

pub mod duration;
pub mod extractor;
pub mod ffmpeg_executor;
pub mod ffprobe_executor;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

pub use duration::{DurationReader, SymphoniaDurationReader};
pub use extractor::{ExtractFailure, FfmpegExtractor, TrackExtractor, extension_for_codec};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{FfprobeProber, MediaProber, ProbeFailure, ProbeResult};

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` and only looks at whether it could be started.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::OperationFailed(format!(
                "required tool '{cmd_name}' was not found on PATH"
            )))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency() {
        let result = check_dependency("surely-no-such-tool-exists-here");
        assert!(matches!(result, Err(CoreError::OperationFailed(_))));
    }
}
