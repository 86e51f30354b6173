// ============================================================================
// bitrate-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Fatal Error Taxonomy for Bitrate Resolution
//
// This module defines the errors that abort a resolution run. Recoverable
// conditions (a probe that cannot parse the container, a copy extraction
// that must be retried as a transcode) are typed separately next to the
// component that produces them and never surface as a CoreError directly.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that end a resolution run.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No audio stream found in {}", .0.display())]
    NoAudioStream(PathBuf),

    #[error("Failed to extract audio stream {stream_index} (codec: {codec})")]
    ExtractionFailed { stream_index: usize, codec: String },

    #[error("{}", empty_extraction_message(.stream_index))]
    EmptyExtraction { stream_index: Option<usize> },

    #[error("I/O error while {operation} '{}': {source}", .path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for command '{0}': {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("Command '{command}' failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Could not determine the duration of {}", .0.display())]
    DurationUnavailable(PathBuf),

    #[error("Invalid media duration: {0} seconds")]
    InvalidDuration(f64),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for bitrate-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

fn empty_extraction_message(stream_index: &Option<usize>) -> String {
    match stream_index {
        Some(index) => format!("Extraction of audio stream {index} produced an empty file"),
        None => "Audio extraction produced an empty file".to_string(),
    }
}

/// Wraps an I/O error with the operation and the path it touched.
pub fn io_error(operation: impl Into<String>, path: &Path, source: io::Error) -> CoreError {
    CoreError::Io {
        operation: operation.into(),
        path: path.to_path_buf(),
        source,
    }
}

pub fn command_start_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), source)
}

pub fn command_wait_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), source)
}

pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}
