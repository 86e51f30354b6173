// ============================================================================
// bitrate-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Running Track Extractions Through ffmpeg-sidecar
//
// FfmpegExtractor never starts ffmpeg itself. It hands a finished
// FfmpegCommand to an FfmpegSpawner and reads back the event stream and the
// exit status, so unit tests can substitute MockFfmpegSpawner and check the
// exact arguments an extraction would run.
//
// KEY COMPONENTS:
// - FfmpegProcess: a running extraction (event stream + exit status)
// - FfmpegSpawner: starts an extraction command
// - SidecarSpawner / SidecarProcess: the ffmpeg-sidecar backed pair

use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::process::ExitStatus;

/// A started ffmpeg extraction.
pub trait FfmpegProcess {
    /// Feeds every parsed ffmpeg event (log lines, durations, errors) to
    /// `handler` until the process closes its output or `handler` fails.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    /// Blocks until ffmpeg exits. A non-zero status is returned, not an error.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Starts extraction commands.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

/// An extraction running as a real ffmpeg child process.
pub struct SidecarProcess(FfmpegChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let events = self.0.iter().map_err(|e| {
            log::error!("Could not read ffmpeg output: {}", e);
            command_failed_error("ffmpeg (event stream)", ExitStatus::default(), e.to_string())
        })?;
        events.into_iter().try_for_each(&mut handler)
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// Spawns the `ffmpeg` found by ffmpeg-sidecar (normally the one on `PATH`).
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}
