//! Lightweight audio duration reading.
//!
//! Used when ffprobe could not read a file at all: audio-only inputs are
//! measured directly, and decoded WAV extractions are timed when ffmpeg did
//! not log a duration of its own.

use crate::error::{CoreError, CoreResult, io_error};
use std::fs::File;
use std::path::Path;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Trait for anything able to report the playback duration of an audio file.
pub trait DurationReader {
    fn duration_secs(&self, path: &Path) -> CoreResult<f64>;
}

impl<T: DurationReader + ?Sized> DurationReader for &T {
    fn duration_secs(&self, path: &Path) -> CoreResult<f64> {
        (**self).duration_secs(path)
    }
}

/// `DurationReader` that demuxes the file with symphonia.
///
/// The duration is the frame count of the default track divided by its
/// time base (or sample rate when no time base is declared).
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDurationReader;

impl DurationReader for SymphoniaDurationReader {
    fn duration_secs(&self, path: &Path) -> CoreResult<f64> {
        let file = File::open(path).map_err(|e| io_error("opening", path, e))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                log::debug!("symphonia could not read {}: {}", path.display(), e);
                CoreError::DurationUnavailable(path.to_path_buf())
            })?;

        let track = probed
            .format
            .default_track()
            .ok_or_else(|| CoreError::DurationUnavailable(path.to_path_buf()))?;
        let params = &track.codec_params;

        let n_frames = params
            .n_frames
            .ok_or_else(|| CoreError::DurationUnavailable(path.to_path_buf()))?;

        let seconds = if let Some(time_base) = params.time_base {
            let time = time_base.calc_time(n_frames);
            time.seconds as f64 + time.frac
        } else if let Some(rate) = params.sample_rate.filter(|r| *r > 0) {
            n_frames as f64 / f64::from(rate)
        } else {
            return Err(CoreError::DurationUnavailable(path.to_path_buf()));
        };

        log::debug!("Duration of {}: {:.3}s", path.display(), seconds);
        Ok(seconds)
    }
}
