//! Bitrate arithmetic and small file helpers.
//!
//! All bitrates are kilobits per second with a decimal kilo:
//! `bits / seconds / 1000`.

use crate::error::{CoreResult, io_error};
use std::path::Path;

/// Rounds to two decimal places.
#[must_use]
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Measured bitrate of `bytes` spread over `duration_secs`, rounded to 2 decimals.
#[must_use]
pub fn bitrate_kbps(bytes: f64, duration_secs: f64) -> f64 {
    round_to_hundredths(bytes * 8.0 / duration_secs / 1000.0)
}

/// Byte size a stream of `kbps` occupies over `duration_secs`.
#[must_use]
pub fn implied_bytes(kbps: f64, duration_secs: f64) -> f64 {
    kbps * 1000.0 * duration_secs / 8.0
}

/// Video bitrate obtained by removing the audio bytes from the container.
///
/// Never negative: when the audio accounts for the whole container (or
/// more) the result is exactly `0.0`.
#[must_use]
pub fn subtract_audio_bitrate(container_bytes: u64, audio_bytes: f64, duration_secs: f64) -> f64 {
    let video_bits = container_bytes as f64 * 8.0 - audio_bytes * 8.0;
    if video_bits > 0.0 {
        round_to_hundredths(video_bits / duration_secs / 1000.0)
    } else {
        0.0
    }
}

/// Size of a file in bytes.
pub fn file_size(path: &Path) -> CoreResult<u64> {
    Ok(std::fs::metadata(path)
        .map_err(|e| io_error("reading size of", path, e))?
        .len())
}
