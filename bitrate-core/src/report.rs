//! Resolution results.
//!
//! A [`BitrateReport`] serialises to the mapping handed to front ends:
//! `{"audio": [{"name": ..., "bitrate": ...}], "video": ...}`, with the
//! `video` key omitted for audio files.

use crate::media::StreamDescriptor;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// An audio track together with its final bitrate.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTrack {
    /// `None` for the single track measured by the full fallback.
    pub descriptor: Option<StreamDescriptor>,
    pub name: String,
    pub bitrate_kbps: f64,
}

impl ResolvedTrack {
    /// Track whose bitrate came from container metadata or a measurement of
    /// a probed stream.
    #[must_use]
    pub fn from_stream(descriptor: StreamDescriptor, bitrate_kbps: f64) -> Self {
        Self {
            name: descriptor.display_name.clone(),
            descriptor: Some(descriptor),
            bitrate_kbps,
        }
    }

    /// Track measured without any stream metadata.
    #[must_use]
    pub fn unprobed(name: impl Into<String>, bitrate_kbps: f64) -> Self {
        Self {
            descriptor: None,
            name: name.into(),
            bitrate_kbps,
        }
    }

    /// Human-readable label, e.g. `Audio 1 (ENG)` or `Audio Track`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.descriptor.is_none() {
            self.name.clone()
        } else {
            format!("Audio {}", self.name)
        }
    }
}

impl Serialize for ResolvedTrack {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResolvedTrack", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("bitrate", &self.bitrate_kbps)?;
        state.end()
    }
}

/// Audio tracks in stream order plus the video bitrate for video files.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BitrateReport {
    pub audio: Vec<ResolvedTrack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<f64>,
}

impl BitrateReport {
    /// One `"<label> bitrate: <value> kbps"` line per track, video last.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .audio
            .iter()
            .map(|track| format!("{} bitrate: {} kbps", track.label(), track.bitrate_kbps))
            .collect();

        if let Some(video) = self.video {
            lines.push(format!("Video bitrate: {video} kbps"));
        }
        lines
    }
}
