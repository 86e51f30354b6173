//! Media file classification and stream descriptors.
//!
//! A [`MediaFile`] is the immutable view of the input for one resolution:
//! its path, whether it is treated as audio or video, and its size on disk.

mod stream;

pub use stream::{StreamDescriptor, StreamKind, display_name};

use crate::error::{CoreError, CoreResult};
use crate::utils::file_size;
use std::fmt;
use std::path::{Path, PathBuf};

/// Container kind, inferred from the declared media type of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    #[must_use]
    pub fn is_video(self) -> bool {
        self == MediaKind::Video
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Classifies a path as video when its guessed MIME type is `video/*`.
///
/// Anything else, including paths without a recognised extension, is
/// treated as audio.
#[must_use]
pub fn infer_media_kind(path: &Path) -> MediaKind {
    match mime_guess::from_path(path).first() {
        Some(mime) if mime.type_().as_str() == "video" => MediaKind::Video,
        _ => MediaKind::Audio,
    }
}

/// The input of one resolution run.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub size_bytes: u64,
}

impl MediaFile {
    /// Opens a media file, failing with `FileNotFound` when the path does
    /// not resolve to a regular file.
    pub fn open(path: &Path) -> CoreResult<Self> {
        if !path.is_file() {
            return Err(CoreError::FileNotFound(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            kind: infer_media_kind(path),
            size_bytes: file_size(path)?,
        })
    }
}
