// ============================================================================
// bitrate-core/src/media/stream.rs
// ============================================================================
//
// STREAM DESCRIPTORS: Elementary Streams Found by the Prober
//
// One StreamDescriptor exists per audio or video stream. The index is the
// ordinal among streams of the same kind (0-based), which is also what the
// extractor maps with `0:a:<index>`. Display names are derived from tags.

/// Kind of elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Audio,
    Video,
}

/// An audio or video stream reported by the prober.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    pub index: usize,
    pub kind: StreamKind,
    pub codec_name: String,
    pub display_name: String,
    /// Present only when the container metadata carried a bit rate.
    pub reported_bitrate_kbps: Option<f64>,
}

/// Builds the display name of a stream from its tags.
///
/// An explicit title wins. Otherwise a language tag is appended to the
/// 1-based track number, upper-cased when it is a three-letter code
/// (`"2 (ENG)"`) and kept as-is otherwise (`"2 (en-US)"`). Without tags the
/// bare number is used.
#[must_use]
pub fn display_name(index: usize, title: Option<&str>, language: Option<&str>) -> String {
    let number = index + 1;

    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }

    match language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(lang) if lang.len() == 3 && lang.chars().all(|c| c.is_ascii_alphabetic()) => {
            format!("{number} ({})", lang.to_ascii_uppercase())
        }
        Some(lang) => format!("{number} ({lang})"),
        None => number.to_string(),
    }
}
