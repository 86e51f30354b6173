// bitrate-core/tests/resolver_tests.rs
//
// Drives BitrateResolver end to end with fake prober / extractor / duration
// reader implementations. Extraction fakes write real files into a temporary
// directory so sizes, measurement and cleanup behave as they would with ffmpeg.

use bitrate_core::{
    BitrateResolver, CoreError, CoreResult, DurationReader, ExtractFailure, MediaProber,
    PcmFormat, ProbeFailure, ProbeResult, ResolverConfig, ResolverConfigBuilder,
    StreamDescriptor, StreamKind, TrackExtractor,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tempfile::{TempDir, tempdir};

// --- Fakes ---

struct FakeProber {
    result: Option<ProbeResult>,
    calls: Cell<usize>,
}

impl FakeProber {
    fn returning(result: ProbeResult) -> Self {
        Self {
            result: Some(result),
            calls: Cell::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            result: None,
            calls: Cell::new(0),
        }
    }
}

impl MediaProber for FakeProber {
    fn probe(&self, _path: &Path) -> Result<ProbeResult, ProbeFailure> {
        self.calls.set(self.calls.get() + 1);
        self.result.clone().ok_or(ProbeFailure::MissingDuration)
    }
}

#[derive(Clone, Copy)]
enum Outcome {
    /// Writes this many bytes and succeeds.
    Write(usize),
    /// Writes this many bytes, then reports failure.
    FailAfter(usize),
}

#[derive(Default)]
struct FakeExtractor {
    copy: HashMap<usize, Outcome>,
    transcode: HashMap<usize, Outcome>,
    full: Option<(Outcome, Option<f64>)>,
    calls: RefCell<Vec<String>>,
}

impl FakeExtractor {
    fn copy(mut self, index: usize, outcome: Outcome) -> Self {
        self.copy.insert(index, outcome);
        self
    }

    fn transcode(mut self, index: usize, outcome: Outcome) -> Self {
        self.transcode.insert(index, outcome);
        self
    }

    fn full(mut self, outcome: Outcome, duration: Option<f64>) -> Self {
        self.full = Some((outcome, duration));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

fn apply(outcome: Option<Outcome>, output: &Path) -> Result<(), ExtractFailure> {
    let failure = || ExtractFailure::Exit {
        status: ExitStatus::default(),
        stderr: "simulated failure".to_string(),
    };
    match outcome {
        Some(Outcome::Write(bytes)) => {
            std::fs::write(output, vec![7u8; bytes]).unwrap();
            Ok(())
        }
        Some(Outcome::FailAfter(bytes)) => {
            std::fs::write(output, vec![7u8; bytes]).unwrap();
            Err(failure())
        }
        None => Err(failure()),
    }
}

impl TrackExtractor for FakeExtractor {
    fn extract_copy(
        &self,
        _input: &Path,
        stream_index: usize,
        output: &Path,
    ) -> Result<(), ExtractFailure> {
        self.calls.borrow_mut().push(format!("copy:{stream_index}"));
        apply(self.copy.get(&stream_index).copied(), output)
    }

    fn extract_transcode(
        &self,
        _input: &Path,
        stream_index: usize,
        format: &PcmFormat,
        output: &Path,
    ) -> Result<(), ExtractFailure> {
        assert_eq!(format.sample_rate, 44_100);
        assert_eq!(format.bit_depth, 16);
        self.calls.borrow_mut().push(format!("transcode:{stream_index}"));
        apply(self.transcode.get(&stream_index).copied(), output)
    }

    fn extract_full_audio(
        &self,
        _input: &Path,
        _format: &PcmFormat,
        output: &Path,
    ) -> Result<Option<f64>, ExtractFailure> {
        self.calls.borrow_mut().push("full".to_string());
        let (outcome, duration) = match self.full {
            Some((outcome, duration)) => (Some(outcome), duration),
            None => (None, None),
        };
        apply(outcome, output).map(|()| duration)
    }
}

struct FixedDuration(Option<f64>);

impl DurationReader for FixedDuration {
    fn duration_secs(&self, path: &Path) -> CoreResult<f64> {
        self.0
            .ok_or_else(|| CoreError::DurationUnavailable(path.to_path_buf()))
    }
}

// --- Helpers ---

struct Fixture {
    input_dir: TempDir,
    temp_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            input_dir: tempdir().unwrap(),
            temp_dir: tempdir().unwrap(),
        }
    }

    fn config(&self) -> ResolverConfig {
        ResolverConfigBuilder::new()
            .temp_dir(self.temp_dir.path())
            .temp_base("track")
            .build()
    }

    /// Creates an input file of exactly `bytes` bytes.
    fn input(&self, name: &str, bytes: usize) -> PathBuf {
        let path = self.input_dir.path().join(name);
        std::fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    fn leftover_temp_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

fn audio(index: usize, codec: &str, reported: Option<f64>) -> StreamDescriptor {
    StreamDescriptor {
        index,
        kind: StreamKind::Audio,
        codec_name: codec.to_string(),
        display_name: (index + 1).to_string(),
        reported_bitrate_kbps: reported,
    }
}

fn video(reported: Option<f64>) -> StreamDescriptor {
    StreamDescriptor {
        index: 0,
        kind: StreamKind::Video,
        codec_name: "h264".to_string(),
        display_name: "1".to_string(),
        reported_bitrate_kbps: reported,
    }
}

fn probe(
    duration_secs: f64,
    audio_streams: Vec<StreamDescriptor>,
    video_streams: Vec<StreamDescriptor>,
) -> ProbeResult {
    ProbeResult {
        duration_secs,
        audio_streams,
        video_streams,
    }
}

// --- Fast path ---

#[test]
fn test_fast_path_uses_reported_values() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 1_000);
    let extractor = FakeExtractor::default();
    let prober = FakeProber::returning(probe(
        10.0,
        vec![audio(0, "aac", Some(128.0))],
        vec![video(Some(1000.0))],
    ));
    let resolver = BitrateResolver::new(
        prober,
        extractor,
        FixedDuration(None),
        fx.config(),
    );

    let report = resolver.resolve(&input)?;

    assert_eq!(
        serde_json::to_value(&report)?,
        serde_json::json!({ "audio": [{ "name": "1", "bitrate": 128.0 }], "video": 1000.0 })
    );
    assert!(fx.leftover_temp_files().is_empty());
    Ok(())
}

#[test]
fn test_fast_path_keeps_values_unrounded() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    let input = fx.input("song.mp3", 500);
    let extractor = FakeExtractor::default();
    let prober = FakeProber::returning(probe(3.0, vec![audio(0, "mp3", Some(127.999_7))], vec![]));
    let resolver = BitrateResolver::new(prober, extractor, FixedDuration(None), fx.config());

    let report = resolver.resolve(&input)?;

    assert_eq!(report.audio[0].bitrate_kbps, 127.999_7);
    assert_eq!(report.video, None);
    assert!(fx.leftover_temp_files().is_empty());
    Ok(())
}

#[test]
fn test_audio_file_ignores_video_streams() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    // Cover art shows up as a video stream in many audio files.
    let input = fx.input("album.flac", 500);
    let prober = FakeProber::returning(probe(
        3.0,
        vec![audio(0, "flac", Some(900.0))],
        vec![video(None)],
    ));
    let resolver = BitrateResolver::new(
        prober,
        FakeExtractor::default(),
        FixedDuration(None),
        fx.config(),
    );

    let report = resolver.resolve(&input)?;

    assert_eq!(report.video, None);
    assert!(serde_json::to_value(&report)?.get("video").is_none());
    Ok(())
}

// --- Partial fallback ---

#[test]
fn test_measures_unreported_audio() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 2_000_000);
    let prober = FakeProber::returning(probe(
        10.0,
        vec![audio(0, "aac", None)],
        vec![video(Some(1000.0))],
    ));
    let resolver = BitrateResolver::new(
        prober,
        FakeExtractor::default().copy(0, Outcome::Write(160_000)),
        FixedDuration(None),
        fx.config(),
    );

    let report = resolver.resolve(&input)?;

    assert_eq!(report.audio.len(), 1);
    assert_eq!(report.audio[0].bitrate_kbps, 128.0);
    // Reported video bitrate is kept as-is.
    assert_eq!(report.video, Some(1000.0));
    assert!(fx.leftover_temp_files().is_empty());
    Ok(())
}

#[test]
fn test_video_bitrate_derived_by_subtraction() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    // (1_410_000 - 160_000) bytes * 8 / 10 s / 1000 = 1000 kbps
    let input = fx.input("movie.mp4", 1_410_000);
    let prober = FakeProber::returning(probe(10.0, vec![audio(0, "aac", None)], vec![video(None)]));
    let resolver = BitrateResolver::new(
        prober,
        FakeExtractor::default().copy(0, Outcome::Write(160_000)),
        FixedDuration(None),
        fx.config(),
    );

    let report = resolver.resolve(&input)?;

    assert_eq!(report.audio[0].bitrate_kbps, 128.0);
    assert_eq!(report.video, Some(1000.0));
    Ok(())
}

#[test]
fn test_reported_tracks_count_toward_subtraction() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    // Track 0 reports 64 kbps -> implied 80_000 bytes over 10 s.
    // Track 1 is measured at 160_000 bytes.
    // (1_490_000 - 240_000) * 8 / 10 / 1000 = 1000 kbps
    let input = fx.input("movie.mkv", 1_490_000);
    let prober = FakeProber::returning(probe(
        10.0,
        vec![audio(0, "opus", Some(64.0)), audio(1, "aac", None)],
        vec![video(None)],
    ));
    let extractor = FakeExtractor::default().copy(1, Outcome::Write(160_000));
    let resolver = BitrateResolver::new(prober, extractor, FixedDuration(None), fx.config());

    let report = resolver.resolve(&input)?;

    assert_eq!(report.audio[0].bitrate_kbps, 64.0);
    assert_eq!(report.audio[1].bitrate_kbps, 128.0);
    assert_eq!(report.video, Some(1000.0));
    Ok(())
}

#[test]
fn test_reported_audio_with_unreported_video() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 1_410_000);
    let prober = FakeProber::returning(probe(
        10.0,
        vec![audio(0, "aac", Some(128.0))],
        vec![video(None)],
    ));
    let resolver = BitrateResolver::new(
        prober,
        FakeExtractor::default(),
        FixedDuration(None),
        fx.config(),
    );

    let report = resolver.resolve(&input)?;

    assert_eq!(report.video, Some(1000.0));
    Ok(())
}

#[test]
fn test_tracks_keep_stream_order() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 3_000_000);
    let prober = FakeProber::returning(probe(
        10.0,
        vec![
            audio(0, "ac3", Some(448.0)),
            audio(1, "aac", None),
            audio(2, "opus", Some(96.0)),
            audio(3, "flac", None),
        ],
        vec![video(Some(2000.0))],
    ));
    let extractor = FakeExtractor::default()
        .copy(1, Outcome::Write(160_000))
        .copy(3, Outcome::Write(1_000_000));
    let resolver = BitrateResolver::new(prober, extractor, FixedDuration(None), fx.config());

    let report = resolver.resolve(&input)?;

    let names: Vec<&str> = report.audio.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["1", "2", "3", "4"]);
    let bitrates: Vec<f64> = report.audio.iter().map(|t| t.bitrate_kbps).collect();
    assert_eq!(bitrates, vec![448.0, 128.0, 96.0, 800.0]);
    Ok(())
}

#[test]
fn test_copy_failure_falls_back_to_transcode() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 5_000_000);
    let prober = FakeProber::returning(probe(
        10.0,
        vec![audio(0, "weird_codec", None)],
        vec![video(None)],
    ));
    let extractor = FakeExtractor::default()
        .copy(0, Outcome::FailAfter(10))
        .transcode(0, Outcome::Write(1_764_000));
    let resolver = BitrateResolver::new(prober, extractor, FixedDuration(None), fx.config());

    let report = resolver.resolve(&input)?;

    // 1_764_000 * 8 / 10 / 1000
    assert_eq!(report.audio[0].bitrate_kbps, 1411.2);
    assert!(fx.leftover_temp_files().is_empty());
    Ok(())
}

#[test]
fn test_extraction_failed_when_copy_and_transcode_fail() {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 5_000_000);
    let prober = FakeProber::returning(probe(
        10.0,
        vec![audio(0, "aac", Some(128.0)), audio(1, "dts", None)],
        vec![video(None)],
    ));
    let extractor = FakeExtractor::default()
        .copy(1, Outcome::FailAfter(100))
        .transcode(1, Outcome::FailAfter(100));
    let resolver = BitrateResolver::new(prober, extractor, FixedDuration(None), fx.config());

    let result = resolver.resolve(&input);

    match result {
        Err(CoreError::ExtractionFailed { stream_index, codec }) => {
            assert_eq!(stream_index, 1);
            assert_eq!(codec, "dts");
        }
        other => panic!("expected ExtractionFailed, got {other:?}"),
    }
    assert!(fx.leftover_temp_files().is_empty());
}

#[test]
fn test_empty_copy_is_an_empty_extraction() {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 5_000_000);
    let prober = FakeProber::returning(probe(10.0, vec![audio(0, "aac", None)], vec![video(None)]));
    let extractor = FakeExtractor::default().copy(0, Outcome::Write(0));
    let resolver = BitrateResolver::new(prober, extractor, FixedDuration(None), fx.config());

    let result = resolver.resolve(&input);

    assert!(matches!(
        result,
        Err(CoreError::EmptyExtraction {
            stream_index: Some(0)
        })
    ));
    assert!(fx.leftover_temp_files().is_empty());
}

#[test]
fn test_video_bitrate_never_negative() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    // Extracted audio is larger than the whole container.
    let input = fx.input("movie.mkv", 1_000);
    let prober = FakeProber::returning(probe(
        10.0,
        vec![audio(0, "flac", None)],
        vec![video(None)],
    ));
    let extractor = FakeExtractor::default().copy(0, Outcome::Write(5_000));
    let resolver = BitrateResolver::new(prober, extractor, FixedDuration(None), fx.config());

    let report = resolver.resolve(&input)?;

    assert_eq!(report.video, Some(0.0));
    Ok(())
}

// --- Full fallback ---

#[test]
fn test_unprobed_audio_file_measured_directly() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    let input = fx.input("song.mp3", 80_000);
    let extractor = FakeExtractor::default();
    let resolver = BitrateResolver::new(
        FakeProber::failing(),
        extractor,
        FixedDuration(Some(5.0)),
        fx.config(),
    );

    let report = resolver.resolve(&input)?;

    assert_eq!(
        serde_json::to_value(&report)?,
        serde_json::json!({ "audio": [{ "name": "Audio Track", "bitrate": 128.0 }] })
    );
    assert!(input.exists(), "the input file itself must never be deleted");
    Ok(())
}

#[test]
fn test_full_fallback_video_uses_extraction_duration() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 1_410_000);
    let extractor = FakeExtractor::default().full(Outcome::Write(160_000), Some(10.0));
    // The duration reader must not be consulted when ffmpeg reported one.
    let resolver = BitrateResolver::new(
        FakeProber::failing(),
        extractor,
        FixedDuration(Some(99.0)),
        fx.config(),
    );

    let report = resolver.resolve(&input)?;

    assert_eq!(report.audio.len(), 1);
    assert_eq!(report.audio[0].name, "Audio Track");
    assert_eq!(report.audio[0].bitrate_kbps, 128.0);
    assert_eq!(report.video, Some(1000.0));
    assert!(fx.leftover_temp_files().is_empty());
    Ok(())
}

#[test]
fn test_full_fallback_video_reads_duration_of_extraction() -> Result<(), Box<dyn Error>> {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 1_410_000);
    let extractor = FakeExtractor::default().full(Outcome::Write(160_000), None);
    let resolver = BitrateResolver::new(
        FakeProber::failing(),
        extractor,
        FixedDuration(Some(10.0)),
        fx.config(),
    );

    let report = resolver.resolve(&input)?;

    assert_eq!(report.audio[0].bitrate_kbps, 128.0);
    assert_eq!(report.video, Some(1000.0));
    Ok(())
}

#[test]
fn test_full_fallback_empty_extraction() {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 1_000);
    let extractor = FakeExtractor::default().full(Outcome::Write(0), Some(10.0));
    let resolver = BitrateResolver::new(
        FakeProber::failing(),
        extractor,
        FixedDuration(None),
        fx.config(),
    );

    assert!(matches!(
        resolver.resolve(&input),
        Err(CoreError::EmptyExtraction { stream_index: None })
    ));
    assert!(fx.leftover_temp_files().is_empty());
}

#[test]
fn test_full_fallback_extraction_failure_cleans_up() {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 1_000);
    let extractor = FakeExtractor::default().full(Outcome::FailAfter(64), None);
    let resolver = BitrateResolver::new(
        FakeProber::failing(),
        extractor,
        FixedDuration(None),
        fx.config(),
    );

    assert!(matches!(
        resolver.resolve(&input),
        Err(CoreError::OperationFailed(_))
    ));
    assert!(fx.leftover_temp_files().is_empty());
}

#[test]
fn test_full_fallback_rejects_zero_duration() {
    let fx = Fixture::new();
    let input = fx.input("song.ogg", 1_000);
    let resolver = BitrateResolver::new(
        FakeProber::failing(),
        FakeExtractor::default(),
        FixedDuration(Some(0.0)),
        fx.config(),
    );

    assert!(matches!(
        resolver.resolve(&input),
        Err(CoreError::InvalidDuration(_))
    ));
}

// --- Fatal errors ---

#[test]
fn test_missing_file() {
    let fx = Fixture::new();
    let prober = FakeProber::failing();
    let extractor = FakeExtractor::default();
    let missing = fx.input_dir.path().join("nope.mkv");
    let resolver = BitrateResolver::new(prober, extractor, FixedDuration(Some(1.0)), fx.config());

    assert!(matches!(
        resolver.resolve(&missing),
        Err(CoreError::FileNotFound(_))
    ));
    assert!(fx.leftover_temp_files().is_empty());
}

#[test]
fn test_nothing_attempted_for_missing_file() {
    let fx = Fixture::new();
    let prober = FakeProber::failing();
    let extractor = FakeExtractor::default();
    let missing = fx.input_dir.path().join("nope.mkv");

    let resolver = BitrateResolver::new(&prober, &extractor, FixedDuration(Some(1.0)), fx.config());
    let _ = resolver.resolve(&missing);

    assert_eq!(prober.calls.get(), 0);
    assert!(extractor.calls().is_empty());
}

#[test]
fn test_no_audio_stream() {
    let fx = Fixture::new();
    let input = fx.input("movie.mkv", 1_000);
    let prober = FakeProber::returning(probe(10.0, vec![], vec![video(Some(1000.0))]));
    let resolver = BitrateResolver::new(
        prober,
        FakeExtractor::default(),
        FixedDuration(None),
        fx.config(),
    );

    assert!(matches!(
        resolver.resolve(&input),
        Err(CoreError::NoAudioStream(_))
    ));
}

// --- Measurement ---

#[test]
fn test_measurement_matches_formula() -> Result<(), Box<dyn Error>> {
    for (bytes, duration) in [(160_000usize, 10.0f64), (12_345, 7.0), (999_999, 61.5), (1, 3.0)] {
        let fx = Fixture::new();
        let input = fx.input("movie.mkv", 10_000_000);
        let prober = FakeProber::returning(probe(
            duration,
            vec![audio(0, "aac", None)],
            vec![video(Some(1.0))],
        ));
        let extractor = FakeExtractor::default().copy(0, Outcome::Write(bytes));
        let resolver = BitrateResolver::new(prober, extractor, FixedDuration(None), fx.config());

        let report = resolver.resolve(&input)?;

        let expected = ((bytes as f64 * 8.0 / duration / 1000.0) * 100.0).round() / 100.0;
        assert_eq!(report.audio[0].bitrate_kbps, expected, "bytes={bytes} duration={duration}");
    }
    Ok(())
}
