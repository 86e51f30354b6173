// ============================================================================
// bitrate-core/src/resolver.rs
// ============================================================================
//
// BITRATE RESOLUTION: Layered Metadata / Extraction / Fallback Strategy
//
// resolve() walks a fixed sequence of tiers:
//
// 1. existence check             -> FileNotFound
// 2. audio/video classification  (MIME type of the path)
// 3. probe                       -> on failure, jump to the full fallback
// 4. fast path                   every needed bitrate reported by metadata
// 5. partial fallback            extract and measure unreported audio tracks,
//                                derive video by subtraction
// 6. full fallback               no metadata at all: measure one decoded
//                                audio track (or the audio file itself)
//
// Intermediate results travel in a ResolutionState moved from tier to tier.
// Every temporary file is owned by a TempArtifacts guard created for the
// run, so nothing survives resolve() whichever way it exits.

use crate::config::{FALLBACK_TRACK_LABEL, ResolverConfig};
use crate::error::{CoreError, CoreResult, io_error};
use crate::external::{
    DurationReader, FfmpegExtractor, FfprobeProber, MediaProber, ProbeResult, SidecarSpawner,
    SymphoniaDurationReader, TrackExtractor, extension_for_codec,
};
use crate::media::{MediaFile, MediaKind, StreamDescriptor};
use crate::report::{BitrateReport, ResolvedTrack};
use crate::temp_files::TempArtifacts;
use crate::utils::{bitrate_kbps, implied_bytes, subtract_audio_bitrate};
use std::io;
use std::path::Path;

/// Resolver wired to ffprobe, ffmpeg-sidecar and symphonia.
pub type DefaultResolver =
    BitrateResolver<FfprobeProber, FfmpegExtractor<SidecarSpawner>, SymphoniaDurationReader>;

/// Estimates audio and video bitrates of a media file.
#[derive(Debug, Clone)]
pub struct BitrateResolver<P, X, D> {
    prober: P,
    extractor: X,
    durations: D,
    config: ResolverConfig,
}

impl DefaultResolver {
    #[must_use]
    pub fn with_defaults(config: ResolverConfig) -> Self {
        Self::new(
            FfprobeProber::new(),
            FfmpegExtractor::new(SidecarSpawner),
            SymphoniaDurationReader,
            config,
        )
    }
}

/// Resolves `path` with the default tooling.
pub fn calculate_bitrate(path: &Path, config: ResolverConfig) -> CoreResult<BitrateReport> {
    DefaultResolver::with_defaults(config).resolve(path)
}

/// Partial results carried from one resolution tier to the next.
#[derive(Debug)]
struct ResolutionState {
    kind: MediaKind,
    container_bytes: u64,
    duration_secs: f64,
    audio: Vec<ResolvedTrack>,
    /// Measured or implied byte size of every audio track resolved so far.
    audio_bytes: f64,
    video_kbps: Option<f64>,
}

impl ResolutionState {
    fn new(media: &MediaFile, duration_secs: f64) -> Self {
        Self {
            kind: media.kind,
            container_bytes: media.size_bytes,
            duration_secs,
            audio: Vec::new(),
            audio_bytes: 0.0,
            video_kbps: None,
        }
    }

    fn with_reported_video(mut self, video_kbps: Option<f64>) -> Self {
        self.video_kbps = video_kbps;
        self
    }

    fn with_track(mut self, track: ResolvedTrack, bytes: f64) -> Self {
        self.audio.push(track);
        self.audio_bytes += bytes;
        self
    }

    /// Fills in the video bitrate by subtraction when metadata did not supply it.
    fn derive_video(mut self) -> Self {
        if self.kind.is_video() && self.video_kbps.is_none() {
            let video = subtract_audio_bitrate(
                self.container_bytes,
                self.audio_bytes,
                self.duration_secs,
            );
            log::debug!(
                "Derived video bitrate: ({} B container - {:.0} B audio) over {:.3}s = {} kbps",
                self.container_bytes,
                self.audio_bytes,
                self.duration_secs,
                video
            );
            self.video_kbps = Some(video);
        }
        self
    }

    fn into_report(self) -> BitrateReport {
        BitrateReport {
            audio: self.audio,
            video: if self.kind.is_video() {
                self.video_kbps
            } else {
                None
            },
        }
    }
}

impl<P, X, D> BitrateResolver<P, X, D>
where
    P: MediaProber,
    X: TrackExtractor,
    D: DurationReader,
{
    pub fn new(prober: P, extractor: X, durations: D, config: ResolverConfig) -> Self {
        Self {
            prober,
            extractor,
            durations,
            config,
        }
    }

    /// Resolves the bitrates of every audio track and, for video files, the
    /// video bitrate.
    pub fn resolve(&self, path: &Path) -> CoreResult<BitrateReport> {
        let media = MediaFile::open(path)?;
        log::info!(
            "Resolving bitrates for {} ({}, {} bytes)",
            media.path.display(),
            media.kind,
            media.size_bytes
        );

        let mut artifacts = TempArtifacts::new();
        let result = match self.prober.probe(&media.path) {
            Ok(probe) => self.resolve_probed(&media, probe, &mut artifacts),
            Err(failure) => {
                log::warn!(
                    "Could not probe {}: {}. Falling back to full extraction.",
                    media.path.display(),
                    failure
                );
                self.resolve_unprobed(&media, &mut artifacts)
            }
        };
        artifacts.release_all();

        result
    }

    fn resolve_probed(
        &self,
        media: &MediaFile,
        probe: ProbeResult,
        artifacts: &mut TempArtifacts,
    ) -> CoreResult<BitrateReport> {
        if probe.audio_streams.is_empty() {
            return Err(CoreError::NoAudioStream(media.path.clone()));
        }

        let reported_video = if media.kind.is_video() {
            probe
                .video_streams
                .first()
                .and_then(|stream| stream.reported_bitrate_kbps)
        } else {
            None
        };

        let state = ResolutionState::new(media, probe.duration_secs)
            .with_reported_video(reported_video);

        let all_audio_reported = probe
            .audio_streams
            .iter()
            .all(|stream| stream.reported_bitrate_kbps.is_some());
        if all_audio_reported && (!media.kind.is_video() || reported_video.is_some()) {
            log::info!("All bitrates reported by container metadata");
            return Ok(Self::take_reported(state, probe.audio_streams).into_report());
        }

        log::info!("Measuring tracks without reported bitrates");
        let state = self.measure_audio_tracks(media, state, probe.audio_streams, artifacts)?;
        Ok(state.derive_video().into_report())
    }

    /// Fast path: every value comes straight from metadata, untouched.
    fn take_reported(state: ResolutionState, streams: Vec<StreamDescriptor>) -> ResolutionState {
        streams.into_iter().fold(state, |state, stream| {
            let kbps = stream.reported_bitrate_kbps.unwrap_or_default();
            let bytes = implied_bytes(kbps, state.duration_secs);
            state.with_track(ResolvedTrack::from_stream(stream, kbps), bytes)
        })
    }

    fn measure_audio_tracks(
        &self,
        media: &MediaFile,
        state: ResolutionState,
        streams: Vec<StreamDescriptor>,
        artifacts: &mut TempArtifacts,
    ) -> CoreResult<ResolutionState> {
        streams.into_iter().try_fold(state, |state, stream| {
            if let Some(kbps) = stream.reported_bitrate_kbps {
                let bytes = implied_bytes(kbps, state.duration_secs);
                return Ok(state.with_track(ResolvedTrack::from_stream(stream, kbps), bytes));
            }

            let bytes = self.extract_track(&media.path, &stream, artifacts)?;
            let kbps = bitrate_kbps(bytes as f64, state.duration_secs);
            log::debug!(
                "Audio stream {} ({}): {} bytes over {:.3}s = {} kbps",
                stream.index,
                stream.codec_name,
                bytes,
                state.duration_secs,
                kbps
            );
            Ok(state.with_track(ResolvedTrack::from_stream(stream, kbps), bytes as f64))
        })
    }

    /// Writes one audio stream to a temporary file and returns its size.
    ///
    /// A stream copy is tried first; if it fails the stream is transcoded to
    /// PCM. Only when both fail does the whole resolution fail.
    fn extract_track(
        &self,
        input: &Path,
        stream: &StreamDescriptor,
        artifacts: &mut TempArtifacts,
    ) -> CoreResult<u64> {
        let extension = extension_for_codec(&stream.codec_name);
        let copy_path = artifacts.register(self.config.track_path(stream.index, extension));

        let produced = match self.extractor.extract_copy(input, stream.index, &copy_path) {
            Ok(()) => copy_path,
            Err(copy_failure) => {
                log::warn!(
                    "Stream copy of audio stream {} ({}) failed: {}. Transcoding to PCM instead.",
                    stream.index,
                    stream.codec_name,
                    copy_failure
                );
                let pcm_path = artifacts.register(self.config.transcode_path(stream.index));
                if let Err(transcode_failure) = self.extractor.extract_transcode(
                    input,
                    stream.index,
                    &self.config.pcm_format,
                    &pcm_path,
                ) {
                    log::error!(
                        "Transcode of audio stream {} ({}) failed: {}",
                        stream.index,
                        stream.codec_name,
                        transcode_failure
                    );
                    return Err(CoreError::ExtractionFailed {
                        stream_index: stream.index,
                        codec: stream.codec_name.clone(),
                    });
                }
                pcm_path
            }
        };

        non_empty_size(&produced, Some(stream.index))
    }

    /// Full fallback: no metadata, so measure a single audio payload.
    fn resolve_unprobed(
        &self,
        media: &MediaFile,
        artifacts: &mut TempArtifacts,
    ) -> CoreResult<BitrateReport> {
        let (bytes, duration_secs) = match media.kind {
            MediaKind::Video => {
                let wav_path = artifacts.register(self.config.full_audio_path());
                let reported = self
                    .extractor
                    .extract_full_audio(&media.path, &self.config.pcm_format, &wav_path)
                    .map_err(|failure| {
                        CoreError::OperationFailed(format!(
                            "extracting audio from '{}' failed: {failure}",
                            media.path.display()
                        ))
                    })?;
                let bytes = non_empty_size(&wav_path, None)?;
                let duration = match reported {
                    Some(duration) => duration,
                    None => self.durations.duration_secs(&wav_path)?,
                };
                (bytes, duration)
            }
            MediaKind::Audio => {
                let bytes = non_empty_size(&media.path, None)?;
                (bytes, self.durations.duration_secs(&media.path)?)
            }
        };

        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(CoreError::InvalidDuration(duration_secs));
        }

        let kbps = bitrate_kbps(bytes as f64, duration_secs);
        log::info!(
            "Measured single audio track: {} bytes over {:.3}s = {} kbps",
            bytes,
            duration_secs,
            kbps
        );

        let state = ResolutionState::new(media, duration_secs)
            .with_track(ResolvedTrack::unprobed(FALLBACK_TRACK_LABEL, kbps), bytes as f64);
        Ok(state.derive_video().into_report())
    }
}

/// Size of an extraction result, rejecting missing or zero-byte files.
fn non_empty_size(path: &Path, stream_index: Option<usize>) -> CoreResult<u64> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(meta.len()),
        Ok(_) => Err(CoreError::EmptyExtraction { stream_index }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(CoreError::EmptyExtraction { stream_index })
        }
        Err(e) => Err(io_error("reading size of", path, e)),
    }
}
