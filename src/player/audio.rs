//! Audio playback engine with an analysis tap.
//!
//! Files are decoded up front (WAV through hound, FLAC through claxon) and
//! played through a rodio sink. The source handed to rodio also forwards a
//! mono downmix of every frame it plays to the analysis tap while the audio
//! graph is running. The engine implements the player's [`MediaElement`] and
//! [`AudioGraph`] seams and reports play, pause and ended transitions as
//! [`MediaEvent`]s.

use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
    mpsc,
};
use std::time::Duration;

use halo_player::constants::AUDIO_EXTENSIONS;
use halo_player::visual::media::{
    AudioGraph, GraphState, MediaElement, MediaEvent, PlaybackState,
};

/// Mono frames per chunk sent to the tap.
const TAP_CHUNK_FRAMES: usize = 512;

/// A fully decoded file, interleaved.
#[derive(Debug, Clone)]
pub struct DecodedTrack {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    samples: Vec<i32>,
}

impl DecodedTrack {
    pub fn open(path: &Path) -> Result<Self, Box<dyn Error>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            return Err(format!("Unsupported audio format: {ext}").into());
        }

        let file = BufReader::new(File::open(path)?);
        match ext.as_str() {
            "wav" => Self::from_wav(hound::WavReader::new(file)?),
            _ => Self::from_flac(claxon::FlacReader::new(file)?),
        }
    }

    pub fn from_wav<R: Read>(mut reader: hound::WavReader<R>) -> Result<Self, Box<dyn Error>> {
        let spec = reader.spec();
        log::info!(
            "WAV format: {} Hz, {} channels, {} bits, {:?}",
            spec.sample_rate,
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format
        );

        let samples = match (spec.sample_format, spec.bits_per_sample) {
            (hound::SampleFormat::Float, 32) => {
                let samples: Result<Vec<f32>, _> = reader.samples().collect();
                samples?
                    .into_iter()
                    .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i32)
                    .collect()
            }
            (hound::SampleFormat::Int, 8) => {
                let samples: Result<Vec<i8>, _> = reader.samples().collect();
                samples?.into_iter().map(i32::from).collect()
            }
            (hound::SampleFormat::Int, 16) => {
                let samples: Result<Vec<i16>, _> = reader.samples().collect();
                samples?.into_iter().map(i32::from).collect()
            }
            (hound::SampleFormat::Int, 24 | 32) => {
                let samples: Result<Vec<i32>, _> = reader.samples().collect();
                samples?
            }
            (_, bits) => return Err(format!("Unsupported bit depth: {bits}").into()),
        };

        // Float input was rescaled to 16 bit above
        let bits_per_sample = match spec.sample_format {
            hound::SampleFormat::Float => 16,
            hound::SampleFormat::Int => spec.bits_per_sample,
        };

        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample,
            samples,
        })
    }

    pub fn from_flac<R: Read>(mut reader: claxon::FlacReader<R>) -> Result<Self, Box<dyn Error>> {
        let info = reader.streaminfo();
        log::info!(
            "FLAC format: {} Hz, {} channels, {} bits",
            info.sample_rate,
            info.channels,
            info.bits_per_sample
        );

        let mut samples = Vec::new();
        for sample in reader.samples() {
            samples.push(sample?);
        }

        Ok(Self {
            sample_rate: info.sample_rate,
            channels: info.channels as u16,
            bits_per_sample: info.bits_per_sample as u16,
            samples,
        })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() as f64 / self.channels.max(1) as f64;
        Duration::from_secs_f64(frames / self.sample_rate.max(1) as f64)
    }

    fn to_i16(&self, sample: i32) -> i16 {
        match self.bits_per_sample {
            16 => sample as i16,
            bits if bits < 16 => (sample << (16 - bits)) as i16,
            bits => (sample >> (bits - 16)) as i16,
        }
    }

    fn normalize(&self, sample: i32) -> f32 {
        sample as f32 / (1i64 << (self.bits_per_sample - 1)) as f32
    }
}

/// Plays a decoded track and mirrors it, downmixed to mono, into the tap.
pub struct TappedSource {
    track: Arc<DecodedTrack>,
    position: usize,
    tap: mpsc::Sender<Vec<f32>>,
    tap_running: Arc<AtomicBool>,
    samples_played: Arc<AtomicUsize>,
    frame_sum: f32,
    frame_fill: u16,
    chunk: Vec<f32>,
}

impl TappedSource {
    pub fn new(
        track: Arc<DecodedTrack>,
        tap: mpsc::Sender<Vec<f32>>,
        tap_running: Arc<AtomicBool>,
        samples_played: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            track,
            position: 0,
            tap,
            tap_running,
            samples_played,
            frame_sum: 0.0,
            frame_fill: 0,
            chunk: Vec::with_capacity(TAP_CHUNK_FRAMES),
        }
    }

    fn monitor(&mut self, sample: i32) {
        self.frame_sum += self.track.normalize(sample);
        self.frame_fill += 1;
        if self.frame_fill < self.track.channels.max(1) {
            return;
        }

        let mono = self.frame_sum / self.frame_fill as f32;
        self.frame_sum = 0.0;
        self.frame_fill = 0;

        // A suspended graph passes audio through but feeds no analysis
        if !self.tap_running.load(Ordering::Relaxed) {
            self.chunk.clear();
            return;
        }
        self.chunk.push(mono);
        if self.chunk.len() >= TAP_CHUNK_FRAMES {
            let _ = self.tap.send(std::mem::take(&mut self.chunk));
            self.chunk.reserve(TAP_CHUNK_FRAMES);
        }
    }
}

impl Iterator for TappedSource {
    type Item = i16;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = *self.track.samples.get(self.position)?;
        self.position += 1;
        self.samples_played.fetch_add(1, Ordering::Relaxed);
        self.monitor(sample);
        Some(self.track.to_i16(sample))
    }
}

impl Source for TappedSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.track.channels
    }

    fn sample_rate(&self) -> u32 {
        self.track.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.track.duration())
    }
}

pub struct AudioEngine {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Sink,
    tap_tx: mpsc::Sender<Vec<f32>>,
    tap_rx: Option<mpsc::Receiver<Vec<f32>>>,
    tap_running: Arc<AtomicBool>,
    samples_played: Arc<AtomicUsize>,
    src: Option<String>,
    track: Option<Arc<DecodedTrack>>,
    state: PlaybackState,
    events: Vec<MediaEvent>,
}

impl AudioEngine {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let (stream, stream_handle) = OutputStream::try_default()?;
        let sink = Sink::try_new(&stream_handle)?;
        let (tap_tx, tap_rx) = mpsc::channel();

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink,
            tap_tx,
            tap_rx: Some(tap_rx),
            tap_running: Arc::new(AtomicBool::new(false)),
            samples_played: Arc::new(AtomicUsize::new(0)),
            src: None,
            track: None,
            state: PlaybackState::Idle,
            events: Vec::new(),
        })
    }

    pub fn duration(&self) -> Option<Duration> {
        self.track.as_ref().map(|t| t.duration())
    }

    pub fn get_progress(&self) -> f32 {
        match &self.track {
            Some(track) if !track.is_empty() => {
                let played = self.samples_played.load(Ordering::Relaxed);
                (played as f32 / track.len() as f32).min(1.0)
            }
            _ => 0.0,
        }
    }

    /// Queue the loaded track from the start on a fresh, paused sink.
    fn queue_from_start(&mut self) -> Result<(), Box<dyn Error>> {
        let Some(track) = self.track.clone() else {
            return Err("No track loaded".into());
        };
        self.sink.stop();
        self.sink = Sink::try_new(&self.stream_handle)?;
        self.sink.pause();
        self.samples_played.store(0, Ordering::Relaxed);
        self.sink.append(TappedSource::new(
            track,
            self.tap_tx.clone(),
            self.tap_running.clone(),
            self.samples_played.clone(),
        ));
        Ok(())
    }
}

impl MediaElement for AudioEngine {
    fn current_src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    fn set_src(&mut self, src: &str) {
        self.src = Some(src.to_string());
    }

    fn load(&mut self) -> Result<(), Box<dyn Error>> {
        let Some(src) = self.src.clone() else {
            return Err("No source set".into());
        };
        if self.state == PlaybackState::Playing {
            self.events.push(MediaEvent::Pause);
        }
        self.sink.stop();
        self.track = None;
        self.state = PlaybackState::Idle;

        let track = DecodedTrack::open(Path::new(&src))?;
        log::info!(
            "Loaded {}: {} samples, {:?}",
            src,
            track.len(),
            track.duration()
        );
        self.track = Some(Arc::new(track));
        self.queue_from_start()
    }

    fn play(&mut self) {
        if self.track.is_none() {
            log::warn!("Play requested with nothing loaded");
            return;
        }
        match self.state {
            PlaybackState::Playing => return,
            PlaybackState::Ended => {
                if let Err(e) = self.queue_from_start() {
                    log::error!("Failed to restart track: {e}");
                    return;
                }
            }
            PlaybackState::Idle | PlaybackState::Paused => {}
        }
        self.sink.play();
        self.state = PlaybackState::Playing;
        self.events.push(MediaEvent::Play);
    }

    fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.sink.pause();
        self.state = PlaybackState::Paused;
        self.events.push(MediaEvent::Pause);
    }

    fn is_paused(&self) -> bool {
        self.state != PlaybackState::Playing
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        if self.state == PlaybackState::Playing && self.sink.empty() {
            log::info!("Playback ended");
            self.state = PlaybackState::Ended;
            self.events.push(MediaEvent::Pause);
            self.events.push(MediaEvent::Ended);
        }
        std::mem::take(&mut self.events)
    }
}

impl AudioGraph for AudioEngine {
    fn graph_state(&self) -> GraphState {
        if self.tap_running.load(Ordering::Relaxed) {
            GraphState::Running
        } else {
            GraphState::Suspended
        }
    }

    fn resume(&mut self) {
        self.tap_running.store(true, Ordering::Relaxed);
    }

    fn connect_tap(&mut self) -> Option<mpsc::Receiver<Vec<f32>>> {
        self.tap_rx.take()
    }
}
