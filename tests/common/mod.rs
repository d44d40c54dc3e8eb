#![allow(dead_code)]

use std::error::Error;
use std::sync::mpsc;

use halo_player::playlist::{Playlist, Track};
use halo_player::visual::media::{AudioGraph, GraphState, MediaElement, MediaEvent};
use halo_player::visual::radial::{BoxRect, Viewport};
use halo_player::visual::random::ThreadRandom;
use halo_player::visual::stage::Stage;
use halo_player::visual::{PlayerSession, SessionSettings};

/// In-memory media element that records calls and raises events the way a
/// playing element would.
pub struct FakeMedia {
    pub src: Option<String>,
    pub paused: bool,
    pub loads: usize,
    pub plays: usize,
    pub fail_load: bool,
    pub graph: GraphState,
    pub resumes: usize,
    events: Vec<MediaEvent>,
    tap_tx: mpsc::Sender<Vec<f32>>,
    tap_rx: Option<mpsc::Receiver<Vec<f32>>>,
}

impl FakeMedia {
    pub fn new() -> Self {
        let (tap_tx, tap_rx) = mpsc::channel();
        Self {
            src: None,
            paused: true,
            loads: 0,
            plays: 0,
            fail_load: false,
            graph: GraphState::Suspended,
            resumes: 0,
            events: Vec::new(),
            tap_tx,
            tap_rx: Some(tap_rx),
        }
    }

    /// Push samples through the tap as if they were being played.
    pub fn feed(&self, samples: &[f32]) {
        let _ = self.tap_tx.send(samples.to_vec());
    }

    /// Reach the end of the track.
    pub fn finish(&mut self) {
        self.paused = true;
        self.events.push(MediaEvent::Pause);
        self.events.push(MediaEvent::Ended);
    }
}

impl MediaElement for FakeMedia {
    fn current_src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    fn set_src(&mut self, src: &str) {
        self.src = Some(src.to_string());
    }

    fn load(&mut self) -> Result<(), Box<dyn Error>> {
        self.loads += 1;
        self.paused = true;
        if self.fail_load {
            return Err("decode failed".into());
        }
        Ok(())
    }

    fn play(&mut self) {
        self.plays += 1;
        if self.paused {
            self.paused = false;
            self.events.push(MediaEvent::Play);
        }
    }

    fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.events.push(MediaEvent::Pause);
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.events)
    }
}

impl AudioGraph for FakeMedia {
    fn graph_state(&self) -> GraphState {
        self.graph
    }

    fn resume(&mut self) {
        self.resumes += 1;
        self.graph = GraphState::Running;
    }

    fn connect_tap(&mut self) -> Option<mpsc::Receiver<Vec<f32>>> {
        self.tap_rx.take()
    }
}

pub fn track(src: Option<&str>, title: &str, color: Option<&str>) -> Track {
    Track {
        src: src.map(str::to_string),
        title: Some(title.to_string()),
        artist: Some(format!("{title} Artist")),
        cover: src.map(|s| format!("{s}.png")),
        color: color.map(str::to_string),
    }
}

/// Three entries: one color, two colors, no color.
pub fn sample_playlist() -> Playlist {
    Playlist::new(vec![
        track(Some("one.wav"), "One", Some("#ff0000")),
        track(Some("two.wav"), "Two", Some("#00ff00, #0000ff")),
        track(Some("three.wav"), "Three", None),
        track(None, "Nowhere", Some("#ffffff")),
    ])
}

pub fn cover_rect() -> BoxRect {
    BoxRect::new(540.0, 300.0, 200.0, 200.0)
}

pub fn session() -> PlayerSession<FakeMedia, ThreadRandom> {
    session_with(Viewport::default())
}

pub fn session_with(viewport: Viewport) -> PlayerSession<FakeMedia, ThreadRandom> {
    PlayerSession::new(
        FakeMedia::new(),
        sample_playlist(),
        Stage::new(viewport, cover_rect()),
        SessionSettings::default(),
        ThreadRandom::seeded(7),
    )
}

pub fn loud() -> Vec<f32> {
    (0..1024)
        .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
        .collect()
}

pub fn silence() -> Vec<f32> {
    vec![0.0; 1024]
}
