//! The player session: one object owning everything the player mutates.
//!
//! A session is created at startup and lives until exit. It holds the media
//! element, the playlist, the stage, the lazily built analyzer, the canvas,
//! the frame loop handle, the beat detector and the reversion timers.
//!
//! The front end drives it with three calls: [`PlayerSession::select_track`]
//! and [`PlayerSession::toggle_playback`] on user input, and
//! [`PlayerSession::tick`] once per display tick. Media events are turned
//! into [`PlayerEvent`]s and dispatched to the registered reactions in order.

use super::analyzer::{self, SpectrumAnalyzer};
use super::beat::BeatDetector;
use super::media::{AudioGraph, MediaElement, MediaEvent, PlaybackState};
use super::radial::{
    BoxRect, Canvas, RingGeometry, SizingRules, StrokeGradient, Viewport, canvas_size,
    radial_bars,
};
use super::random::RandomSource;
use super::reactors::{self, PlayerEvent, Reaction, ReactorRegistry};
use super::scheduler::{FrameHandle, FrameScheduler, Timers};
use super::stage::Stage;
use crate::accent::AccentPair;
use crate::config::Config;
use crate::constants::COVER_SPIN_DEG_PER_MS;
use crate::playlist::Playlist;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub fallback_accent: String,
    pub beat_threshold: f32,
    pub refractory_ms: f64,
    pub bar_count: usize,
    pub background_circles: usize,
    pub pulse_count: usize,
    pub sizing: SizingRules,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            fallback_accent: config.fallback_accent.clone(),
            beat_threshold: config.beat_threshold,
            refractory_ms: config.refractory_ms,
            bar_count: config.bar_count,
            background_circles: config.background_circles,
            pulse_count: config.pulse_count,
            sizing: SizingRules::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualState {
    pub last_beat: Option<f64>,
    pub beats: u64,
    pub accent: AccentPair,
}

pub struct PlayerSession<M, R> {
    media: M,
    playlist: Playlist,
    current: Option<usize>,
    state: PlaybackState,
    stage: Stage,
    analyzer: Option<SpectrumAnalyzer>,
    canvas: Option<Canvas>,
    loop_handle: Option<FrameHandle>,
    scheduler: FrameScheduler,
    timers: Timers,
    detector: BeatDetector,
    reactors: ReactorRegistry,
    visual: VisualState,
    rng: R,
    settings: SessionSettings,
    last_frame: Option<f64>,
}

impl<M, R> PlayerSession<M, R>
where
    M: MediaElement + AudioGraph,
    R: RandomSource,
{
    pub fn new(media: M, playlist: Playlist, stage: Stage, settings: SessionSettings, rng: R) -> Self {
        let mut session = Self {
            media,
            playlist,
            current: None,
            state: PlaybackState::Idle,
            stage,
            analyzer: None,
            canvas: None,
            loop_handle: None,
            scheduler: FrameScheduler::new(),
            timers: Timers::new(),
            detector: BeatDetector::new(settings.beat_threshold, settings.refractory_ms),
            reactors: ReactorRegistry::default(),
            visual: VisualState {
                accent: AccentPair::uniform(&settings.fallback_accent),
                ..Default::default()
            },
            rng,
            settings,
            last_frame: None,
        };
        session.init_ambient();
        session
    }

    /// Replace the reaction lists, e.g. to drop a reaction.
    pub fn with_reactors(mut self, reactors: ReactorRegistry) -> Self {
        self.reactors = reactors;
        self
    }

    /// Grow the background up to its configured size. Safe to call repeatedly.
    pub fn init_ambient(&mut self) {
        let target = self.settings.background_circles;
        if let Some(ambient) = &mut self.stage.ambient {
            let added = ambient.grow_to(target, &mut self.rng);
            if added > 0 {
                log::info!("Created {added} background circles");
            }
        }
    }

    /// Select playlist entry `index`: load it if it is not already loaded, update the
    /// display, recolor and start playback.
    pub fn select_track(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index).cloned() else {
            log::warn!("No playlist entry at index {index}");
            return;
        };
        let Some(src) = track.src.as_deref() else {
            log::warn!("Playlist entry {} has no source", index + 1);
            return;
        };

        let already_loaded = self.media.current_src().is_some_and(|s| s.ends_with(src));
        if !already_loaded {
            self.media.set_src(src);
            if let Err(e) = self.media.load() {
                log::error!("Failed to load {src}: {e}");
            }
            if let Some(info) = &mut self.stage.info {
                if let Some(title) = &track.title {
                    info.title = title.clone();
                }
                if let Some(artist) = &track.artist {
                    info.artist = artist.clone();
                }
            }
            if let Some(cover) = &mut self.stage.cover
                && let Some(image) = &track.cover
            {
                cover.image = Some(image.clone());
            }
            log::info!("Loaded track {}: {}", index + 1, track.display_name());
        }
        self.current = Some(index);

        let accent = track.accent(&self.settings.fallback_accent);
        if let Some(cover) = &mut self.stage.cover {
            cover.accent = accent.clone();
            cover.visible = true;
        }
        if let Some(ambient) = &mut self.stage.ambient {
            ambient.set_color(&accent.primary);
        }
        self.visual.accent = accent;

        self.media.play();
    }

    /// The playback control: pause when playing, play otherwise.
    pub fn toggle_playback(&mut self) {
        if self.media.current_src().is_none() {
            log::warn!("Nothing loaded to play");
            return;
        }
        if self.media.is_paused() {
            self.media.play();
        } else {
            self.media.pause();
        }
    }

    /// One display tick: media events, due reversions, then the pending frame.
    pub fn tick(&mut self, now_ms: f64) {
        // Frames requested during this tick wait for the next one
        let ready = self.scheduler.take_ready();

        self.handle_media_events(now_ms);

        for reversion in self.timers.take_due(now_ms) {
            reactors::revert(&mut self.stage, reversion);
        }

        for handle in ready {
            if self.loop_handle == Some(handle) {
                self.loop_handle = None;
                self.draw_frame(now_ms);
            }
        }
    }

    pub fn handle_media_events(&mut self, now_ms: f64) {
        for event in self.media.poll_events() {
            let (state, event) = match event {
                MediaEvent::Play => (PlaybackState::Playing, PlayerEvent::Play),
                MediaEvent::Pause => (PlaybackState::Paused, PlayerEvent::Pause),
                MediaEvent::Ended => (PlaybackState::Ended, PlayerEvent::Ended),
            };
            self.state = state;
            self.dispatch(event, now_ms);
        }
    }

    /// Run every reaction registered for `event`, in order.
    pub fn dispatch(&mut self, event: PlayerEvent, now_ms: f64) {
        log::debug!("Dispatching {event:?}");
        let reactions = self.reactors.reactions(event).to_vec();
        for reaction in reactions {
            self.apply(reaction, now_ms);
        }
    }

    fn apply(&mut self, reaction: Reaction, now_ms: f64) {
        match reaction {
            Reaction::ShowCover => reactors::show_cover(&mut self.stage, true),
            Reaction::HideCover => reactors::show_cover(&mut self.stage, false),
            Reaction::SpinCover => reactors::spin_cover(&mut self.stage, true),
            Reaction::StopSpin => reactors::spin_cover(&mut self.stage, false),
            Reaction::StartVisualizer => self.start_visualizer(now_ms),
            Reaction::StopVisualizer => self.cancel_loop(),
            Reaction::ResetVisuals => {
                if let Some(canvas) = &mut self.canvas {
                    canvas.clear();
                }
                reactors::reset_cover_transform(&mut self.stage);
            }
            Reaction::CoverPulse => reactors::pulse_cover(&mut self.stage, &mut self.timers, now_ms),
            Reaction::MarkerFlash => reactors::flash_marker(
                &mut self.stage,
                &mut self.timers,
                self.visual.beats,
                now_ms,
            ),
            Reaction::BackgroundPulse => reactors::pulse_background(
                &mut self.stage,
                &mut self.timers,
                &mut self.rng,
                self.settings.pulse_count,
                now_ms,
            ),
        }
    }

    fn start_visualizer(&mut self, now_ms: f64) {
        if self.analyzer.is_none() {
            self.init_analysis(now_ms);
        } else if self.loop_handle.is_none() {
            self.draw_frame(now_ms);
        }
    }

    /// Build the analyzer and canvas once, then start the frame loop.
    fn init_analysis(&mut self, now_ms: f64) {
        if self.analyzer.is_some() {
            return;
        }
        self.analyzer = Some(analyzer::connect(&mut self.media));
        log::info!("Spectrum analyzer connected");

        if self.stage.cover.is_some() {
            self.canvas = Some(Canvas::new());
            self.resize_canvas();
            self.stage.ensure_markers();
        } else {
            log::warn!("No cover on stage, radial bars disabled");
        }
        self.draw_frame(now_ms);
    }

    fn cancel_loop(&mut self) {
        if let Some(handle) = self.loop_handle.take() {
            self.scheduler.cancel(handle);
        }
        self.last_frame = None;
    }

    fn schedule_next_frame(&mut self) {
        if let Some(handle) = self.loop_handle.take() {
            self.scheduler.cancel(handle);
        }
        self.loop_handle = Some(self.scheduler.request());
    }

    /// The frame callback: draw the spectrum, detect a beat, schedule the next frame.
    ///
    /// Bars and spin need both the canvas and the cover; beat detection only
    /// needs the analyzer, so the loop keeps draining the tap without a cover.
    fn draw_frame(&mut self, now_ms: f64) {
        let Some(analyzer) = &mut self.analyzer else {
            return;
        };
        analyzer.refresh();

        if let (Some(canvas), Some(cover)) = (&mut self.canvas, &mut self.stage.cover) {
            canvas.clear();

            let css = canvas.css();
            let ring = RingGeometry::new(css, &cover.rect);
            canvas.bars = radial_bars(
                analyzer.frequency_data(),
                &ring,
                self.settings.bar_count,
                self.stage.viewport.pixel_ratio,
            );
            canvas.gradient = Some(StrokeGradient::new(
                css,
                &self.visual.accent,
                &self.settings.fallback_accent,
            ));

            if cover.spinning {
                let elapsed = self.last_frame.map(|t| (now_ms - t).max(0.0)).unwrap_or(0.0);
                let angle = cover.transform.unwrap_or(0.0) + elapsed * COVER_SPIN_DEG_PER_MS;
                cover.transform = Some(angle % 360.0);
            }
        }
        self.last_frame = Some(now_ms);

        if self.detector.detect(analyzer.time_domain_data(), now_ms) {
            self.visual.last_beat = Some(now_ms);
            log::debug!("Beat {} at {now_ms:.0}ms", self.visual.beats);
            self.dispatch(PlayerEvent::Beat, now_ms);
            self.visual.beats += 1;
        }

        self.schedule_next_frame();
    }

    /// Track a new viewport and cover position; the canvas is resized when the viewport changed.
    pub fn update_layout(&mut self, viewport: Viewport, cover_rect: BoxRect) {
        let viewport_changed = self.stage.viewport != viewport;
        let cover_changed = self
            .stage
            .cover
            .as_ref()
            .is_some_and(|c| c.rect != cover_rect);

        self.stage.viewport = viewport;
        if let Some(cover) = &mut self.stage.cover {
            cover.rect = cover_rect;
        }
        if viewport_changed || cover_changed {
            self.resize_canvas();
        }
    }

    fn resize_canvas(&mut self) {
        let (Some(canvas), Some(cover)) = (&mut self.canvas, &self.stage.cover) else {
            return;
        };
        let size = canvas_size(&cover.rect, &self.stage.viewport, &self.settings.sizing);
        log::debug!(
            "Canvas resized to {}x{} ({}x{} backing)",
            size.css_width,
            size.css_height,
            size.backing_width,
            size.backing_height
        );
        canvas.resize(size);
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> Option<usize> {
        self.current
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.state
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn analyzer(&self) -> Option<&SpectrumAnalyzer> {
        self.analyzer.as_ref()
    }

    pub fn analyzer_mut(&mut self) -> Option<&mut SpectrumAnalyzer> {
        self.analyzer.as_mut()
    }

    pub fn visual(&self) -> &VisualState {
        &self.visual
    }

    pub fn is_looping(&self) -> bool {
        self.loop_handle.is_some()
    }

    pub fn pending_frames(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn pending_reversions(&self) -> usize {
        self.timers.len()
    }
}
