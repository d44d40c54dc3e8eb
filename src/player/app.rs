//! Application state and control flow for the terminal player.
//!
//! The [`App`] owns the player session and the playlist cursor. The run loop
//! sets up the terminal, maps keys to session calls, feeds the current
//! terminal geometry into the session as a viewport, and ticks the session
//! once per frame interval.

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    error::Error,
    fs::File,
    io,
    path::Path,
    time::{Duration, Instant},
};

use halo_player::config::Config;
use halo_player::playlist::Playlist;
use halo_player::visual::media::{AudioGraph, MediaElement};
use halo_player::visual::radial::Viewport;
use halo_player::visual::random::ThreadRandom;
use halo_player::visual::stage::Stage;
use halo_player::visual::{PlayerSession, SessionSettings};

use super::audio::AudioEngine;
use super::ui;

/// Playback position as shown in the progress bar.
pub trait PlaybackProgress {
    /// Fraction played, 0.0 to 1.0.
    fn progress(&self) -> f32;

    fn duration(&self) -> Option<Duration>;
}

impl PlaybackProgress for AudioEngine {
    fn progress(&self) -> f32 {
        self.get_progress()
    }

    fn duration(&self) -> Option<Duration> {
        AudioEngine::duration(self)
    }
}

pub struct App<M> {
    pub should_quit: bool,
    pub session: PlayerSession<M, ThreadRandom>,
    /// Playlist cursor, moved with the arrow keys.
    pub selected: usize,
    pub pixel_ratio: f64,
    frame_interval: Duration,
    started: Instant,
}

impl<M> App<M>
where
    M: MediaElement + AudioGraph + PlaybackProgress,
{
    pub fn new(media: M, playlist: Playlist, config: &Config) -> Self {
        let viewport = Viewport {
            pixel_ratio: config.pixel_ratio,
            ..Default::default()
        };
        let mut stage = Stage::new(viewport, Default::default());
        if !config.show_background {
            stage.ambient = None;
        }

        let session = PlayerSession::new(
            media,
            playlist,
            stage,
            SessionSettings::from(config),
            ThreadRandom::new(),
        );

        Self {
            should_quit: false,
            session,
            selected: 0,
            pixel_ratio: config.pixel_ratio,
            frame_interval: Duration::from_millis(config.frame_interval_ms),
            started: Instant::now(),
        }
    }

    /// Milliseconds since startup; the session's clock.
    pub fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    pub fn select_next(&mut self) {
        let len = self.session.playlist().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Play the track under the cursor.
    pub fn play_selected(&mut self) {
        self.session.select_track(self.selected);
    }

    /// Move the cursor to a track and play it.
    pub fn play_track(&mut self, index: usize) {
        self.selected = index;
        self.session.select_track(index);
    }

    pub fn toggle_playback(&mut self) {
        self.session.toggle_playback();
    }

    pub fn tick(&mut self) {
        let now = self.now_ms();
        self.session.tick(now);
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => self.toggle_playback(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Enter => self.play_selected(),
            _ => {}
        }
    }
}

/// Start the player on a playlist file, optionally playing a 1-based track right away.
pub fn run(playlist_path: &Path, track: Option<usize>) -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    init_logging(&config)?;
    info!("Starting halo player");

    let playlist = Playlist::load(playlist_path)?;
    if playlist.is_empty() {
        return Err(format!("Playlist {} has no tracks", playlist_path.display()).into());
    }
    let start = match track {
        Some(n) if n == 0 || n > playlist.len() => {
            return Err(format!("Track {n} out of range (1-{})", playlist.len()).into());
        }
        Some(n) => Some(n - 1),
        None => None,
    };

    let engine = AudioEngine::new()?;
    let mut app = App::new(engine, playlist, &config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if let Some(index) = start {
        app.play_track(index);
    }

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        log::error!("Player stopped: {e}");
    }
    res
}

fn run_app<B, M>(terminal: &mut Terminal<B>, app: &mut App<M>) -> Result<(), Box<dyn Error>>
where
    B: ratatui::backend::Backend,
    M: MediaElement + AudioGraph + PlaybackProgress,
{
    loop {
        terminal.draw(|f| {
            let layout = ui::stage_layout(f.area());
            app.session.update_layout(
                ui::viewport_for(f.area(), app.pixel_ratio),
                ui::cells_to_px(layout.cover),
            );
            ui::draw(f, app, &layout);
        })?;

        // Poll for input with the frame interval as timeout to keep animating
        if event::poll(app.frame_interval)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code);
        }

        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}

fn init_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let level = config
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Info);

    simplelog::CombinedLogger::init(vec![simplelog::WriteLogger::new(
        level,
        simplelog::Config::default(),
        File::create(&config.log_file)?,
    )])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_player::playlist::Track;
    use halo_player::visual::media::{GraphState, MediaEvent};
    use std::sync::mpsc;

    #[derive(Default)]
    struct SilentMedia {
        src: Option<String>,
        paused: bool,
        plays: usize,
    }

    impl MediaElement for SilentMedia {
        fn current_src(&self) -> Option<&str> {
            self.src.as_deref()
        }

        fn set_src(&mut self, src: &str) {
            self.src = Some(src.to_string());
        }

        fn load(&mut self) -> Result<(), Box<dyn Error>> {
            self.paused = true;
            Ok(())
        }

        fn play(&mut self) {
            self.paused = false;
            self.plays += 1;
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn poll_events(&mut self) -> Vec<MediaEvent> {
            Vec::new()
        }
    }

    impl AudioGraph for SilentMedia {
        fn graph_state(&self) -> GraphState {
            GraphState::Running
        }

        fn resume(&mut self) {}

        fn connect_tap(&mut self) -> Option<mpsc::Receiver<Vec<f32>>> {
            None
        }
    }

    impl PlaybackProgress for SilentMedia {
        fn progress(&self) -> f32 {
            0.0
        }

        fn duration(&self) -> Option<Duration> {
            None
        }
    }

    fn track(src: &str) -> Track {
        Track {
            src: Some(src.to_string()),
            ..Default::default()
        }
    }

    fn test_app() -> App<SilentMedia> {
        let playlist = Playlist::new(vec![track("a.wav"), track("b.wav"), track("c.wav")]);
        App::new(SilentMedia::default(), playlist, &Config::default())
    }

    #[test]
    fn test_new_app_initial_state() {
        let app = test_app();
        assert!(!app.should_quit);
        assert_eq!(app.selected, 0);
        assert!(app.session.current_track().is_none());
        assert_eq!(app.session.stage().ambient.as_ref().map(|a| a.len()), Some(12));
    }

    #[test]
    fn test_background_can_be_disabled() {
        let config = Config {
            show_background: false,
            ..Default::default()
        };
        let app = App::new(SilentMedia::default(), Playlist::default(), &config);
        assert!(app.session.stage().ambient.is_none());
    }

    #[test]
    fn test_cursor_stays_in_playlist() {
        let mut app = test_app();
        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected, 0);

        for _ in 0..5 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.selected, 2);

        app.handle_key(KeyCode::Char('k'));
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_enter_plays_selected_track() {
        let mut app = test_app();
        app.handle_key(KeyCode::Char('j'));
        app.handle_key(KeyCode::Enter);

        assert_eq!(app.session.current_track(), Some(1));
        assert_eq!(app.session.media().current_src(), Some("b.wav"));
        assert_eq!(app.session.media().plays, 1);
    }

    #[test]
    fn test_space_toggles_playback() {
        let mut app = test_app();
        app.play_track(0);
        assert!(!app.session.media().is_paused());

        app.handle_key(KeyCode::Char(' '));
        assert!(app.session.media().is_paused());

        app.handle_key(KeyCode::Char(' '));
        assert!(!app.session.media().is_paused());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit);

        let mut app = test_app();
        app.handle_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
