//! Project-wide constants used across multiple modules.
//!
//! This module centralizes constant definitions to avoid duplication and ensure
//! consistency between the visualizer, the reactors and the terminal front end.

/// Accent color used when a track declares no colors
pub const FALLBACK_ACCENT: &str = "#bca8e2";

/// Transform size of the frequency analyzer
pub const FFT_SIZE: usize = 1024;

/// Number of radial bars drawn around the cover
pub const RADIAL_BARS: usize = 110;

/// Inner ring radius as a fraction of half the cover's longer side
pub const INNER_RADIUS_FACTOR: f64 = 0.98;

/// Gap between the outermost bar tip and the canvas edge, in px
pub const RING_MARGIN_PX: f64 = 8.0;

/// RMS level above which a frame counts as a beat
pub const BEAT_THRESHOLD: f32 = 0.12;

/// Minimum time between two beats
pub const BEAT_REFRACTORY_MS: f64 = 160.0;

/// How long the cover stays popped after a beat
pub const COVER_POP_MS: f64 = 140.0;

/// How long a ring marker stays lit after a beat
pub const MARKER_FLASH_MS: f64 = 160.0;

/// Cover rotation speed while playing: one turn every 20 s
pub const COVER_SPIN_DEG_PER_MS: f64 = 360.0 / 20_000.0;

/// Number of markers on the ring around the cover
pub const RING_MARKERS: usize = 5;

/// Distance of the ring markers from the cover center, in percent of its size
pub const RING_MARKER_RADIUS_PCT: f64 = 42.0;

/// Decorative circles in the ambient background
pub const BACKGROUND_CIRCLES: usize = 12;

/// Background circles pulsed on each beat
pub const PULSE_COUNT: usize = 4;

/// Shortest and longest background pulse
pub const PULSE_MIN_MS: f64 = 260.0;
pub const PULSE_SPREAD_MS: f64 = 220.0;

/// Terminal cell size in px, used to express the terminal as a viewport
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Supported audio file extensions
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac"];
