//! Ordered reactions per player event.
//!
//! Each event kind has a list of [`Reaction`]s run in registration order by
//! the session. The beat reactions and the stage bookkeeping live here; the
//! visualizer reactions need the session's loop state and are applied there.
//! Every reaction checks for the stage part it touches and does nothing when
//! that part is missing.

use std::collections::HashMap;

use super::random::RandomSource;
use super::scheduler::{Reversion, Timers};
use super::stage::Stage;
use crate::constants::{COVER_POP_MS, MARKER_FLASH_MS, PULSE_MIN_MS, PULSE_SPREAD_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    Play,
    Pause,
    Ended,
    Beat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    ShowCover,
    HideCover,
    SpinCover,
    StopSpin,
    StartVisualizer,
    StopVisualizer,
    ResetVisuals,
    CoverPulse,
    MarkerFlash,
    BackgroundPulse,
}

#[derive(Debug, Clone)]
pub struct ReactorRegistry {
    reactions: HashMap<PlayerEvent, Vec<Reaction>>,
}

impl ReactorRegistry {
    pub fn empty() -> Self {
        Self {
            reactions: HashMap::new(),
        }
    }

    pub fn register(&mut self, event: PlayerEvent, reaction: Reaction) {
        self.reactions.entry(event).or_default().push(reaction);
    }

    pub fn reactions(&self, event: PlayerEvent) -> &[Reaction] {
        self.reactions.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for ReactorRegistry {
    fn default() -> Self {
        use PlayerEvent::*;
        use Reaction::*;

        let mut registry = Self::empty();
        for reaction in [ShowCover, StartVisualizer, SpinCover] {
            registry.register(Play, reaction);
        }
        for reaction in [StopSpin, StopVisualizer] {
            registry.register(Pause, reaction);
        }
        for reaction in [HideCover, StopSpin, StopVisualizer, ResetVisuals] {
            registry.register(Ended, reaction);
        }
        for reaction in [CoverPulse, MarkerFlash, BackgroundPulse] {
            registry.register(Beat, reaction);
        }
        registry
    }
}

pub fn show_cover(stage: &mut Stage, visible: bool) {
    if let Some(cover) = &mut stage.cover {
        cover.visible = visible;
    }
}

pub fn spin_cover(stage: &mut Stage, spinning: bool) {
    if let Some(cover) = &mut stage.cover {
        cover.spinning = spinning;
    }
}

pub fn reset_cover_transform(stage: &mut Stage) {
    if let Some(cover) = &mut stage.cover {
        cover.transform = None;
    }
}

/// Pop the cover with a glow in the primary accent.
pub fn pulse_cover(stage: &mut Stage, timers: &mut Timers, now_ms: f64) {
    let Some(cover) = &mut stage.cover else {
        return;
    };
    cover.popped = true;
    cover.glow = Some(cover.accent.primary.clone());
    timers.schedule(now_ms, COVER_POP_MS, Reversion::CoverPop);
}

/// Light the marker for this beat, cycling through the ring.
pub fn flash_marker(stage: &mut Stage, timers: &mut Timers, beat_index: u64, now_ms: f64) {
    let accent = stage
        .cover
        .as_ref()
        .map(|c| c.accent.primary.clone())
        .unwrap_or_default();
    let Some(markers) = &mut stage.markers else {
        return;
    };
    if markers.is_empty() {
        return;
    }
    let index = (beat_index % markers.len() as u64) as usize;
    markers.light(index, &accent);
    timers.schedule(now_ms, MARKER_FLASH_MS, Reversion::Marker(index));
}

/// Pulse a random subset of background circles, each for a random duration.
pub fn pulse_background(
    stage: &mut Stage,
    timers: &mut Timers,
    rng: &mut impl RandomSource,
    count: usize,
    now_ms: f64,
) {
    let Some(ambient) = &mut stage.ambient else {
        return;
    };
    for index in ambient.pulse_random(count, rng) {
        let duration = PULSE_MIN_MS + rng.next_f64() * PULSE_SPREAD_MS;
        timers.schedule(now_ms, duration, Reversion::Circle(index));
    }
}

pub fn revert(stage: &mut Stage, reversion: Reversion) {
    match reversion {
        Reversion::CoverPop => {
            if let Some(cover) = &mut stage.cover {
                cover.popped = false;
                cover.glow = None;
            }
        }
        Reversion::Marker(index) => {
            if let Some(markers) = &mut stage.markers {
                markers.dim(index);
            }
        }
        Reversion::Circle(index) => {
            if let Some(ambient) = &mut stage.ambient {
                ambient.end_pulse(index);
            }
        }
    }
}
