//! Seams between the player session and the platform that actually plays audio.
//!
//! [`MediaElement`] is the playback control surface (source, load, play,
//! pause) and the source of [`MediaEvent`]s. [`AudioGraph`] is the analysis
//! side of the same element: a pass-through tap that forwards the samples
//! being played, gated by a suspended/running state.

use std::error::Error;
use std::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    Play,
    Pause,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    Ended,
}

pub trait MediaElement {
    /// Source currently loaded, if any.
    fn current_src(&self) -> Option<&str>;

    fn set_src(&mut self, src: &str);

    /// Load the source set by [`MediaElement::set_src`].
    fn load(&mut self) -> Result<(), Box<dyn Error>>;

    /// Start or resume playback. Failures are logged, never returned.
    fn play(&mut self);

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// Events raised since the last call, oldest first.
    fn poll_events(&mut self) -> Vec<MediaEvent>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Suspended,
    Running,
}

pub trait AudioGraph {
    fn graph_state(&self) -> GraphState;

    fn resume(&mut self);

    /// Route the element's output through an analysis tap.
    ///
    /// Returns the receiving end of the tap the first time it is called and
    /// `None` afterwards; audible output is not affected.
    fn connect_tap(&mut self) -> Option<mpsc::Receiver<Vec<f32>>>;
}
