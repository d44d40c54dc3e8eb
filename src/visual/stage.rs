//! The visual parts the player drives.
//!
//! Every part is optional. A front end that has no room for the cover or
//! that disables the ambient background leaves the part out, and the
//! features depending on it quietly do nothing.

use std::f64::consts::PI;

use super::ambient::AmbientBackground;
use super::radial::{BoxRect, Viewport};
use crate::accent::AccentPair;
use crate::constants::{RING_MARKER_RADIUS_PCT, RING_MARKERS};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverState {
    pub rect: BoxRect,
    pub visible: bool,
    pub spinning: bool,
    pub popped: bool,
    pub glow: Option<String>,
    /// Spin rotation in degrees; `None` when reset.
    pub transform: Option<f64>,
    pub image: Option<String>,
    pub accent: AccentPair,
}

impl CoverState {
    pub fn new(rect: BoxRect) -> Self {
        Self {
            rect,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingMarker {
    pub x_pct: f64,
    pub y_pct: f64,
    pub active: bool,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RingMarkers {
    markers: Vec<RingMarker>,
}

impl RingMarkers {
    /// `count` markers evenly spaced on a ring around the cover center, first at the top.
    pub fn new(count: usize) -> Self {
        let markers = (0..count)
            .map(|i| {
                let angle = (i as f64 / count as f64) * PI * 2.0 - PI / 2.0;
                RingMarker {
                    x_pct: 50.0 + angle.cos() * RING_MARKER_RADIUS_PCT,
                    y_pct: 50.0 + angle.sin() * RING_MARKER_RADIUS_PCT,
                    active: false,
                    color: None,
                }
            })
            .collect();
        Self { markers }
    }

    pub fn light(&mut self, index: usize, color: &str) {
        if let Some(marker) = self.markers.get_mut(index) {
            marker.active = true;
            marker.color = Some(color.to_string());
        }
    }

    pub fn dim(&mut self, index: usize) {
        if let Some(marker) = self.markers.get_mut(index) {
            marker.active = false;
        }
    }

    pub fn markers(&self) -> &[RingMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Stage {
    pub viewport: Viewport,
    pub cover: Option<CoverState>,
    pub info: Option<TrackInfo>,
    pub markers: Option<RingMarkers>,
    pub ambient: Option<AmbientBackground>,
}

impl Stage {
    /// Stage with a cover, track info and an (empty) ambient background.
    pub fn new(viewport: Viewport, cover: BoxRect) -> Self {
        Self {
            viewport,
            cover: Some(CoverState::new(cover)),
            info: Some(TrackInfo::default()),
            markers: None,
            ambient: Some(AmbientBackground::new()),
        }
    }

    /// Create the ring markers once; needs a cover to sit around.
    pub fn ensure_markers(&mut self) {
        if self.cover.is_none() {
            return;
        }
        if self.markers.as_ref().is_some_and(|m| m.len() >= RING_MARKERS) {
            return;
        }
        self.markers = Some(RingMarkers::new(RING_MARKERS));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_evenly_spaced_from_top() {
        let markers = RingMarkers::new(5);
        assert_eq!(markers.len(), 5);

        let top = &markers.markers()[0];
        assert!((top.x_pct - 50.0).abs() < 1e-9);
        assert!((top.y_pct - 8.0).abs() < 1e-9);

        for marker in markers.markers() {
            let r = (marker.x_pct - 50.0).hypot(marker.y_pct - 50.0);
            assert!((r - 42.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_light_and_dim() {
        let mut markers = RingMarkers::new(5);
        markers.light(2, "#ff0000");
        assert!(markers.markers()[2].active);
        assert_eq!(markers.markers()[2].color.as_deref(), Some("#ff0000"));

        markers.dim(2);
        assert!(!markers.markers()[2].active);

        // Out of range is ignored
        markers.light(9, "#ff0000");
        markers.dim(9);
    }

    #[test]
    fn test_ensure_markers_needs_cover() {
        let mut stage = Stage {
            cover: None,
            ..Default::default()
        };
        stage.ensure_markers();
        assert!(stage.markers.is_none());

        let mut stage = Stage::new(Viewport::default(), BoxRect::new(0.0, 0.0, 100.0, 100.0));
        stage.ensure_markers();
        stage.ensure_markers();
        assert_eq!(stage.markers.as_ref().map(|m| m.len()), Some(5));
    }
}
