//! Radial spectrum geometry and canvas sizing.
//!
//! All coordinates are CSS-like px. The canvas is a square centered on the
//! cover; its backing store is scaled by the viewport's pixel ratio.

use std::f64::consts::PI;

use crate::accent::{AccentPair, Rgb, rgb_or};
use crate::constants::{INNER_RADIUS_FACTOR, RING_MARGIN_PX};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            pixel_ratio: 1.0,
        }
    }
}

/// On-screen bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn max_side(&self) -> f64 {
        self.width.max(self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingRules {
    /// Viewports at most this wide use the narrow multiplier.
    pub narrow_breakpoint: f64,
    pub narrow_multiplier: f64,
    pub wide_multiplier: f64,
    pub max_width_fraction: f64,
    pub max_height_fraction: f64,
}

impl Default for SizingRules {
    fn default() -> Self {
        Self {
            narrow_breakpoint: 900.0,
            narrow_multiplier: 1.05,
            wide_multiplier: 1.35,
            max_width_fraction: 0.78,
            max_height_fraction: 0.68,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub css_width: u32,
    pub css_height: u32,
    pub backing_width: u32,
    pub backing_height: u32,
    pub scale: f64,
}

impl CanvasSize {
    pub fn css(&self) -> (f64, f64) {
        (self.css_width as f64, self.css_height as f64)
    }
}

/// Square canvas sized from the cover, capped by the viewport.
pub fn canvas_size(cover: &BoxRect, viewport: &Viewport, rules: &SizingRules) -> CanvasSize {
    let multiplier = if viewport.width <= rules.narrow_breakpoint {
        rules.narrow_multiplier
    } else {
        rules.wide_multiplier
    };
    let max_allowed = (viewport.width * rules.max_width_fraction)
        .min(viewport.height * rules.max_height_fraction);
    let size = (cover.max_side() * multiplier).min(max_allowed).max(0.0);

    let css = size.round() as u32;
    let backing = (css as f64 * viewport.pixel_ratio).round() as u32;

    CanvasSize {
        css_width: css,
        css_height: css,
        backing_width: backing,
        backing_height: backing,
        scale: viewport.pixel_ratio,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub center: (f64, f64),
    pub inner_radius: f64,
    pub max_radius: f64,
}

impl RingGeometry {
    /// Ring for a canvas of `css` size around a cover whose on-screen box is `cover`.
    ///
    /// Bars start at the cover's half-extent (its longer side) and never grow
    /// inward: on canvases too tight for the cover the ring collapses to the
    /// inner radius.
    pub fn new(css: (f64, f64), cover: &BoxRect) -> Self {
        let (cx, cy) = (css.0 / 2.0, css.1 / 2.0);
        let inner_radius = cover.max_side() / 2.0 * INNER_RADIUS_FACTOR;
        Self {
            center: (cx, cy),
            inner_radius,
            max_radius: (cx.min(cy) - RING_MARGIN_PX).max(inner_radius),
        }
    }

    /// Radius for a normalized bin value; exact at both ends.
    pub fn radius_for(&self, value: f64) -> f64 {
        let v = value.clamp(0.0, 1.0);
        self.inner_radius * (1.0 - v) + self.max_radius * v
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSegment {
    pub angle: f64,
    pub value: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub width: f64,
}

/// Map frequency bins onto `bars` radial segments starting at twelve o'clock.
pub fn radial_bars(
    frequency: &[u8],
    ring: &RingGeometry,
    bars: usize,
    pixel_ratio: f64,
) -> Vec<BarSegment> {
    if bars == 0 {
        return Vec::new();
    }
    let step = (frequency.len() / bars).max(1);
    let (cx, cy) = ring.center;

    (0..bars)
        .map(|i| {
            let value = frequency.get(i * step).copied().unwrap_or(0) as f64 / 255.0;
            let angle = (i as f64 / bars as f64) * PI * 2.0 - PI / 2.0;
            let inner_radius = ring.inner_radius;
            let outer_radius = ring.radius_for(value);
            let (sin, cos) = angle.sin_cos();

            BarSegment {
                angle,
                value,
                inner_radius,
                outer_radius,
                from: (cx + cos * inner_radius, cy + sin * inner_radius),
                to: (cx + cos * outer_radius, cy + sin * outer_radius),
                width: (1.6 * value * pixel_ratio).max(1.2),
            }
        })
        .collect()
}

/// Linear gradient across the canvas diagonal: white, primary, secondary.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeGradient {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub stops: [(f64, Rgb); 3],
}

impl StrokeGradient {
    pub fn new(css: (f64, f64), accent: &AccentPair, fallback: &str) -> Self {
        let primary = rgb_or(&accent.primary, fallback);
        let secondary = Rgb::parse(&accent.secondary).unwrap_or(primary);

        Self {
            start: (0.0, 0.0),
            end: css,
            stops: [(0.0, Rgb::WHITE), (0.5, primary), (1.0, secondary)],
        }
    }

    /// Color at a point, projected onto the gradient line.
    pub fn color_at(&self, point: (f64, f64)) -> Rgb {
        let (dx, dy) = (self.end.0 - self.start.0, self.end.1 - self.start.1);
        let len_sq = dx * dx + dy * dy;
        let t = if len_sq > 0.0 {
            ((point.0 - self.start.0) * dx + (point.1 - self.start.1) * dy) / len_sq
        } else {
            0.0
        };
        self.color_at_offset(t)
    }

    pub fn color_at_offset(&self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        for pair in self.stops.windows(2) {
            let (o0, c0) = pair[0];
            let (o1, c1) = pair[1];
            if t <= o1 {
                return c0.lerp(c1, (t - o0) / (o1 - o0));
            }
        }
        self.stops[2].1
    }
}

/// The drawing surface behind the cover.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    pub size: Option<CanvasSize>,
    pub bars: Vec<BarSegment>,
    pub gradient: Option<StrokeGradient>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resize(&mut self, size: CanvasSize) {
        self.size = Some(size);
    }

    pub fn clear(&mut self) {
        self.bars.clear();
        self.gradient = None;
    }

    pub fn is_blank(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn css(&self) -> (f64, f64) {
        self.size.map(|s| s.css()).unwrap_or_default()
    }
}
