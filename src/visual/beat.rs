//! Loudness-threshold beat detection with a refractory period.
//!
//! Not adaptive: a quiet track may never cross the threshold and a loud one
//! may cross it on every frame outside the refractory window.

use crate::constants::{BEAT_REFRACTORY_MS, BEAT_THRESHOLD};

/// Root-mean-square of byte time-domain samples centered at 128.
pub fn rms(time_domain: &[u8]) -> f32 {
    if time_domain.is_empty() {
        return 0.0;
    }
    let sum: f32 = time_domain
        .iter()
        .map(|&b| {
            let v = (b as f32 - 128.0) / 128.0;
            v * v
        })
        .sum();
    (sum / time_domain.len() as f32).sqrt()
}

#[derive(Debug, Clone)]
pub struct BeatDetector {
    threshold: f32,
    refractory_ms: f64,
    last_beat: Option<f64>,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(BEAT_THRESHOLD, BEAT_REFRACTORY_MS)
    }
}

impl BeatDetector {
    pub fn new(threshold: f32, refractory_ms: f64) -> Self {
        Self {
            threshold,
            refractory_ms,
            last_beat: None,
        }
    }

    /// Returns true when this frame is a beat, recording `now_ms` as the last beat.
    pub fn detect(&mut self, time_domain: &[u8], now_ms: f64) -> bool {
        if rms(time_domain) <= self.threshold {
            return false;
        }
        if let Some(last) = self.last_beat
            && now_ms - last < self.refractory_ms
        {
            return false;
        }
        self.last_beat = Some(now_ms);
        true
    }

    pub fn last_beat(&self) -> Option<f64> {
        self.last_beat
    }
}
