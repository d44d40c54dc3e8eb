//! Decorative background circles.
//!
//! Circles are placed once at random positions and live for the whole
//! session. Track selection recolors them; beats pulse a random subset.

use super::random::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// 33% small, 27% medium, 40% large.
    pub fn pick(r: f64) -> Self {
        if r < 0.33 {
            SizeClass::Small
        } else if r < 0.60 {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundCircle {
    pub x_pct: f64,
    pub y_pct: f64,
    pub size: SizeClass,
    pub color: Option<String>,
    pub pulsing: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AmbientBackground {
    circles: Vec<BackgroundCircle>,
}

impl AmbientBackground {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add circles until there are `count`; never removes any. Returns how many were added.
    pub fn grow_to(&mut self, count: usize, rng: &mut impl RandomSource) -> usize {
        let needed = count.saturating_sub(self.circles.len());
        for _ in 0..needed {
            let x_pct = rng.next_f64() * 100.0;
            let y_pct = rng.next_f64() * 100.0;
            let size = SizeClass::pick(rng.next_f64());
            self.circles.push(BackgroundCircle {
                x_pct,
                y_pct,
                size,
                color: None,
                pulsing: false,
            });
        }
        needed
    }

    pub fn set_color(&mut self, color: &str) {
        for circle in &mut self.circles {
            circle.color = Some(color.to_string());
        }
    }

    /// Start pulsing up to `count` distinct random circles and return their indices.
    pub fn pulse_random(&mut self, count: usize, rng: &mut impl RandomSource) -> Vec<usize> {
        let take = count.min(self.circles.len());
        let mut indices: Vec<usize> = (0..self.circles.len()).collect();

        // Partial Fisher-Yates: the first `take` slots end up a uniform sample
        for slot in 0..take {
            let pick = slot + rng.next_index(indices.len() - slot);
            indices.swap(slot, pick);
        }
        indices.truncate(take);

        for &i in &indices {
            self.circles[i].pulsing = true;
        }
        indices
    }

    pub fn end_pulse(&mut self, index: usize) {
        if let Some(circle) = self.circles.get_mut(index) {
            circle.pulsing = false;
        }
    }

    pub fn circles(&self) -> &[BackgroundCircle] {
        &self.circles
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::random::{SequenceRandom, ThreadRandom};
    use std::collections::HashSet;

    #[test]
    fn test_size_class_weights() {
        assert_eq!(SizeClass::pick(0.0), SizeClass::Small);
        assert_eq!(SizeClass::pick(0.329), SizeClass::Small);
        assert_eq!(SizeClass::pick(0.33), SizeClass::Medium);
        assert_eq!(SizeClass::pick(0.599), SizeClass::Medium);
        assert_eq!(SizeClass::pick(0.6), SizeClass::Large);
        assert_eq!(SizeClass::pick(0.99), SizeClass::Large);
    }

    #[test]
    fn test_grow_is_idempotent() {
        let mut rng = ThreadRandom::seeded(1);
        let mut ambient = AmbientBackground::new();
        assert_eq!(ambient.grow_to(12, &mut rng), 12);
        assert_eq!(ambient.grow_to(12, &mut rng), 0);
        assert_eq!(ambient.grow_to(5, &mut rng), 0);
        assert_eq!(ambient.len(), 12);
    }

    #[test]
    fn test_positions_from_random_source() {
        let mut rng = SequenceRandom::new(vec![0.25, 0.5, 0.9]);
        let mut ambient = AmbientBackground::new();
        ambient.grow_to(1, &mut rng);
        let circle = &ambient.circles()[0];
        assert_eq!(circle.x_pct, 25.0);
        assert_eq!(circle.y_pct, 50.0);
        assert_eq!(circle.size, SizeClass::Large);
        assert!(circle.color.is_none());
        assert!(!circle.pulsing);
    }

    #[test]
    fn test_set_color() {
        let mut rng = ThreadRandom::seeded(2);
        let mut ambient = AmbientBackground::new();
        ambient.grow_to(3, &mut rng);
        ambient.set_color("#ff0000");
        assert!(
            ambient
                .circles()
                .iter()
                .all(|c| c.color.as_deref() == Some("#ff0000"))
        );
    }

    #[test]
    fn test_pulse_picks_distinct_circles() {
        // A source stuck on one value still yields distinct indices
        let mut rng = SequenceRandom::new(vec![0.0]);
        let mut ambient = AmbientBackground::new();
        ambient.grow_to(12, &mut ThreadRandom::seeded(3));

        let picked = ambient.pulse_random(4, &mut rng);
        assert_eq!(picked.len(), 4);
        assert_eq!(picked.iter().collect::<HashSet<_>>().len(), 4);
        assert_eq!(ambient.circles().iter().filter(|c| c.pulsing).count(), 4);

        ambient.end_pulse(picked[0]);
        assert!(!ambient.circles()[picked[0]].pulsing);
    }

    #[test]
    fn test_pulse_more_than_available() {
        let mut ambient = AmbientBackground::new();
        ambient.grow_to(2, &mut ThreadRandom::seeded(4));
        let picked = ambient.pulse_random(4, &mut ThreadRandom::seeded(5));
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_pulse_on_empty_background() {
        let mut ambient = AmbientBackground::new();
        assert!(ambient.pulse_random(4, &mut ThreadRandom::seeded(6)).is_empty());
        ambient.end_pulse(3);
    }
}
