//! Frequency and time-domain analysis of the samples being played.
//!
//! The analyzer sits behind the media element's tap and keeps a sliding window
//! of the most recent [`FFT_SIZE`] mono samples. On each refresh it produces
//! two byte arrays of `FFT_SIZE / 2` entries:
//!
//! - frequency magnitudes on a 0-255 scale: Blackman window, FFT, magnitude
//!   scaled by `1/N`, smoothed against the previous frame, then mapped from
//!   `[-100 dB, -30 dB]` onto `[0, 255]`;
//! - time-domain amplitudes on a 0-255 scale centered at 128.

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::{Arc, mpsc};

use super::media::{AudioGraph, GraphState};
use crate::constants::FFT_SIZE;

const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;
const SMOOTHING: f32 = 0.8;

/// Fixed-length window over the most recent samples, zero-filled at start.
pub struct SampleWindow {
    samples: VecDeque<f32>,
    len: usize,
}

impl SampleWindow {
    pub fn new(len: usize) -> Self {
        Self {
            samples: std::iter::repeat_n(0.0, len).collect(),
            len,
        }
    }

    pub fn push_samples(&mut self, new_samples: &[f32]) {
        for &sample in new_samples {
            self.samples.push_back(sample);
        }
        // Keep only the most recent samples
        while self.samples.len() > self.len {
            self.samples.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

pub struct SpectrumAnalyzer {
    tap: Option<mpsc::Receiver<Vec<f32>>>,
    window: SampleWindow,
    fft: Arc<dyn Fft<f32>>,
    blackman: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    frequency: Vec<u8>,
    time_domain: Vec<u8>,
}

impl SpectrumAnalyzer {
    pub fn new(tap: Option<mpsc::Receiver<Vec<f32>>>) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        let bins = FFT_SIZE / 2;

        Self {
            tap,
            window: SampleWindow::new(FFT_SIZE),
            fft,
            blackman: (0..FFT_SIZE).map(|i| blackman_window(i, FFT_SIZE)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            smoothed: vec![0.0; bins],
            frequency: vec![0; bins],
            time_domain: vec![128; bins],
        }
    }

    pub fn fft_size(&self) -> usize {
        FFT_SIZE
    }

    pub fn frequency_bin_count(&self) -> usize {
        FFT_SIZE / 2
    }

    /// Feed samples directly, bypassing the tap.
    pub fn push_samples(&mut self, samples: &[f32]) {
        self.window.push_samples(samples);
    }

    /// Drain the tap and recompute both arrays.
    pub fn refresh(&mut self) {
        if let Some(tap) = &self.tap {
            while let Ok(samples) = tap.try_recv() {
                self.window.push_samples(&samples);
            }
        }
        self.update_frequency_data();
        self.update_time_domain_data();
    }

    pub fn frequency_data(&self) -> &[u8] {
        &self.frequency
    }

    pub fn time_domain_data(&self) -> &[u8] {
        &self.time_domain
    }

    fn update_frequency_data(&mut self) {
        for ((slot, sample), w) in self
            .buffer
            .iter_mut()
            .zip(self.window.iter())
            .zip(&self.blackman)
        {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / FFT_SIZE as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        for (k, (smoothed, byte)) in self
            .smoothed
            .iter_mut()
            .zip(self.frequency.iter_mut())
            .enumerate()
        {
            let magnitude = self.buffer[k].norm() * scale;
            *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;

            let decibels = if *smoothed > 0.0 {
                20.0 * smoothed.log10()
            } else {
                f32::NEG_INFINITY
            };
            let scaled = 255.0 * (decibels - MIN_DECIBELS) / range;
            *byte = scaled.clamp(0.0, 255.0) as u8;
        }
    }

    fn update_time_domain_data(&mut self) {
        let skip = self.window.len() - self.time_domain.len();
        for (byte, sample) in self
            .time_domain
            .iter_mut()
            .zip(self.window.iter().skip(skip))
        {
            *byte = (128.0 + sample * 128.0).clamp(0.0, 255.0) as u8;
        }
    }
}

/// Build the analyzer for a media element's audio graph.
///
/// Takes the element's tap and resumes a suspended graph so samples start
/// flowing.
pub fn connect<G: AudioGraph>(graph: &mut G) -> SpectrumAnalyzer {
    let tap = graph.connect_tap();
    if tap.is_none() {
        log::warn!("Audio tap already taken, analyzer will only see silence");
    }
    if graph.graph_state() == GraphState::Suspended {
        log::info!("Resuming suspended audio graph");
        graph.resume();
    }
    SpectrumAnalyzer::new(tap)
}

/// Blackman window function for FFT analysis
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubGraph {
        state: GraphState,
        tap: Option<mpsc::Receiver<Vec<f32>>>,
    }

    impl AudioGraph for StubGraph {
        fn graph_state(&self) -> GraphState {
            self.state
        }

        fn resume(&mut self) {
            self.state = GraphState::Running;
        }

        fn connect_tap(&mut self) -> Option<mpsc::Receiver<Vec<f32>>> {
            self.tap.take()
        }
    }

    fn sine(freq_bin: usize, amplitude: f32) -> Vec<f32> {
        (0..FFT_SIZE)
            .map(|i| amplitude * (2.0 * PI * freq_bin as f32 * i as f32 / FFT_SIZE as f32).sin())
            .collect()
    }

    #[test]
    fn test_sample_window_keeps_most_recent() {
        let mut window = SampleWindow::new(3);
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![0.0, 0.0, 0.0]);

        window.push_samples(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(window.iter().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_array_lengths() {
        let analyzer = SpectrumAnalyzer::new(None);
        assert_eq!(analyzer.fft_size(), 1024);
        assert_eq!(analyzer.frequency_bin_count(), 512);
        assert_eq!(analyzer.frequency_data().len(), 512);
        assert_eq!(analyzer.time_domain_data().len(), 512);
    }

    #[test]
    fn test_silence() {
        let mut analyzer = SpectrumAnalyzer::new(None);
        analyzer.refresh();
        assert!(analyzer.frequency_data().iter().all(|&b| b == 0));
        assert!(analyzer.time_domain_data().iter().all(|&b| b == 128));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let mut analyzer = SpectrumAnalyzer::new(None);
        analyzer.push_samples(&sine(64, 0.8));
        for _ in 0..30 {
            analyzer.refresh();
        }

        let data = analyzer.frequency_data();
        assert_eq!(data[64], 255);
        assert_eq!(data[64], *data.iter().max().unwrap());
        // Blackman main lobe spans two bins either side
        assert!(data[63] > 200 && data[65] > 200);
        assert!(data[10] < 10);
        assert!(data[300] < 10);
    }

    #[test]
    fn test_time_domain_is_centered() {
        let mut analyzer = SpectrumAnalyzer::new(None);
        analyzer.push_samples(&vec![0.5; FFT_SIZE]);
        analyzer.refresh();
        assert!(analyzer.time_domain_data().iter().all(|&b| b == 192));

        analyzer.push_samples(&vec![-2.0; FFT_SIZE]);
        analyzer.refresh();
        assert!(analyzer.time_domain_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_time_domain_reads_latest_samples() {
        let mut analyzer = SpectrumAnalyzer::new(None);
        analyzer.push_samples(&vec![0.5; FFT_SIZE / 2]);
        analyzer.refresh();
        assert!(analyzer.time_domain_data().iter().all(|&b| b == 192));

        analyzer.push_samples(&vec![-0.5; FFT_SIZE / 4]);
        analyzer.refresh();
        let data = analyzer.time_domain_data();
        assert!(data[..FFT_SIZE / 4].iter().all(|&b| b == 192));
        assert!(data[FFT_SIZE / 4..].iter().all(|&b| b == 64));
    }

    #[test]
    fn test_refresh_drains_tap() {
        let (tx, rx) = mpsc::channel();
        let mut analyzer = SpectrumAnalyzer::new(Some(rx));
        tx.send(vec![1.0; FFT_SIZE]).unwrap();
        analyzer.refresh();
        assert!(analyzer.time_domain_data().iter().all(|&b| b == 255));
    }

    #[test]
    fn test_connect_resumes_suspended_graph() {
        let (_tx, rx) = mpsc::channel();
        let mut graph = StubGraph {
            state: GraphState::Suspended,
            tap: Some(rx),
        };

        let _analyzer = connect(&mut graph);
        assert_eq!(graph.state, GraphState::Running);
        assert!(graph.tap.is_none());
    }

    #[test]
    fn test_blackman_window() {
        assert!(blackman_window(0, 1024).abs() < 1e-6);
        assert!((blackman_window(512, 1024) - 1.0).abs() < 1e-4);
    }
}
