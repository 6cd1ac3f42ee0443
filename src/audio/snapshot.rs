use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::decode::AudioBuffer;
use crate::error::SourceError;

/// Byte magnitudes, one per frequency bin, captured at one instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencySnapshot(Vec<u8>);

impl FrequencySnapshot {
    pub fn new(bins: Vec<u8>) -> Self {
        Self(bins)
    }

    pub fn bins(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mean magnitude over every bin (0-255).
    pub fn mean_level(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().map(|&b| b as f64).sum::<f64>() / self.0.len() as f64
    }
}

/// A completed run of snapshots. Never empty, all snapshots share a bin count.
#[derive(Clone, Debug)]
pub struct SampleWindow {
    snapshots: Vec<FrequencySnapshot>,
}

impl SampleWindow {
    /// `None` for an empty run; aggregation is skipped in that case.
    pub fn new(snapshots: Vec<FrequencySnapshot>) -> Option<Self> {
        let first = snapshots.first()?;
        let bins = first.len();
        assert!(
            snapshots.iter().all(|s| s.len() == bins),
            "snapshots in a window must have the same bin count"
        );
        Some(Self { snapshots })
    }

    pub fn snapshots(&self) -> &[FrequencySnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn bin_count(&self) -> usize {
        self.snapshots[0].len()
    }
}

/// Anything that can hand out the current frequency snapshot on demand.
pub trait SnapshotSource {
    fn bin_count(&self) -> usize;

    /// Capture the snapshot `elapsed` after collection started.
    fn capture(&mut self, elapsed: Duration) -> Result<FrequencySnapshot, SourceError>;
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AnalyserSettings {
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    #[serde(default = "default_min_decibels")]
    pub min_decibels: f64,
    #[serde(default = "default_max_decibels")]
    pub max_decibels: f64,
}

impl Default for AnalyserSettings {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            smoothing: default_smoothing(),
            min_decibels: default_min_decibels(),
            max_decibels: default_max_decibels(),
        }
    }
}

fn default_fft_size() -> usize { 256 }
fn default_smoothing() -> f64 { 0.8 }
fn default_min_decibels() -> f64 { -100.0 }
fn default_max_decibels() -> f64 { -30.0 }

/// Byte-spectrum analyser running over a decoded buffer, playing it back as
/// if it were a live input.
///
/// Each capture windows the most recent `fft_size` samples (Blackman),
/// smooths magnitudes against the previous capture and maps the result onto
/// 0-255 between `min_decibels` and `max_decibels`.
pub struct AnalyserSource {
    samples: Vec<f32>,
    sample_rate: u32,
    settings: AnalyserSettings,
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    smoothed: Vec<f64>,
}

impl AnalyserSource {
    pub fn new(audio: &AudioBuffer, settings: AnalyserSettings) -> Self {
        assert!(
            settings.fft_size >= 2 && settings.fft_size.is_power_of_two(),
            "analyser fft size must be a power of two"
        );
        assert!(
            settings.max_decibels > settings.min_decibels,
            "analyser max_decibels must exceed min_decibels"
        );

        let n = settings.fft_size;
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);

        Self {
            samples: audio.samples.clone(),
            sample_rate: audio.sample_rate,
            window: blackman_window(n),
            smoothed: vec![0.0; n / 2],
            fft,
            settings,
        }
    }

    fn byte_for(&self, magnitude: f64) -> u8 {
        let db = 20.0 * magnitude.log10();
        let span = self.settings.max_decibels - self.settings.min_decibels;
        let scaled = (255.0 / span * (db - self.settings.min_decibels)).floor();
        // -inf and NaN both land on 0
        if scaled.is_nan() {
            0
        } else {
            scaled.clamp(0.0, 255.0) as u8
        }
    }
}

impl SnapshotSource for AnalyserSource {
    fn bin_count(&self) -> usize {
        self.settings.fft_size / 2
    }

    fn capture(&mut self, elapsed: Duration) -> Result<FrequencySnapshot, SourceError> {
        let length = self.samples.len() as f64 / self.sample_rate.max(1) as f64;
        let at = elapsed.as_secs_f64();
        let end = (at * self.sample_rate as f64).round() as usize;
        if end > self.samples.len() {
            return Err(SourceError::Exhausted { at, length });
        }

        let n = self.settings.fft_size;
        let mut buffer = vec![Complex::new(0.0f64, 0.0); n];
        let start = end.saturating_sub(n);
        let offset = n - (end - start);
        for (i, &s) in self.samples[start..end].iter().enumerate() {
            let idx = offset + i;
            buffer[idx] = Complex::new(s as f64 * self.window[idx], 0.0);
        }
        self.fft.process(&mut buffer);

        let tau = self.settings.smoothing;
        for (k, value) in buffer[..n / 2].iter().enumerate() {
            let magnitude = value.norm() / n as f64;
            self.smoothed[k] = tau * self.smoothed[k] + (1.0 - tau) * magnitude;
        }

        let bins = self.smoothed.iter().map(|&m| self.byte_for(m)).collect();
        Ok(FrequencySnapshot::new(bins))
    }
}

fn blackman_window(size: usize) -> Vec<f64> {
    let alpha = 0.16;
    let a0 = 0.5 * (1.0 - alpha);
    let a1 = 0.5;
    let a2 = 0.5 * alpha;
    (0..size)
        .map(|i| {
            let x = 2.0 * std::f64::consts::PI * i as f64 / size as f64;
            a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f64, sample_rate: u32, seconds: f64, amplitude: f32) -> AudioBuffer {
        let len = (sample_rate as f64 * seconds) as usize;
        let samples = (0..len)
            .map(|i| {
                (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin() as f32
                    * amplitude
            })
            .collect();
        AudioBuffer::new(samples, sample_rate)
    }

    #[test]
    fn empty_window_is_none() {
        assert!(SampleWindow::new(Vec::new()).is_none());
    }

    #[test]
    #[should_panic(expected = "same bin count")]
    fn mismatched_snapshots_are_rejected() {
        SampleWindow::new(vec![
            FrequencySnapshot::new(vec![0; 4]),
            FrequencySnapshot::new(vec![0; 8]),
        ]);
    }

    #[test]
    fn silence_maps_to_zero_bytes() {
        let audio = AudioBuffer::new(vec![0.0; 8_000], 8_000);
        let mut source = AnalyserSource::new(&audio, AnalyserSettings::default());
        let snap = source.capture(Duration::from_millis(100)).unwrap();
        assert_eq!(snap.len(), 128);
        assert!(snap.bins().iter().all(|&b| b == 0));
    }

    #[test]
    fn low_tone_peaks_in_low_bins() {
        // 8 kHz / 256 points = 31.25 Hz per bin, so 125 Hz is bin 4
        let audio = tone(125.0, 8_000, 1.0, 0.01);
        let mut source = AnalyserSource::new(&audio, AnalyserSettings::default());
        let mut last = None;
        for tick in 1..=5 {
            last = Some(source.capture(Duration::from_millis(tick * 100)).unwrap());
        }
        let snap = last.unwrap();
        let peak = snap
            .bins()
            .iter()
            .enumerate()
            .max_by_key(|(_, b)| **b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 4);
        assert!(snap.bins()[100] < snap.bins()[4]);
    }

    #[test]
    fn capture_past_end_is_exhausted() {
        let audio = AudioBuffer::new(vec![0.1; 800], 8_000);
        let mut source = AnalyserSource::new(&audio, AnalyserSettings::default());
        assert!(source.capture(Duration::from_millis(100)).is_ok());
        let err = source.capture(Duration::from_millis(200)).unwrap_err();
        assert_eq!(err.category(), "source exhausted");
    }

    #[test]
    fn mean_level_averages_bins() {
        let snap = FrequencySnapshot::new(vec![0, 100, 200]);
        assert!((snap.mean_level() - 100.0).abs() < 1e-12);
    }
}
