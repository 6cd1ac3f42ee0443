use serde::Serialize;

use crate::audio::snapshot::SampleWindow;

/// Level reported for a band with no energy at all.
pub const SILENCE_DB: f64 = -96.0;

const FULL_SCALE: f64 = 255.0;

/// The five analysis bands of a 128-bin spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Low,
    MidLow,
    Mid,
    MidHigh,
    High,
}

impl Band {
    pub const ALL: [Band; 5] = [Band::Low, Band::MidLow, Band::Mid, Band::MidHigh, Band::High];

    /// Half-open bin range `[start, end)`.
    pub fn bins(self) -> (usize, usize) {
        match self {
            Band::Low => (0, 8),
            Band::MidLow => (8, 24),
            Band::Mid => (24, 64),
            Band::MidHigh => (64, 96),
            Band::High => (96, 128),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Low => "Low Freq (0-100Hz)",
            Band::MidLow => "Mid-Low (100-300Hz)",
            Band::Mid => "Mid Freq (300-800Hz)",
            Band::MidHigh => "Mid-High (800-1200Hz)",
            Band::High => "High Freq (1200Hz+)",
        }
    }
}

/// Convert a mean byte magnitude to dB relative to full scale, clamping
/// silence to [`SILENCE_DB`].
pub fn magnitude_to_db(average: f64) -> f64 {
    if average <= 0.0 {
        return SILENCE_DB;
    }
    (20.0 * (average / FULL_SCALE).log10()).max(SILENCE_DB)
}

/// Mean magnitude over every snapshot and every bin in `[start, end)`, in dB.
/// Bins past the end of a snapshot are skipped.
pub fn band_average(window: &SampleWindow, start: usize, end: usize) -> f64 {
    assert!(start < end, "band range must not be empty");

    let mut total = 0u64;
    let mut count = 0u64;
    for snapshot in window.snapshots() {
        let bins = snapshot.bins();
        let hi = end.min(bins.len());
        if start >= hi {
            continue;
        }
        total += bins[start..hi].iter().map(|&b| b as u64).sum::<u64>();
        count += (hi - start) as u64;
    }

    let average = if count > 0 { total as f64 / count as f64 } else { 0.0 };
    magnitude_to_db(average)
}

/// Spread between the loudest and quietest snapshot, in dB. Both levels are
/// floored at 1, so silent or near-silent windows report no range.
pub fn dynamic_range(window: &SampleWindow) -> f64 {
    let mut max_level = 0.0f64;
    let mut min_level = FULL_SCALE;
    for snapshot in window.snapshots() {
        let level = snapshot.mean_level();
        max_level = max_level.max(level);
        min_level = min_level.min(level);
    }

    20.0 * (max_level.max(1.0) / min_level.max(1.0)).log10()
}

/// Banded levels derived from one sample window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandLevels {
    pub low: f64,
    pub mid_low: f64,
    pub mid: f64,
    pub mid_high: f64,
    pub high: f64,
    /// Mean of the five band levels
    pub average: f64,
    pub dynamic_range: f64,
}

impl BandLevels {
    pub fn from_window(window: &SampleWindow) -> Self {
        let level = |band: Band| {
            let (start, end) = band.bins();
            band_average(window, start, end)
        };

        let low = level(Band::Low);
        let mid_low = level(Band::MidLow);
        let mid = level(Band::Mid);
        let mid_high = level(Band::MidHigh);
        let high = level(Band::High);

        Self {
            low,
            mid_low,
            mid,
            mid_high,
            high,
            average: (low + mid_low + mid + mid_high + high) / 5.0,
            dynamic_range: dynamic_range(window),
        }
    }

    pub fn get(&self, band: Band) -> f64 {
        match band {
            Band::Low => self.low,
            Band::MidLow => self.mid_low,
            Band::Mid => self.mid,
            Band::MidHigh => self.mid_high,
            Band::High => self.high,
        }
    }
}
