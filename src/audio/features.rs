use serde::{Deserialize, Serialize};

/// Number of equal-length segments a buffer is split into for the visual code.
pub const SEGMENT_COUNT: usize = 16;

/// Scalar features of one segment of a decoded buffer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentFeatures {
    /// Root mean square amplitude
    pub rms: f64,
    /// Sign changes per sample
    pub zero_crossing_rate: f64,
    /// Magnitude-weighted mean frequency (Hz)
    pub spectral_centroid_hz: f64,
    /// Mean squared amplitude
    pub energy: f64,
}

impl SegmentFeatures {
    /// Weighted blend used by the visual code, before normalization.
    pub fn code_weight(&self) -> f64 {
        0.4 * self.rms + 0.3 * self.zero_crossing_rate + 0.3 * self.energy
    }
}

/// Which discrete transform feeds the spectral centroid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpectrumMode {
    /// Direct O(n²) evaluation of every bin
    #[default]
    Naive,
    /// Same bins and magnitudes computed with an FFT
    Fft,
}
