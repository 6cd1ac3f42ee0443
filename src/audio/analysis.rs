use rayon::prelude::*;

use super::decode::AudioBuffer;
use super::dft::spectral_centroid;
use super::features::{SegmentFeatures, SpectrumMode, SEGMENT_COUNT};

/// Split the buffer into [`SEGMENT_COUNT`] equal segments and compute the
/// features of each, in order.
///
/// Segments are `floor(len / 16)` samples long and tail samples that do not
/// fill a segment are dropped. A buffer too short to give every segment at
/// least one sample yields no segments.
pub fn extract_features(audio: &AudioBuffer, mode: SpectrumMode) -> Vec<SegmentFeatures> {
    let segment_len = audio.samples.len() / SEGMENT_COUNT;
    if segment_len == 0 {
        log::warn!(
            "Buffer of {} samples is too short for {} segments",
            audio.samples.len(),
            SEGMENT_COUNT
        );
        return Vec::new();
    }

    log::info!(
        "Extracting features: {} segments x {} samples ({:?} transform)",
        SEGMENT_COUNT,
        segment_len,
        mode
    );

    audio.samples[..segment_len * SEGMENT_COUNT]
        .par_chunks_exact(segment_len)
        .map(|segment| segment_features(segment, audio.sample_rate, mode))
        .collect()
}

pub fn segment_features(segment: &[f32], sample_rate: u32, mode: SpectrumMode) -> SegmentFeatures {
    let energy = energy(segment);
    SegmentFeatures {
        rms: rms(segment),
        zero_crossing_rate: zero_crossing_rate(segment),
        spectral_centroid_hz: spectral_centroid(segment, sample_rate, mode),
        energy,
    }
}

/// Mean squared amplitude.
pub fn energy(segment: &[f32]) -> f64 {
    if segment.is_empty() {
        return 0.0;
    }
    segment.iter().map(|&s| s as f64 * s as f64).sum::<f64>() / segment.len() as f64
}

pub fn rms(segment: &[f32]) -> f64 {
    energy(segment).sqrt()
}

/// Sign changes between neighbours divided by the segment length. Zero counts
/// as non-negative.
pub fn zero_crossing_rate(segment: &[f32]) -> f64 {
    if segment.is_empty() {
        return 0.0;
    }
    let crossings = segment
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count();
    crossings as f64 / segment.len() as f64
}
