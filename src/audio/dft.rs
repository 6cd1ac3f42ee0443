use rustfft::{num_complex::Complex, FftPlanner};

use super::features::SpectrumMode;

/// Number of bins the centroid looks at: every bin below N/2, which is
/// `ceil(N/2)` when N is odd.
pub fn half_bins(n: usize) -> usize {
    (n + 1) / 2
}

/// Magnitudes of the first `half_bins(N)` bins of the discrete transform of
/// `signal`, evaluated directly from the definition.
pub fn naive_half_spectrum(signal: &[f32]) -> Vec<f64> {
    let n = signal.len();
    let step = -2.0 * std::f64::consts::PI / n as f64;

    (0..half_bins(n))
        .map(|k| {
            let mut real = 0.0f64;
            let mut imag = 0.0f64;
            for (i, &s) in signal.iter().enumerate() {
                // k*n reduced mod N keeps the angle small without changing it mod 2π
                let angle = step * ((k * i) % n) as f64;
                real += s as f64 * angle.cos();
                imag += s as f64 * angle.sin();
            }
            (real * real + imag * imag).sqrt()
        })
        .collect()
}

/// Same bins as [`naive_half_spectrum`], computed with an FFT.
pub fn fft_half_spectrum(signal: &[f32]) -> Vec<f64> {
    let n = signal.len();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&s| Complex::new(s as f64, 0.0)).collect();
    fft.process(&mut buffer);

    buffer[..half_bins(n)].iter().map(|c| c.norm()).collect()
}

pub fn half_spectrum(signal: &[f32], mode: SpectrumMode) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    match mode {
        SpectrumMode::Naive => naive_half_spectrum(signal),
        SpectrumMode::Fft => fft_half_spectrum(signal),
    }
}

/// Magnitude-weighted mean frequency of `signal`; 0 when the spectrum is empty.
pub fn spectral_centroid(signal: &[f32], sample_rate: u32, mode: SpectrumMode) -> f64 {
    let n = signal.len();
    let magnitudes = half_spectrum(signal, mode);

    let mut weighted = 0.0f64;
    let mut total = 0.0f64;
    for (i, &mag) in magnitudes.iter().enumerate() {
        let freq = i as f64 * sample_rate as f64 / n as f64;
        weighted += freq * mag;
        total += mag;
    }

    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin() as f32)
            .collect()
    }

    #[test]
    fn odd_lengths_round_half_up() {
        assert_eq!(half_bins(4), 2);
        assert_eq!(half_bins(5), 3);
        assert_eq!(naive_half_spectrum(&[1.0; 5]).len(), 3);
    }

    #[test]
    fn dc_signal_has_energy_only_in_bin_zero() {
        let mags = naive_half_spectrum(&[0.5; 8]);
        assert!((mags[0] - 4.0).abs() < 1e-9);
        assert!(mags[1..].iter().all(|&m| m < 1e-9));
    }

    #[test]
    fn centroid_of_bin_aligned_sine() {
        // 1000 Hz at 8 kHz over 64 samples lands exactly on bin 8
        let signal = sine(1000.0, 8_000, 64);
        let centroid = spectral_centroid(&signal, 8_000, SpectrumMode::Naive);
        assert!((centroid - 1000.0).abs() < 1.0, "centroid = {}", centroid);
    }

    #[test]
    fn silence_has_zero_centroid() {
        assert_eq!(spectral_centroid(&[0.0; 32], 44_100, SpectrumMode::Naive), 0.0);
        assert_eq!(spectral_centroid(&[0.0; 32], 44_100, SpectrumMode::Fft), 0.0);
        assert_eq!(spectral_centroid(&[], 44_100, SpectrumMode::Naive), 0.0);
    }

    #[test]
    fn fast_transform_matches_naive_bins() {
        let signal: Vec<f32> = (0..97).map(|i| ((i * 37) % 19) as f32 / 19.0 - 0.5).collect();
        let naive = naive_half_spectrum(&signal);
        let fast = fft_half_spectrum(&signal);
        assert_eq!(naive.len(), fast.len());
        for (a, b) in naive.iter().zip(fast.iter()) {
            assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
    }
}
