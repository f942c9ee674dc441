//! Short-time spectrum of one analysis window.
//!
//! The window is split into centered, Hann-weighted frames (hop =
//! `hop_length`), each frame's magnitude is converted to decibels relative to
//! the loudest bin of the whole window, the decibel matrix is min-max
//! normalized, averaged over time and finally resampled to
//! [`SPECTRUM_BINS`] values in [0, 1].

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Canonical number of spectrum bins handed to detectors and painters
pub const SPECTRUM_BINS: usize = 128;

/// Magnitude floor before taking the logarithm
const AMIN: f32 = 1e-5;
/// Dynamic range kept below the loudest bin
const TOP_DB: f32 = 80.0;
/// Peak-to-peak range below which a window counts as flat (silence, DC)
const FLAT_EPSILON: f32 = 1e-6;

pub struct SpectralAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    hop_length: usize,
    window: Vec<f32>,

    // Pre-allocated work buffers
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    padded: Vec<f32>,
    db: Vec<f32>,
    mean: Vec<f32>,
    spectrum: Vec<f32>,
}

impl SpectralAnalyzer {
    pub fn new(fft_size: usize, hop_length: usize) -> Self {
        let fft_size = fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Periodic Hann window
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / fft_size as f32).cos()))
            .collect();

        let scratch_len = fft.get_inplace_scratch_len();
        let bins = fft_size / 2 + 1;

        Self {
            fft,
            fft_size,
            hop_length: hop_length.max(1),
            window,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            padded: Vec::with_capacity(fft_size * 2),
            db: Vec::with_capacity(bins * 8),
            mean: vec![0.0; bins],
            spectrum: Vec::with_capacity(SPECTRUM_BINS),
        }
    }

    /// Number of bins the transform produces before resampling
    pub fn natural_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Spectrum of `waveform`: exactly [`SPECTRUM_BINS`] values in [0, 1], or
    /// empty when the waveform is empty. Flat windows give all zeros.
    pub fn analyze(&mut self, waveform: &[f32]) -> &[f32] {
        self.spectrum.clear();
        if waveform.is_empty() {
            return &self.spectrum;
        }

        let (lo, hi) = waveform
            .iter()
            .filter(|s| s.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        if !(hi - lo > FLAT_EPSILON) {
            self.spectrum.resize(SPECTRUM_BINS, 0.0);
            return &self.spectrum;
        }

        let frames = self.magnitudes(waveform);
        let bins = self.natural_bins();

        // Amplitude to dB relative to the window's own maximum
        let peak = self.db.iter().cloned().fold(0.0f32, f32::max);
        let ref_db = 20.0 * peak.max(AMIN).log10();
        for v in self.db.iter_mut() {
            *v = 20.0 * v.max(AMIN).log10() - ref_db;
        }
        let max_db = self.db.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let floor_db = max_db - TOP_DB;
        for v in self.db.iter_mut() {
            *v = v.max(floor_db);
        }

        // Min-max normalize the whole matrix
        let min_db = self.db.iter().cloned().fold(f32::INFINITY, f32::min);
        let range = max_db - min_db;
        if !(range > f32::EPSILON) {
            self.spectrum.resize(SPECTRUM_BINS, 0.0);
            return &self.spectrum;
        }
        for v in self.db.iter_mut() {
            *v = (*v - min_db) / range;
        }

        // Average over time
        self.mean.iter_mut().for_each(|m| *m = 0.0);
        for frame in self.db.chunks(bins) {
            for (m, v) in self.mean.iter_mut().zip(frame) {
                *m += v;
            }
        }
        let inv = 1.0 / frames as f32;
        self.mean.iter_mut().for_each(|m| *m *= inv);

        resample_into(&self.mean, SPECTRUM_BINS, &mut self.spectrum);
        for v in self.spectrum.iter_mut() {
            *v = v.clamp(0.0, 1.0);
        }
        &self.spectrum
    }

    /// Fill `self.db` with raw magnitudes (frames x bins), returns frame count
    fn magnitudes(&mut self, waveform: &[f32]) -> usize {
        // Centered framing: half a transform of zeros on each side
        let pad = self.fft_size / 2;
        self.padded.clear();
        self.padded.resize(pad, 0.0);
        self.padded
            .extend(waveform.iter().map(|&s| if s.is_finite() { s } else { 0.0 }));
        self.padded.resize(self.padded.len() + pad, 0.0);
        if self.padded.len() < self.fft_size {
            self.padded.resize(self.fft_size, 0.0);
        }

        let frames = 1 + (self.padded.len() - self.fft_size) / self.hop_length;
        let bins = self.natural_bins();
        self.db.clear();

        for f in 0..frames {
            let start = f * self.hop_length;
            let segment = &self.padded[start..start + self.fft_size];
            for ((slot, &s), &w) in self.buffer.iter_mut().zip(segment).zip(&self.window) {
                *slot = Complex::new(s * w, 0.0);
            }
            self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);
            self.db.extend(self.buffer[..bins].iter().map(|c| c.norm()));
        }

        frames
    }
}

/// Linear interpolation of `input` over index space onto `len` points
pub fn resample_into(input: &[f32], len: usize, out: &mut Vec<f32>) {
    out.clear();
    if input.is_empty() || len == 0 {
        out.resize(len, 0.0);
        return;
    }
    if input.len() == 1 || len == 1 {
        out.resize(len, input[0]);
        return;
    }

    let step = (input.len() - 1) as f32 / (len - 1) as f32;
    for j in 0..len {
        let x = j as f32 * step;
        let i = (x.floor() as usize).min(input.len() - 1);
        let next = (i + 1).min(input.len() - 1);
        let t = x - i as f32;
        out.push(input[i] * (1.0 - t) + input[next] * t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: f32, len: usize, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    fn mean(values: &[f32]) -> f32 {
        values.iter().sum::<f32>() / values.len() as f32
    }

    #[test]
    fn test_empty_input_gives_empty_spectrum() {
        let mut analyzer = SpectralAnalyzer::new(2048, 512);
        assert!(analyzer.analyze(&[]).is_empty());
    }

    #[test]
    fn test_silence_gives_zeros() {
        let mut analyzer = SpectralAnalyzer::new(2048, 512);
        let spectrum = analyzer.analyze(&vec![0.0; 2048]);
        assert_eq!(spectrum.len(), SPECTRUM_BINS);
        assert!(spectrum.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_constant_input_gives_zeros() {
        let mut analyzer = SpectralAnalyzer::new(2048, 512);
        let spectrum = analyzer.analyze(&vec![0.37; 2048]);
        assert_eq!(spectrum.len(), SPECTRUM_BINS);
        assert!(spectrum.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_output_is_bounded_and_finite() {
        let mut analyzer = SpectralAnalyzer::new(2048, 512);
        let mut signal = sine(440.0, 44100.0, 2048, 0.8);
        for (i, s) in signal.iter_mut().enumerate() {
            *s += 0.1 * ((i * 7919 % 97) as f32 / 97.0 - 0.5);
        }
        let spectrum = analyzer.analyze(&signal);
        assert_eq!(spectrum.len(), SPECTRUM_BINS);
        assert!(spectrum.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_short_tail_still_gives_full_length() {
        let mut analyzer = SpectralAnalyzer::new(2048, 512);
        let spectrum = analyzer.analyze(&sine(200.0, 44100.0, 300, 0.5));
        assert_eq!(spectrum.len(), SPECTRUM_BINS);
        assert!(spectrum.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_low_tone_lands_in_low_bins() {
        let mut analyzer = SpectralAnalyzer::new(2048, 512);
        let spectrum = analyzer.analyze(&sine(80.0, 44100.0, 2048, 0.9)).to_vec();
        let low = mean(&spectrum[..12]);
        let high = mean(&spectrum[102..]);
        assert!(low > high, "low {} should exceed high {}", low, high);
    }

    #[test]
    fn test_high_tone_lands_in_high_bins() {
        let mut analyzer = SpectralAnalyzer::new(2048, 512);
        let spectrum = analyzer.analyze(&sine(18000.0, 44100.0, 2048, 0.9)).to_vec();
        let peak = spectrum
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0;
        assert!(peak >= 102, "peak bin {} should be in the top fifth", peak);
    }

    #[test]
    fn test_resample_endpoints() {
        let mut out = Vec::new();
        resample_into(&[0.0, 1.0, 2.0, 3.0, 4.0], 3, &mut out);
        assert_eq!(out, vec![0.0, 2.0, 4.0]);

        resample_into(&[0.0, 1.0], 5, &mut out);
        assert_eq!(out, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }
}
