//! Decoded mono audio held for analysis.

use crate::error::TrackError;

/// Immutable mono sample buffer, values in [-1, 1]
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Wrap decoded samples. Rejects a zero sample rate and NaN/inf samples;
    /// values outside [-1, 1] are clamped.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32) -> Result<Self, TrackError> {
        if sample_rate == 0 {
            return Err(TrackError::ZeroSampleRate);
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(TrackError::NonFiniteSample { index });
        }
        for s in &mut samples {
            *s = s.clamp(-1.0, 1.0);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Build a track from interleaved multi-channel samples, averaging the
    /// channels and scaling the peak to 1.0
    pub fn from_interleaved(
        interleaved: &[f32],
        channels: usize,
        sample_rate: u32,
    ) -> Result<Self, TrackError> {
        let mut mono = downmix(interleaved, channels);
        normalize_peak(&mut mono);
        Self::new(mono, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Average interleaved frames down to one channel
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Scale so the largest absolute sample is 1.0. Silent buffers stay silent.
pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples
        .iter()
        .filter(|s| s.is_finite())
        .map(|s| s.abs())
        .fold(0.0f32, f32::max);
    if peak <= f32::EPSILON {
        return;
    }
    let gain = 1.0 / peak;
    for s in samples.iter_mut() {
        *s *= gain;
    }
}
