//! Tunable analysis and detection parameters.
//!
//! Every field is optional so a partially filled config file still works;
//! the accessor methods supply the defaults.

use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_SIZE: usize = 2048;
pub const DEFAULT_HOP_LENGTH: usize = 512;

/// Detector thresholds
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DetectionConfig {
    // Beat (bass rise, short cooldown)
    pub beat_rise_threshold: Option<f32>,
    pub beat_cooldown_secs: Option<f32>,

    // Bass drop (bass rise, long cooldown)
    pub drop_rise_threshold: Option<f32>,
    pub drop_cooldown_secs: Option<f32>,

    // Treble burst (no cooldown)
    pub treble_rise_threshold: Option<f32>,

    // Clap (instantaneous)
    pub clap_amplitude_threshold: Option<f32>,
    pub clap_high_energy_threshold: Option<f32>,
}

impl DetectionConfig {
    pub fn beat_rise_threshold(&self) -> f32 {
        self.beat_rise_threshold.unwrap_or(0.18)
    }
    pub fn beat_cooldown_secs(&self) -> f32 {
        self.beat_cooldown_secs.unwrap_or(0.18)
    }

    pub fn drop_rise_threshold(&self) -> f32 {
        self.drop_rise_threshold.unwrap_or(0.32)
    }
    pub fn drop_cooldown_secs(&self) -> f32 {
        self.drop_cooldown_secs.unwrap_or(0.7)
    }

    pub fn treble_rise_threshold(&self) -> f32 {
        self.treble_rise_threshold.unwrap_or(0.22)
    }

    pub fn clap_amplitude_threshold(&self) -> f32 {
        self.clap_amplitude_threshold.unwrap_or(0.10)
    }
    pub fn clap_high_energy_threshold(&self) -> f32 {
        self.clap_high_energy_threshold.unwrap_or(0.35)
    }
}

/// Sliding-window sizes for the frame extractor and spectral analyzer
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AnalysisConfig {
    pub window_size: Option<usize>,
    pub hop_length: Option<usize>,
}

impl AnalysisConfig {
    pub fn window_size(&self) -> usize {
        self.window_size.unwrap_or(DEFAULT_WINDOW_SIZE).max(2)
    }
    pub fn hop_length(&self) -> usize {
        self.hop_length.unwrap_or(DEFAULT_HOP_LENGTH).max(1)
    }
}
