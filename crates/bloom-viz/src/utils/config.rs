//! Configuration file management.
//!
//! Handles loading and saving user preferences to `~/.bloom-viz.toml`.

use bloom_viz_core::{AnalysisConfig, DetectionConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;

const CONFIG_TEMPLATE: &str = r#"# bloom-viz configuration file

# Last loaded track (auto-saved)
# last_track = "/home/me/music/song.flac"

# Play the track through the default output device (default: true)
# play_audio = true

# =============================================================================
# Window
# =============================================================================

# window_width = 1280
# window_height = 720
# fullscreen = false

# =============================================================================
# Analysis
# =============================================================================

# window_size = 2048              # Samples per analysis window (and FFT size)
# hop_length = 512                # Samples the window advances every frame

# =============================================================================
# Detection Thresholds
# =============================================================================

# Beat / bass drop: rise of the bass band (lowest 10% of the spectrum)
# beat_rise_threshold = 0.18
# beat_cooldown_secs = 0.18
# drop_rise_threshold = 0.32
# drop_cooldown_secs = 0.7

# Treble burst: rise of the top 20% of the spectrum, no cooldown
# treble_rise_threshold = 0.22

# Clap: loud frame with strong high frequencies (top 30%)
# clap_amplitude_threshold = 0.10
# clap_high_energy_threshold = 0.35
"#;

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
    pub last_track: Option<PathBuf>,
    pub play_audio: Option<bool>,

    pub window_width: Option<u32>,
    pub window_height: Option<u32>,
    pub fullscreen: Option<bool>,

    pub window_size: Option<usize>,
    pub hop_length: Option<usize>,

    // Detection thresholds (flattened for simpler TOML)
    pub beat_rise_threshold: Option<f32>,
    pub beat_cooldown_secs: Option<f32>,
    pub drop_rise_threshold: Option<f32>,
    pub drop_cooldown_secs: Option<f32>,
    pub treble_rise_threshold: Option<f32>,
    pub clap_amplitude_threshold: Option<f32>,
    pub clap_high_energy_threshold: Option<f32>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".bloom-viz.toml"))
    }

    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No home directory, using default settings");
                Self::default()
            }
        }
    }

    /// Read `path`, writing the commented template first if it is missing
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            match fs::write(path, CONFIG_TEMPLATE) {
                Ok(()) => log::info!("Created config template at {}", path.display()),
                Err(e) => log::warn!("Could not write config template {}: {}", path.display(), e),
            }
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                return Self::default();
            }
        };

        Self::parse(&content).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &Path) {
        match toml::to_string(self) {
            Ok(content) => match fs::write(path, content) {
                Ok(()) => log::info!("Config saved to {}", path.display()),
                Err(e) => log::warn!("Could not save config {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }

    pub fn set_last_track(&mut self, track: &Path) {
        if self.last_track.as_deref() == Some(track) {
            return;
        }
        self.last_track = Some(track.to_path_buf());
        self.save();
    }

    pub fn play_audio(&self) -> bool {
        self.play_audio.unwrap_or(true)
    }

    pub fn fullscreen(&self) -> bool {
        self.fullscreen.unwrap_or(false)
    }

    /// Window size in points, never smaller than 320x240
    pub fn window_dimensions(&self) -> (u32, u32) {
        (
            self.window_width.unwrap_or(DEFAULT_WINDOW_WIDTH).max(320),
            self.window_height.unwrap_or(DEFAULT_WINDOW_HEIGHT).max(240),
        )
    }

    /// Get detection configuration with defaults
    pub fn detection(&self) -> DetectionConfig {
        DetectionConfig {
            beat_rise_threshold: self.beat_rise_threshold,
            beat_cooldown_secs: self.beat_cooldown_secs,
            drop_rise_threshold: self.drop_rise_threshold,
            drop_cooldown_secs: self.drop_cooldown_secs,
            treble_rise_threshold: self.treble_rise_threshold,
            clap_amplitude_threshold: self.clap_amplitude_threshold,
            clap_high_energy_threshold: self.clap_high_energy_threshold,
        }
    }

    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            window_size: self.window_size,
            hop_length: self.hop_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::parse(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.play_audio());
        assert_eq!(config.window_dimensions(), (1280, 720));
        assert_eq!(config.detection(), DetectionConfig::default());
    }

    #[test]
    fn test_thresholds_flow_into_detection() {
        let config = Config::parse(
            r#"
            beat_rise_threshold = 0.25
            drop_cooldown_secs = 1.5
            hop_length = 256
            play_audio = false
            "#,
        )
        .unwrap();

        let detection = config.detection();
        assert_eq!(detection.beat_rise_threshold(), 0.25);
        assert_eq!(detection.drop_cooldown_secs(), 1.5);
        assert_eq!(detection.drop_rise_threshold(), 0.32);
        assert_eq!(config.analysis().hop_length(), 256);
        assert_eq!(config.analysis().window_size(), 2048);
        assert!(!config.play_audio());
    }

    #[test]
    fn test_tiny_window_is_clamped() {
        let config = Config {
            window_width: Some(10),
            window_height: Some(10),
            ..Default::default()
        };
        assert_eq!(config.window_dimensions(), (320, 240));
    }

    #[test]
    fn test_load_from_writes_template_and_survives_garbage() {
        let dir = std::env::temp_dir().join(format!("bloom-viz-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let _ = fs::remove_file(&path);

        assert_eq!(Config::load_from(&path), Config::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);

        fs::write(&path, "beat_rise_threshold = \"loud\"").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());

        let saved = Config {
            last_track: Some(PathBuf::from("/music/a.flac")),
            ..Default::default()
        };
        saved.save_to(&path);
        assert_eq!(Config::load_from(&path), saved);

        fs::remove_dir_all(&dir).unwrap();
    }
}
