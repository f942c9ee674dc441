//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "bloom-viz", version, about = "Audio-reactive visualizer")]
pub struct Cli {
    /// Audio file to play (mp3, flac, ogg, wav, aac). Defaults to the last loaded track.
    pub track: Option<PathBuf>,

    /// Start in a window
    #[arg(short, long, conflicts_with = "fullscreen")]
    pub windowed: bool,

    /// Start fullscreen
    #[arg(long)]
    pub fullscreen: bool,

    /// Window width (overrides the config file)
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height (overrides the config file)
    #[arg(long)]
    pub height: Option<u32>,

    /// Seed for particle randomness, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Analyse and animate without playing the audio
    #[arg(long)]
    pub mute: bool,

    /// Show the stats overlay on startup
    #[arg(long)]
    pub stats: bool,
}

impl Cli {
    /// Explicit flags win over the config file's setting
    pub fn fullscreen(&self, config_default: bool) -> bool {
        if self.fullscreen {
            true
        } else if self.windowed {
            false
        } else {
            config_default
        }
    }
}
