//! Audio-reactive animation core for bloom-viz
//!
//! The crate is headless: it reads a mono [`AudioBuffer`], derives a waveform
//! window and a 128-bin spectrum every frame, runs the beat / bass-drop /
//! treble-burst / clap detectors over them and paints the resulting
//! animation onto any [`Surface`] the host provides.
//!
//! ```ignore
//! let mut viz: Visualizer = Visualizer::new(
//!     Some(track),
//!     Viewport::new(1280.0, 720.0),
//!     &DetectionConfig::default(),
//!     &AnalysisConfig::default(),
//!     StdRng::seed_from_u64(42),
//! );
//! loop {
//!     let events = viz.advance_and_render(&mut surface);
//! }
//! ```

pub mod audio;
pub mod config;
pub mod draw;
pub mod error;
pub mod track;
pub mod viewport;
pub mod visual;
pub mod visualizer;

pub use audio::FrameEvents;
pub use config::{AnalysisConfig, DetectionConfig};
pub use draw::{Blend, Rgba, Surface};
pub use error::TrackError;
pub use track::AudioBuffer;
pub use viewport::Viewport;
pub use visualizer::{TriggerCounts, Visualizer};

/// Point type used by [`Surface`]
pub use glam::Vec2;
