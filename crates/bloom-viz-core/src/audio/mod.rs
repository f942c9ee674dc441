//! Audio side of the pipeline: windowing, spectrum and event detection.

pub mod detectors;
pub mod frames;
pub mod spectrum;

pub use detectors::{amplitude, band_mean, ClapDetector, DetectorBank, FrameEvents, RiseDetector};
pub use frames::FrameExtractor;
pub use spectrum::{SpectralAnalyzer, SPECTRUM_BINS};
