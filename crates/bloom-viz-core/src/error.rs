use thiserror::Error;

/// Reasons a decoded buffer cannot be turned into a track
#[derive(Debug, Error, PartialEq)]
pub enum TrackError {
    #[error("sample rate must be greater than zero")]
    ZeroSampleRate,

    #[error("sample {index} is not a finite number")]
    NonFiniteSample { index: usize },
}
