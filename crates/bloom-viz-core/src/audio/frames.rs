//! Sliding analysis window over a loaded track.
//!
//! The cursor loops over the whole track independently of the playback
//! position, so over a long session the analysis can drift out of phase
//! with what is audible.

use std::sync::Arc;

use crate::track::AudioBuffer;

/// Hop-advancing, looping window over a mono buffer
pub struct FrameExtractor {
    track: Option<Arc<AudioBuffer>>,
    cursor: usize,
    window_size: usize,
    hop_length: usize,
}

impl FrameExtractor {
    pub fn new(track: Option<Arc<AudioBuffer>>, window_size: usize, hop_length: usize) -> Self {
        Self {
            track,
            cursor: 0,
            window_size: window_size.max(1),
            hop_length: hop_length.max(1),
        }
    }

    /// Next `window_size` samples starting at the cursor, or the shorter tail
    /// near the end of the track. Empty when no track (or an empty one) is
    /// loaded. The cursor always advances by `hop_length` and wraps to 0 once
    /// it reaches the end.
    pub fn next_waveform(&mut self) -> &[f32] {
        let Some(track) = self.track.as_deref() else {
            return &[];
        };
        let samples = track.samples();
        if samples.is_empty() {
            return &[];
        }

        let start = self.cursor.min(samples.len());
        let end = (start + self.window_size).min(samples.len());

        self.cursor += self.hop_length;
        if self.cursor >= samples.len() {
            self.cursor = 0;
        }

        &samples[start..end]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.track.as_ref().map(|t| t.sample_rate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Arc<AudioBuffer> {
        let samples = (0..len).map(|i| i as f32 / len as f32).collect();
        Arc::new(AudioBuffer::new(samples, 44100).unwrap())
    }

    #[test]
    fn test_no_track_yields_empty() {
        let mut frames = FrameExtractor::new(None, 2048, 512);
        assert!(frames.next_waveform().is_empty());
        assert_eq!(frames.cursor(), 0);
    }

    #[test]
    fn test_empty_track_yields_empty() {
        let empty = Arc::new(AudioBuffer::new(Vec::new(), 44100).unwrap());
        let mut frames = FrameExtractor::new(Some(empty), 2048, 512);
        assert!(frames.next_waveform().is_empty());
    }

    #[test]
    fn test_full_windows_and_hop() {
        let track = ramp(8192);
        let mut frames = FrameExtractor::new(Some(track.clone()), 2048, 512);

        let first = frames.next_waveform().to_vec();
        assert_eq!(first.len(), 2048);
        assert_eq!(first[0], track.samples()[0]);
        assert_eq!(frames.cursor(), 512);

        let second = frames.next_waveform();
        assert_eq!(second.len(), 2048);
        assert_eq!(second[0], track.samples()[512]);
        assert_eq!(frames.cursor(), 1024);
    }

    #[test]
    fn test_tail_is_short_then_wraps() {
        let track = ramp(3000);
        let mut frames = FrameExtractor::new(Some(track), 2048, 512);

        // cursor: 0, 512, 1024, 1536, 2048, 2560 -> wrap
        let lens: Vec<usize> = (0..6).map(|_| frames.next_waveform().len()).collect();
        assert_eq!(lens, vec![2048, 2048, 1976, 1464, 952, 440]);
        assert_eq!(frames.cursor(), 0);

        assert_eq!(frames.next_waveform().len(), 2048);
        assert_eq!(frames.cursor(), 512);
    }

    #[test]
    fn test_looping_is_periodic() {
        let track = ramp(4096);
        let mut frames = FrameExtractor::new(Some(track), 1024, 512);

        let first_pass: Vec<Vec<f32>> = (0..8).map(|_| frames.next_waveform().to_vec()).collect();
        let second_pass: Vec<Vec<f32>> = (0..8).map(|_| frames.next_waveform().to_vec()).collect();
        assert_eq!(first_pass, second_pass);
    }
}
