//! Track playback on the default output device.
//!
//! The decoded mono track is played once from the start; every output
//! channel gets the same sample. The device rate rarely matches the file's,
//! so the callback reads the track through a linear-interpolating cursor.

use anyhow::{Context, Result};
use bloom_viz_core::AudioBuffer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::Arc;

/// Reads a mono track at an arbitrary output rate, then silence
pub struct TrackReader {
    track: Arc<AudioBuffer>,
    position: f64,
    step: f64,
}

impl TrackReader {
    pub fn new(track: Arc<AudioBuffer>, output_rate: u32) -> Self {
        let step = track.sample_rate() as f64 / output_rate.max(1) as f64;
        Self {
            track,
            position: 0.0,
            step,
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let samples = self.track.samples();
        let i = self.position as usize;
        let Some(&a) = samples.get(i) else {
            return 0.0;
        };
        let b = samples.get(i + 1).copied().unwrap_or(a);
        let t = (self.position - i as f64) as f32;
        self.position += self.step;
        a + (b - a) * t
    }

    pub fn is_finished(&self) -> bool {
        self.position as usize >= self.track.len()
    }
}

/// Owns the output stream; dropping it stops playback
pub struct Playback {
    _stream: Stream,
}

impl Playback {
    pub fn start(track: Arc<AudioBuffer>) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("No default audio output device")?;
        let supported = device
            .default_output_config()
            .context("Failed to get output device config")?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        log::info!(
            "Playback on {} ({} Hz, {} ch, {:?})",
            device.name().unwrap_or_else(|_| "unknown device".into()),
            config.sample_rate.0,
            config.channels,
            sample_format
        );

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, track)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, track)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, track)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &config, track)?,
            other => anyhow::bail!("Unsupported output sample format {:?}", other),
        };
        stream.play().context("Failed to start output stream")?;

        Ok(Self { _stream: stream })
    }
}

fn build_stream<T>(device: &Device, config: &StreamConfig, track: Arc<AudioBuffer>) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let mut reader = TrackReader::new(track, config.sample_rate.0);

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let value = T::from_sample(reader.next_sample());
                    frame.iter_mut().for_each(|s| *s = value);
                }
            },
            |err| log::error!("Audio output stream error: {}", err),
            None,
        )
        .context("Failed to build output stream")?;

    Ok(stream)
}
