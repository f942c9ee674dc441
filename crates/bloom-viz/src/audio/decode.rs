//! Audio file decoding.
//!
//! Any container/codec symphonia knows is read in full, downmixed to mono
//! and peak-normalized before the visualizer ever sees it.

use anyhow::{Context, Result};
use bloom_viz_core::AudioBuffer;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

pub fn decode_file(path: &Path) -> Result<AudioBuffer> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Unsupported audio format: {}", path.display()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio tracks found")?;

    let track_id = track.id;
    let mut channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track.codec_params.sample_rate.context("Unknown sample rate")?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e).context("Failed to read audio packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(SymphoniaError::DecodeError(_)) => {
                skipped_packets += 1;
                continue;
            }
            Err(e) => return Err(e).context("Failed to decode audio packet"),
        };

        let spec = *decoded.spec();
        channels = spec.channels.count().max(1);

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sample_buf.samples());
    }

    anyhow::ensure!(
        !interleaved.is_empty(),
        "No audio samples decoded from {}",
        path.display()
    );
    if skipped_packets > 0 {
        log::warn!("Skipped {} corrupt packets in {}", skipped_packets, path.display());
    }

    let track = AudioBuffer::from_interleaved(&interleaved, channels, sample_rate)
        .with_context(|| format!("Invalid audio in {}", path.display()))?;

    log::info!(
        "Decoded {}: {} samples, {}Hz, {} ch, {:.1}s",
        path.display(),
        track.len(),
        track.sample_rate(),
        channels,
        track.duration_secs()
    );

    Ok(track)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    /// Minimal 16-bit PCM WAV file
    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: &[Vec<i16>]) {
        let data_len = (frames.len() * channels as usize * 2) as u32;
        let block_align = channels * 2;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
        bytes.extend_from_slice(&block_align.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for frame in frames {
            for sample in frame {
                bytes.extend_from_slice(&sample.to_le_bytes());
            }
        }
        fs::write(path, bytes).unwrap();
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bloom-viz-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_stereo_wav_is_downmixed_and_normalized() {
        let path = temp_path("stereo.wav");
        // Channels average to 0.25 and -0.25 of full scale
        let frames: Vec<Vec<i16>> = (0..4410)
            .map(|i| if i % 2 == 0 { vec![4096, 12288] } else { vec![-4096, -12288] })
            .collect();
        write_wav(&path, 2, 22_050, &frames);

        let track = decode_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(track.sample_rate(), 22_050);
        assert_eq!(track.len(), 4410);
        assert!((track.samples()[0] - 1.0).abs() < 1e-3);
        assert!((track.samples()[1] + 1.0).abs() < 1e-3);
        assert!((track.duration_secs() - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = decode_file(Path::new("/definitely/not/here.mp3")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to open audio file"));
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let path = temp_path("garbage.wav");
        fs::write(&path, b"this is not audio at all").unwrap();
        let result = decode_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
