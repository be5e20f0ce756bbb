//! Sample reading and the amplitude envelope shown under the audio player.
//!
//! Playback itself goes through `rodio`; this module only needs the samples
//! to draw the bars.

use std::io::Read;
use std::path::Path;

use super::playback::PlaybackError;

/// Read a WAV file (8/16/24/32-bit integer or 32-bit float) as mono `f32`
/// samples in `[-1.0, 1.0]`.
pub fn read_mono(path: &Path) -> Result<Vec<f32>, PlaybackError> {
    let reader = hound::WavReader::open(path)?;
    read_reader(reader)
}

fn read_reader<R: Read>(mut reader: hound::WavReader<R>) -> Result<Vec<f32>, PlaybackError> {
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(downmix(&interleaved, spec.channels))
}

/// Average interleaved frames down to one channel.
fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// envelope
// ---------------------------------------------------------------------------

/// RMS envelope of `samples` in `bars` equal chunks, scaled so the loudest
/// bar is `1.0`.
///
/// Silent or empty input yields all zeros; `bars == 0` yields an empty vec.
///
/// ```rust
/// use doc_qa::audio::envelope;
///
/// let quiet_then_loud: Vec<f32> = [vec![0.1_f32; 100], vec![0.4_f32; 100]].concat();
/// let bars = envelope(&quiet_then_loud, 2);
/// assert!((bars[0] - 0.25).abs() < 1e-5);
/// assert!((bars[1] - 1.0).abs() < 1e-5);
/// ```
pub fn envelope(samples: &[f32], bars: usize) -> Vec<f32> {
    if bars == 0 {
        return Vec::new();
    }
    if samples.is_empty() {
        return vec![0.0; bars];
    }

    let chunk_size = samples.len().div_ceil(bars).max(1);
    let mut out: Vec<f32> = samples
        .chunks(chunk_size)
        .map(|chunk| (chunk.iter().map(|s| s * s).sum::<f32>() / chunk.len() as f32).sqrt())
        .collect();
    out.resize(bars, 0.0);

    let peak = out.iter().copied().fold(0.0_f32, f32::max);
    if peak > 0.0 {
        out.iter_mut().for_each(|b| *b /= peak);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn wav_bytes<S: hound::Sample + Copy>(spec: hound::WavSpec, samples: &[S]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    fn read_bytes(bytes: Vec<u8>) -> Vec<f32> {
        read_reader(hound::WavReader::new(Cursor::new(bytes)).unwrap()).unwrap()
    }

    #[test]
    fn decodes_16_bit_mono() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, &[0_i16, 16_384, -16_384, i16::MAX]);

        let samples = read_bytes(bytes);
        assert_eq!(samples.len(), 4);
        assert!((samples[1] - 0.5).abs() < 1e-4);
        assert!((samples[2] + 0.5).abs() < 1e-4);
        assert!(samples[3] <= 1.0);
    }

    #[test]
    fn decodes_float_stereo_to_mono() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let bytes = wav_bytes(spec, &[0.2_f32, 0.4, -1.0, 1.0]);

        let samples = read_bytes(bytes);
        assert_eq!(samples.len(), 2);
        assert!((samples[0] - 0.3).abs() < 1e-6);
        assert!(samples[1].abs() < 1e-6);
    }

    #[test]
    fn downmix_edge_cases() {
        assert!(downmix(&[0.1, 0.2], 0).is_empty());
        assert_eq!(downmix(&[0.1, 0.2], 1), vec![0.1, 0.2]);
        // A trailing partial frame is dropped.
        assert_eq!(downmix(&[0.5, -0.5, 0.9], 2), vec![0.0]);
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_mono(&dir.path().join("nope.wav")).is_err());
    }

    #[test]
    fn envelope_has_requested_bars_and_unit_peak() {
        let samples: Vec<f32> = (0..10_000).map(|i| (i as f32 * 0.01).sin() * 0.3).collect();
        let bars = envelope(&samples, 40);
        assert_eq!(bars.len(), 40);
        let peak = bars.iter().copied().fold(0.0_f32, f32::max);
        assert!((peak - 1.0).abs() < 1e-5);
        assert!(bars.iter().all(|&b| (0.0..=1.0).contains(&b)));
    }

    #[test]
    fn envelope_edge_cases() {
        assert!(envelope(&[0.5; 10], 0).is_empty());
        assert_eq!(envelope(&[], 3), vec![0.0; 3]);
        assert_eq!(envelope(&[0.0; 30], 3), vec![0.0; 3]);
        // Fewer samples than bars pads with silence.
        assert_eq!(envelope(&[0.5, 0.5], 4), vec![1.0, 1.0, 0.0, 0.0]);
    }
}
