//! Speaker output via `rodio`.
//!
//! [`AudioPlayer`] owns the default output stream.  [`AudioPlayer::play`]
//! decodes a synthesized WAV file into a fresh [`rodio::Sink`]; the returned
//! [`PlaybackHandle`] is a RAII guard, so dropping it stops the sound.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use thiserror::Error;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or playing audio.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("cannot open audio output: {0}")]
    Stream(#[from] rodio::StreamError),

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode audio: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    #[error("failed to read samples: {0}")]
    Samples(#[from] hound::Error),
}

// ---------------------------------------------------------------------------
// PlaybackHandle
// ---------------------------------------------------------------------------

/// One clip playing through its own sink.
pub struct PlaybackHandle {
    sink: Sink,
    total: Duration,
}

impl PlaybackHandle {
    /// Fraction played, in `[0.0, 1.0]`.
    pub fn progress(&self) -> f32 {
        fraction(self.sink.get_pos(), self.total)
    }

    pub fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.sink.stop();
    }
}

// ---------------------------------------------------------------------------
// AudioPlayer
// ---------------------------------------------------------------------------

/// The default output stream.  Sinks connect to its mixer.
pub struct AudioPlayer {
    stream: OutputStream,
}

impl AudioPlayer {
    /// Open the system default output device.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::Stream`] when no output device can be opened.
    pub fn new() -> Result<Self, PlaybackError> {
        let stream = OutputStreamBuilder::open_default_stream()?;
        log::debug!("audio: default output stream opened");
        Ok(Self { stream })
    }

    /// Start playing the WAV file at `path` from the beginning.
    ///
    /// `duration_secs` is the clip length measured when it was synthesized;
    /// it scales [`PlaybackHandle::progress`].
    pub fn play(&self, path: &Path, duration_secs: f32) -> Result<PlaybackHandle, PlaybackError> {
        let file = File::open(path).map_err(|source| PlaybackError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let source = Decoder::new(BufReader::new(file))?;

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        log::debug!("audio: playing {}", path.display());

        Ok(PlaybackHandle {
            sink,
            total: Duration::from_secs_f32(duration_secs.max(0.0)),
        })
    }
}

fn fraction(position: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (position.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_of_clip_played() {
        let total = Duration::from_secs(4);
        assert_eq!(fraction(Duration::ZERO, total), 0.0);
        assert!((fraction(Duration::from_secs(1), total) - 0.25).abs() < 1e-6);
        assert_eq!(fraction(Duration::from_secs(9), total), 1.0);
    }

    #[test]
    fn empty_clip_counts_as_played() {
        assert_eq!(fraction(Duration::from_millis(10), Duration::ZERO), 1.0);
    }

    #[test]
    fn open_error_names_the_file() {
        let err = PlaybackError::Open {
            path: PathBuf::from("/tmp/answer-x.wav"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("cannot open /tmp/answer-x.wav"));
    }
}
