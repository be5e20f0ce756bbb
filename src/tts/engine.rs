//! Core TTS engine trait and implementations.
//!
//! # Overview
//!
//! [`SpeechSynthesizer`] is the public interface used by the pipeline.  It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn SpeechSynthesizer>`.
//!
//! [`EspeakSynthesizer`] is the production implementation.  It runs the
//! configured `espeak-ng` executable, writing a WAV file into a freshly
//! allocated temporary path, and validates the result with `hound`.
//!
//! [`MockSynthesizer`] (available under `#[cfg(test)]`) returns a
//! pre-configured result without spawning anything.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::config::TtsConfig;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

/// All errors that can arise from speech synthesis.
#[derive(Debug, Error)]
pub enum TtsError {
    /// Nothing to say.
    #[error("cannot synthesize empty text")]
    EmptyText,

    /// The output file could not be allocated.
    #[error("failed to create audio file: {0}")]
    TempFile(#[source] std::io::Error),

    /// The synthesizer executable could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the text to the synthesizer failed.
    #[error("failed to send text to synthesizer: {0}")]
    Stdin(#[source] std::io::Error),

    /// Synthesis did not finish within the configured limit.
    #[error("speech synthesis timed out after {0} s")]
    Timeout(u64),

    /// The synthesizer exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The produced file is not a usable WAV.
    #[error("synthesized audio is invalid: {0}")]
    InvalidOutput(String),
}

// ---------------------------------------------------------------------------
// SynthesizedAudio
// ---------------------------------------------------------------------------

/// A speech file ready for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    /// Location of the WAV file.  The file is never deleted by the
    /// application.
    pub path: PathBuf,
    /// Playback length in seconds.
    pub duration_secs: f32,
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for text-to-speech engines.
///
/// # Contract
///
/// Every successful call writes a new, distinct file; no file is reused.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, TtsError>;
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Create a new, uniquely named `answer-*.wav` file in `dir` and keep it.
pub fn allocate_audio_file(dir: &Path) -> Result<PathBuf, TtsError> {
    let file = tempfile::Builder::new()
        .prefix("answer-")
        .suffix(".wav")
        .tempfile_in(dir)
        .map_err(TtsError::TempFile)?;
    file.into_temp_path()
        .keep()
        .map_err(|e| TtsError::TempFile(e.error))
}

/// Validate a WAV file and return its duration in seconds.
pub fn probe_wav(path: &Path) -> Result<f32, TtsError> {
    let reader =
        hound::WavReader::open(path).map_err(|e| TtsError::InvalidOutput(e.to_string()))?;
    let spec = reader.spec();
    let frames = reader.duration();
    if frames == 0 || spec.sample_rate == 0 {
        return Err(TtsError::InvalidOutput("no audio samples".into()));
    }
    Ok(frames as f32 / spec.sample_rate as f32)
}

// ---------------------------------------------------------------------------
// EspeakSynthesizer
// ---------------------------------------------------------------------------

/// Speech synthesis through the `espeak-ng` command-line tool.
///
/// Text goes in on stdin (`--stdin`) so answers that begin with `-` are never
/// mistaken for options.
#[derive(Debug, Clone)]
pub struct EspeakSynthesizer {
    config: TtsConfig,
}

impl EspeakSynthesizer {
    pub fn from_config(config: &TtsConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn output_dir(&self) -> PathBuf {
        self.config
            .output_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    fn command(&self, out: &Path) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.config.program);
        cmd.arg("-v")
            .arg(&self.config.voice)
            .arg("-s")
            .arg(self.config.words_per_minute.to_string())
            .arg("-w")
            .arg(out)
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, text: &str, out: &Path) -> Result<f32, TtsError> {
        let mut child = self
            .command(out)
            .spawn()
            .map_err(|source| TtsError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let limit = Duration::from_secs(self.config.timeout_secs);

        let output = tokio::time::timeout(limit, async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(text.as_bytes()).await.map_err(TtsError::Stdin)?;
                // Dropping stdin closes the pipe so the synthesizer sees EOF.
            }
            child
                .wait_with_output()
                .await
                .map_err(|source| TtsError::Spawn {
                    program: self.config.program.clone(),
                    source,
                })
        })
        .await
        .map_err(|_| TtsError::Timeout(self.config.timeout_secs))??;

        if !output.status.success() {
            return Err(TtsError::Failed {
                program: self.config.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        probe_wav(out)
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio, TtsError> {
        if text.trim().is_empty() {
            return Err(TtsError::EmptyText);
        }

        let path = allocate_audio_file(&self.output_dir())?;
        log::debug!("tts: synthesizing {} chars into {}", text.len(), path.display());

        match self.run(text, &path).await {
            Ok(duration_secs) => Ok(SynthesizedAudio {
                path,
                duration_secs,
            }),
            Err(e) => {
                let _ = std::fs::remove_file(&path);
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MockSynthesizer (test only)
// ---------------------------------------------------------------------------

/// Stub synthesizer that returns a fixed outcome.
#[cfg(test)]
pub struct MockSynthesizer {
    result: Option<SynthesizedAudio>,
}

#[cfg(test)]
impl MockSynthesizer {
    /// Always succeeds with `path` and a one-second duration.
    pub fn ok(path: impl Into<PathBuf>) -> Self {
        Self {
            result: Some(SynthesizedAudio {
                path: path.into(),
                duration_secs: 1.0,
            }),
        }
    }

    /// Always fails with [`TtsError::InvalidOutput`].
    pub fn failing() -> Self {
        Self { result: None }
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<SynthesizedAudio, TtsError> {
        self.result
            .clone()
            .ok_or_else(|| TtsError::InvalidOutput("mock failure".into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
