//! TTS (Text-to-Speech) module.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use doc_qa::config::TtsConfig;
//! use doc_qa::tts::{EspeakSynthesizer, SpeechSynthesizer};
//!
//! # async fn example() {
//! let synth = EspeakSynthesizer::from_config(&TtsConfig::default());
//! let audio = synth.synthesize("Pakistan is a country in South Asia.").await.unwrap();
//! println!("{} ({:.1}s)", audio.path.display(), audio.duration_secs);
//! # }
//! ```

pub mod engine;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{
    allocate_audio_file, probe_wav, EspeakSynthesizer, SpeechSynthesizer, SynthesizedAudio,
    TtsError,
};

// test-only re-export so the pipeline test module can import MockSynthesizer
// without reaching into `tts::engine`.
#[cfg(test)]
pub use engine::MockSynthesizer;
