//! Audio side of the presenter: speaker output and the amplitude envelope.
//!
//! # Pipeline
//!
//! ```text
//! answer-*.wav ─┬→ rodio Decoder → Sink → speakers
//!               └→ read_mono (hound) → envelope (UI bars)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use doc_qa::audio::AudioPlayer;
//!
//! let player = AudioPlayer::new().unwrap();
//! let handle = player.play(Path::new("/tmp/answer.wav"), 2.5).unwrap(); // drop handle → stops playback
//!
//! while !handle.is_finished() {
//!     std::thread::sleep(std::time::Duration::from_millis(50));
//! }
//! ```

pub mod playback;
pub mod wav;

pub use playback::{AudioPlayer, PlaybackError, PlaybackHandle};
pub use wav::{envelope, read_mono};
