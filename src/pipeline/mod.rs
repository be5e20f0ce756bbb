//! Pipeline orchestrator and the session view the UI renders.
//!
//! # Architecture
//!
//! ```text
//! DocQaApp (egui, UI thread)
//!        │  PipelineCommand (mpsc)
//!        ▼
//! PipelineOrchestrator::run()  ← async tokio task
//!        │
//!        ├─ Ask { query, tone }
//!        │     ├─ PromptBuilder + AnswerGenerator    → Generating
//!        │     ├─ SpeechSynthesizer                  → Synthesizing
//!        │     └─ spawn_blocking(HistoryStore)       → Recording
//!        │
//!        └─ RefreshHistory → spawn_blocking(HistoryStore::load)
//!        │
//!        │  PipelineResult (mpsc)
//!        ▼
//! SessionView::apply() ←── polled by egui update() each frame
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{
    PipelineCommand, PipelineError, PipelineOrchestrator, PipelineResult, EMPTY_DOCUMENT_NOTICE,
    EMPTY_QUERY_NOTICE,
};
pub use state::{PipelineState, PresenterState, SessionView, ShownAnswer};
