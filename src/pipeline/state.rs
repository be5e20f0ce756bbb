//! Pipeline state machine and the UI-side session view.
//!
//! [`PipelineState`] tracks what the orchestrator is doing; the UI disables
//! the ask button while it is busy.  [`SessionView`] is everything the window
//! shows, folded from the [`PipelineResult`] stream by [`SessionView::apply`].
//! It holds no egui types so it can be tested without a window.

use crate::history::AnswerRecord;
use crate::llm::Tone;
use crate::tts::SynthesizedAudio;

use super::runner::PipelineResult;

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// States of one question/answer interaction.
///
/// ```text
/// Idle ──ask──▶ Generating ──answer──▶ Synthesizing ──audio──▶ Recording ──▶ Idle
///                   │                       │
///                   └──error / rejected─────┴──────────────────────────────▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Waiting for a question.
    #[default]
    Idle,
    /// The model is producing an answer.
    Generating,
    /// The answer is being turned into speech.
    Synthesizing,
    /// The interaction is being appended to the history store.
    Recording,
}

impl PipelineState {
    /// Returns `true` while an interaction is in flight.
    ///
    /// ```
    /// use doc_qa::pipeline::PipelineState;
    ///
    /// assert!(!PipelineState::Idle.is_busy());
    /// assert!(PipelineState::Generating.is_busy());
    /// assert!(PipelineState::Synthesizing.is_busy());
    /// assert!(PipelineState::Recording.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        !matches!(self, PipelineState::Idle)
    }

    /// Short label for the busy indicator.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Ready",
            PipelineState::Generating => "Generating answer…",
            PipelineState::Synthesizing => "Synthesizing speech…",
            PipelineState::Recording => "Saving to history…",
        }
    }
}

// ---------------------------------------------------------------------------
// PresenterState
// ---------------------------------------------------------------------------

/// Whether a result has been shown in this session.  There is no way back to
/// `NoResultShown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenterState {
    #[default]
    NoResultShown,
    ResultShown,
}

// ---------------------------------------------------------------------------
// SessionView
// ---------------------------------------------------------------------------

/// The result of the latest interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ShownAnswer {
    /// A genuine model answer.
    Answer { text: String, tone: Tone },
    /// The message that replaces an answer when generation failed.
    Failure { message: String },
}

#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub pipeline: PipelineState,
    pub presenter: PresenterState,

    pub answer: Option<ShownAnswer>,
    pub audio: Option<SynthesizedAudio>,

    /// Why the last request did not run.
    pub notice: Option<String>,
    /// Speech synthesis failure for the current answer.
    pub error: Option<String>,
    /// Non-fatal history problems.
    pub warnings: Vec<String>,

    /// `None` until the first load, and while no store exists.
    pub history: Option<Vec<AnswerRecord>>,
    pub history_loaded: bool,
}

impl SessionView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user pressed the ask button: drop the previous interaction's
    /// output and show the busy indicator until the orchestrator reports.
    pub fn begin_interaction(&mut self) {
        self.pipeline = PipelineState::Generating;
        self.answer = None;
        self.audio = None;
        self.notice = None;
        self.error = None;
        self.warnings.clear();
    }

    /// Fold one orchestrator message into the view.
    pub fn apply(&mut self, result: PipelineResult) {
        match result {
            PipelineResult::StateChanged(state) => self.pipeline = state,
            PipelineResult::Rejected { reason } => self.notice = Some(reason),
            PipelineResult::AnswerReady { answer, tone } => {
                self.answer = Some(ShownAnswer::Answer { text: answer, tone });
                self.presenter = PresenterState::ResultShown;
            }
            PipelineResult::AnswerFailed { message } => {
                self.answer = Some(ShownAnswer::Failure { message });
                self.presenter = PresenterState::ResultShown;
            }
            PipelineResult::SpeechReady(audio) => self.audio = Some(audio),
            PipelineResult::SpeechFailed { message } => self.error = Some(message),
            PipelineResult::HistoryWarning { message } => self.warnings.push(message),
            PipelineResult::HistoryLoaded(records) => {
                self.history = records;
                self.history_loaded = true;
            }
            PipelineResult::Finished => self.pipeline = PipelineState::Idle,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pipeline.is_busy()
    }

    /// The answer section's content, `None` until a result has been shown.
    pub fn shown_answer(&self) -> Option<&ShownAnswer> {
        match self.presenter {
            PresenterState::NoResultShown => None,
            PresenterState::ResultShown => self.answer.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
