//! Pipeline orchestrator: drives the question → answer → speech → history loop.
//!
//! [`PipelineOrchestrator`] receives [`PipelineCommand`]s from the UI over a
//! `tokio::sync::mpsc` channel and reports progress as [`PipelineResult`]s.
//!
//! # Pipeline flow
//!
//! ```text
//! PipelineCommand::Ask { query, tone }
//!   ├─ empty document / rejected empty query → Rejected
//!   └─▶ PromptBuilder::build → AnswerGenerator::generate     [Generating]
//!         ├─ Err → AnswerFailed (shown, not spoken, not recorded)
//!         └─ Ok  → AnswerReady
//!               └─▶ SpeechSynthesizer::synthesize            [Synthesizing]
//!                     ├─ Err → SpeechFailed (interaction ends, no record)
//!                     └─ Ok  → SpeechReady
//!                           └─▶ spawn_blocking(HistoryStore::append)  [Recording]
//!                                 └─▶ spawn_blocking(HistoryStore::load) → HistoryLoaded
//!
//! PipelineCommand::RefreshHistory
//!   └─▶ spawn_blocking(HistoryStore::load) → HistoryLoaded
//! ```
//!
//! Commands are handled strictly one at a time.  History file I/O runs on
//! `tokio::task::spawn_blocking` so the async runtime never stalls.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::EmptyQueryPolicy;
use crate::document::DocumentContent;
use crate::history::{AnswerRecord, HistoryError, HistoryStore};
use crate::llm::{AnswerGenerator, PromptBuilder, Tone};
use crate::markdown::strip_emphasis;
use crate::tts::{SpeechSynthesizer, SynthesizedAudio};

use super::state::PipelineState;

/// Shown when the ask button is pressed with an empty query field.
pub const EMPTY_QUERY_NOTICE: &str = "Please enter a question.";

/// Shown when the document produced no text.
pub const EMPTY_DOCUMENT_NOTICE: &str = "The document contains no readable text.";

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Commands sent from the UI thread to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineCommand {
    /// Answer `query` about the document in the given tone.
    Ask { query: String, tone: Tone },
    /// Re-read the history store.
    RefreshHistory,
}

/// Progress and results delivered from the orchestrator to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineResult {
    StateChanged(PipelineState),
    /// The request was refused before anything ran.
    Rejected { reason: String },
    AnswerReady { answer: String, tone: Tone },
    /// Generation failed; `message` replaces the answer.
    AnswerFailed { message: String },
    SpeechReady(SynthesizedAudio),
    SpeechFailed { message: String },
    /// Saving or loading history failed.  The answer is unaffected.
    HistoryWarning { message: String },
    /// Full history in insertion order, `None` when no store exists yet.
    HistoryLoaded(Option<Vec<AnswerRecord>>),
    /// The question is done; the orchestrator is idle again.
    Finished,
}

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Failures of the blocking history tasks.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    History(#[from] HistoryError),

    /// The blocking task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Drives every interaction of a session.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use doc_qa::config::{AppConfig, EmptyQueryPolicy};
/// use doc_qa::document::DocumentContent;
/// use doc_qa::history::HistoryStore;
/// use doc_qa::llm::{AnswerGenerator, GeminiClient, PromptBuilder, Tone};
/// use doc_qa::pipeline::{PipelineCommand, PipelineOrchestrator};
/// use doc_qa::tts::EspeakSynthesizer;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let orchestrator = PipelineOrchestrator::new(
///     Arc::new(DocumentContent::from_text("pakistan is a country in south asia")),
///     PromptBuilder::new(config.document.prompt_budget()),
///     AnswerGenerator::new(Arc::new(GeminiClient::from_config(&config.llm))),
///     Arc::new(EspeakSynthesizer::from_config(&config.tts)),
///     Arc::new(HistoryStore::open(config.history.resolved_file())),
///     EmptyQueryPolicy::Reject,
/// );
///
/// let (command_tx, command_rx) = tokio::sync::mpsc::channel(16);
/// let (result_tx, mut result_rx) = tokio::sync::mpsc::channel(64);
/// tokio::spawn(orchestrator.run(command_rx, result_tx));
///
/// command_tx
///     .send(PipelineCommand::Ask { query: "where is pakistan".into(), tone: Tone::Formal })
///     .await
///     .unwrap();
/// while let Some(result) = result_rx.recv().await {
///     println!("{result:?}");
/// }
/// # }
/// ```
pub struct PipelineOrchestrator {
    document: Arc<DocumentContent>,
    prompt: PromptBuilder,
    generator: AnswerGenerator,
    tts: Arc<dyn SpeechSynthesizer>,
    history: Arc<HistoryStore>,
    empty_query: EmptyQueryPolicy,
}

impl PipelineOrchestrator {
    pub fn new(
        document: Arc<DocumentContent>,
        prompt: PromptBuilder,
        generator: AnswerGenerator,
        tts: Arc<dyn SpeechSynthesizer>,
        history: Arc<HistoryStore>,
        empty_query: EmptyQueryPolicy,
    ) -> Self {
        Self {
            document,
            prompt,
            generator,
            tts,
            history,
            empty_query,
        }
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `command_rx` is closed.
    ///
    /// Send errors (UI gone) are ignored; the loop ends with the command
    /// channel.
    pub async fn run(
        self,
        mut command_rx: mpsc::Receiver<PipelineCommand>,
        result_tx: mpsc::Sender<PipelineResult>,
    ) {
        while let Some(command) = command_rx.recv().await {
            match command {
                PipelineCommand::Ask { query, tone } => {
                    self.handle_ask(query, tone, &result_tx).await;
                    let _ = result_tx.send(PipelineResult::Finished).await;
                }
                PipelineCommand::RefreshHistory => {
                    self.send_history(&result_tx).await;
                }
            }
        }

        log::info!("pipeline: command channel closed, orchestrator shutting down");
    }

    // -----------------------------------------------------------------------
    // Command handlers
    // -----------------------------------------------------------------------

    async fn handle_ask(&self, query: String, tone: Tone, tx: &mpsc::Sender<PipelineResult>) {
        if self.document.is_empty() {
            log::warn!("pipeline: document is empty, ignoring question");
            let _ = tx
                .send(PipelineResult::Rejected {
                    reason: EMPTY_DOCUMENT_NOTICE.into(),
                })
                .await;
            return;
        }

        if query.trim().is_empty() && self.empty_query == EmptyQueryPolicy::Reject {
            log::debug!("pipeline: empty query rejected");
            let _ = tx
                .send(PipelineResult::Rejected {
                    reason: EMPTY_QUERY_NOTICE.into(),
                })
                .await;
            return;
        }

        // ── 1. Answer ────────────────────────────────────────────────────
        let _ = tx
            .send(PipelineResult::StateChanged(PipelineState::Generating))
            .await;

        let prompt = self.prompt.build(self.document.text(), &query, Some(tone));
        log::debug!(
            "pipeline: asking {:?} ({}, prompt {} chars)",
            query,
            tone,
            prompt.chars().count()
        );

        let answer = match self.generator.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("pipeline: answer generation failed: {e}");
                let _ = tx
                    .send(PipelineResult::AnswerFailed {
                        message: e.user_message(),
                    })
                    .await;
                return;
            }
        };

        let _ = tx
            .send(PipelineResult::AnswerReady {
                answer: answer.clone(),
                tone,
            })
            .await;

        // ── 2. Speech ────────────────────────────────────────────────────
        let _ = tx
            .send(PipelineResult::StateChanged(PipelineState::Synthesizing))
            .await;

        match self.tts.synthesize(&strip_emphasis(&answer)).await {
            Ok(audio) => {
                log::debug!(
                    "pipeline: speech ready at {} ({:.1}s)",
                    audio.path.display(),
                    audio.duration_secs
                );
                let _ = tx.send(PipelineResult::SpeechReady(audio)).await;
            }
            Err(e) => {
                log::error!("pipeline: speech synthesis failed: {e}");
                let _ = tx
                    .send(PipelineResult::SpeechFailed {
                        message: format!("Error: speech synthesis failed: {e}"),
                    })
                    .await;
                return;
            }
        }

        // ── 3. History ───────────────────────────────────────────────────
        let _ = tx
            .send(PipelineResult::StateChanged(PipelineState::Recording))
            .await;

        let record = AnswerRecord::now(query, answer, tone);
        let store = Arc::clone(&self.history);
        match blocking(move || store.append(record)).await {
            Ok(count) => log::debug!("pipeline: history now has {count} records"),
            Err(e) => {
                log::warn!("pipeline: failed to save history: {e}");
                let _ = tx
                    .send(PipelineResult::HistoryWarning {
                        message: format!("Failed to save chat history: {e}"),
                    })
                    .await;
            }
        }

        self.send_history(tx).await;
    }

    async fn send_history(&self, tx: &mpsc::Sender<PipelineResult>) {
        let store = Arc::clone(&self.history);
        let result = match blocking(move || store.load()).await {
            Ok(records) => PipelineResult::HistoryLoaded(records),
            Err(e) => {
                log::warn!("pipeline: failed to load history: {e}");
                PipelineResult::HistoryWarning {
                    message: format!("Failed to load chat history: {e}"),
                }
            }
        };
        let _ = tx.send(result).await;
    }
}

/// Run a history operation on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> Result<T, HistoryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::Internal(e.to_string()))?
        .map_err(PipelineError::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
