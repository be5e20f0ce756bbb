//! Document Q&A window built on egui/eframe.
//!
//! # Architecture
//!
//! [`DocQaApp`] is the top-level [`eframe::App`].  It owns the UI state and
//! two channel endpoints:
//!
//! * `command_tx`: sends [`PipelineCommand`]s to the orchestrator.
//! * `result_rx` : receives [`PipelineResult`]s, drained every frame into a
//!   [`SessionView`].
//!
//! Audio playback lives here too: the rodio output stream is opened on the
//! UI thread when the user presses play.
//!
//! # Layout
//!
//! | Section | Content |
//! |---------|---------|
//! | Header | title, document info |
//! | Ask | tone radio, query field, "Generate Answer", busy spinner |
//! | Answer | plain text, formatted Markdown, audio player |
//! | History | every saved question/answer, or a placeholder |
//! | Footer | tip line |

use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::audio::{envelope, read_mono, AudioPlayer, PlaybackHandle};
use crate::config::AppConfig;
use crate::history::AnswerRecord;
use crate::llm::Tone;
use crate::markdown::{self, Block, Span};
use crate::pipeline::{PipelineCommand, PipelineResult, SessionView, ShownAnswer};
use crate::tts::SynthesizedAudio;

const ENVELOPE_BARS: usize = 64;

const GREEN: egui::Color32 = egui::Color32::from_rgb(80, 200, 120);
const ORANGE: egui::Color32 = egui::Color32::from_rgb(255, 136, 68);
const YELLOW: egui::Color32 = egui::Color32::from_rgb(230, 190, 80);
const BLUE: egui::Color32 = egui::Color32::from_rgb(68, 136, 255);
const DIM: egui::Color32 = egui::Color32::from_rgb(140, 140, 140);

// ---------------------------------------------------------------------------
// Answer / audio caches
// ---------------------------------------------------------------------------

/// Answer text prepared once per interaction instead of every frame.
struct RenderedAnswer {
    raw: String,
    plain: String,
    blocks: Vec<Block>,
}

impl RenderedAnswer {
    fn new(answer: &str) -> Self {
        Self {
            raw: answer.to_string(),
            plain: markdown::strip_emphasis(answer),
            blocks: markdown::parse(answer),
        }
    }
}

/// Synthesized speech ready for the player.
struct LoadedAudio {
    source: SynthesizedAudio,
    envelope: Vec<f32>,
}

enum PlayerAction {
    Play,
    Stop,
}

// ---------------------------------------------------------------------------
// DocQaApp
// ---------------------------------------------------------------------------

/// eframe application for the document question-answering window.
pub struct DocQaApp {
    // ── Session ──────────────────────────────────────────────────────────
    view: SessionView,
    rendered: Option<RenderedAnswer>,

    // ── Inputs ───────────────────────────────────────────────────────────
    tone: Tone,
    query: String,

    // ── Audio ────────────────────────────────────────────────────────────
    /// Opened on first play.
    player: Option<AudioPlayer>,
    playback: Option<PlaybackHandle>,
    loaded_audio: Option<LoadedAudio>,
    audio_error: Option<String>,
    /// Fraction of the current clip already played.
    played: f32,

    // ── Channels ─────────────────────────────────────────────────────────
    command_tx: mpsc::Sender<PipelineCommand>,
    result_rx: mpsc::Receiver<PipelineResult>,

    // ── Configuration ────────────────────────────────────────────────────
    config: AppConfig,
    /// One-line description of the loaded document.
    document_info: String,
}

impl DocQaApp {
    /// Create the app.
    ///
    /// * `command_tx`   : sender end of the pipeline command channel.
    /// * `result_rx`    : receiver end of the pipeline result channel.
    /// * `config`       : loaded application configuration.
    /// * `document_info`: shown under the title.
    pub fn new(
        command_tx: mpsc::Sender<PipelineCommand>,
        result_rx: mpsc::Receiver<PipelineResult>,
        config: AppConfig,
        document_info: String,
    ) -> Self {
        Self {
            view: SessionView::new(),
            rendered: None,
            tone: config.session.default_tone,
            query: String::new(),
            player: None,
            playback: None,
            loaded_audio: None,
            audio_error: None,
            played: 0.0,
            command_tx,
            result_rx,
            config,
            document_info,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending pipeline results (non-blocking).
    fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match &result {
                PipelineResult::AnswerReady { answer, .. } => {
                    self.rendered = Some(RenderedAnswer::new(answer));
                }
                PipelineResult::SpeechReady(audio) => self.load_audio(audio),
                _ => {}
            }
            self.view.apply(result);
        }
    }

    // ── Commands ─────────────────────────────────────────────────────────

    fn ask(&mut self) {
        if self.view.is_busy() {
            return;
        }
        self.stop_playback();
        self.rendered = None;
        self.loaded_audio = None;
        self.audio_error = None;
        self.view.begin_interaction();

        let command = PipelineCommand::Ask {
            query: self.query.clone(),
            tone: self.tone,
        };
        if let Err(e) = self.command_tx.try_send(command) {
            log::error!("ui: failed to send question to pipeline: {e}");
            self.view.apply(PipelineResult::Rejected {
                reason: format!("Error: pipeline unavailable ({e})"),
            });
            self.view.apply(PipelineResult::Finished);
        }
    }

    fn refresh_history(&mut self) {
        if let Err(e) = self.command_tx.try_send(PipelineCommand::RefreshHistory) {
            log::warn!("ui: failed to request history: {e}");
        }
    }

    // ── Audio ────────────────────────────────────────────────────────────

    fn load_audio(&mut self, audio: &SynthesizedAudio) {
        self.stop_playback();
        match read_mono(&audio.path) {
            Ok(samples) => {
                self.loaded_audio = Some(LoadedAudio {
                    source: audio.clone(),
                    envelope: envelope(&samples, ENVELOPE_BARS),
                });
                self.audio_error = None;
            }
            Err(e) => {
                log::warn!("ui: cannot load {}: {e}", audio.path.display());
                self.loaded_audio = None;
                self.audio_error = Some(format!("Cannot load audio: {e}"));
            }
        }
    }

    fn start_playback(&mut self) {
        let Some(loaded) = &self.loaded_audio else {
            return;
        };

        if self.player.is_none() {
            match AudioPlayer::new() {
                Ok(player) => self.player = Some(player),
                Err(e) => {
                    log::warn!("ui: audio output unavailable: {e}");
                    self.audio_error = Some(format!("Audio output unavailable: {e}"));
                    return;
                }
            }
        }

        let Some(player) = &self.player else {
            return;
        };
        match player.play(&loaded.source.path, loaded.source.duration_secs) {
            Ok(handle) => {
                self.playback = Some(handle);
                self.played = 0.0;
                self.audio_error = None;
            }
            Err(e) => {
                log::warn!("ui: playback failed: {e}");
                self.audio_error = Some(format!("Playback failed: {e}"));
            }
        }
    }

    fn stop_playback(&mut self) {
        self.playback = None;
        self.played = 0.0;
    }

    /// Track progress and release the stream once the clip has ended.
    fn update_playback(&mut self) {
        if let Some(handle) = &self.playback {
            self.played = handle.progress();
            if handle.is_finished() {
                self.playback = None;
                self.played = 1.0;
            }
        }
    }

    // ── Sections ─────────────────────────────────────────────────────────

    fn draw_header(&self, ui: &mut egui::Ui) {
        ui.heading(format!("📘 {} 🤖", self.config.ui.title));
        ui.label(egui::RichText::new(self.document_info.as_str()).color(DIM).size(11.0));
        ui.separator();
    }

    fn draw_ask(&mut self, ui: &mut egui::Ui) {
        ui.label("🎭 Choose chatbot tone:");
        ui.horizontal(|ui| {
            for tone in Tone::ALL {
                ui.radio_value(&mut self.tone, tone, tone.label());
            }
        });

        ui.add_space(6.0);
        ui.label(format!("💬 {}", self.config.ui.query_hint));
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.query)
                .hint_text("Type your question…")
                .desired_width(f32::INFINITY),
        );
        let submitted =
            response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.add_space(6.0);
        let busy = self.view.is_busy();
        let clicked = ui.horizontal(|ui| {
            let clicked = ui
                .add_enabled(!busy, egui::Button::new("🚀 Generate Answer"))
                .clicked();
            if busy {
                ui.spinner();
                ui.label(egui::RichText::new(self.view.pipeline.label()).color(BLUE));
            }
            clicked
        });

        if (clicked.inner || submitted) && !busy {
            self.ask();
        }

        if let Some(notice) = &self.view.notice {
            ui.label(egui::RichText::new(format!("ℹ {notice}")).color(YELLOW));
        }
    }

    fn draw_answer(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(answer) = self.view.shown_answer() else {
            return;
        };

        ui.separator();
        ui.label(egui::RichText::new("📝 Generated Answer:").strong().size(16.0));
        ui.add_space(4.0);

        match answer {
            ShownAnswer::Failure { message } => {
                ui.label(egui::RichText::new(message).color(ORANGE));
            }
            ShownAnswer::Answer { tone, .. } => {
                let tone = *tone;
                if let Some(rendered) = &self.rendered {
                    ui.label(egui::RichText::new(&rendered.plain).monospace());
                    ui.add_space(6.0);
                    render_blocks(ui, &rendered.blocks);
                    ui.add_space(4.0);
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(tone.label()).color(DIM).size(11.0));
                        if ui.small_button("Copy").clicked() {
                            ctx.copy_text(rendered.raw.clone());
                        }
                    });
                }
            }
        }

        if let Some(error) = &self.view.error {
            ui.label(egui::RichText::new(error).color(ORANGE));
        }

        self.draw_player(ui);

        for warning in &self.view.warnings {
            ui.label(egui::RichText::new(format!("❌ {warning}")).color(ORANGE));
        }
    }

    fn draw_player(&mut self, ui: &mut egui::Ui) {
        if let Some(error) = &self.audio_error {
            ui.label(egui::RichText::new(error).color(ORANGE).size(11.0));
        }

        let Some(loaded) = &self.loaded_audio else {
            return;
        };

        let duration = loaded.source.duration_secs;
        let playing = self.playback.is_some();
        let mut action = None;

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let label = if playing { "⏹ Stop" } else { "▶ Play" };
            if ui.button(label).clicked() {
                action = Some(if playing {
                    PlayerAction::Stop
                } else {
                    PlayerAction::Play
                });
            }
            ui.add(
                egui::ProgressBar::new(self.played)
                    .desired_width(ui.available_width())
                    .text(format!("{:.1}s / {:.1}s", self.played * duration, duration)),
            );
        });
        draw_envelope(ui, &loaded.envelope, self.played);

        match action {
            Some(PlayerAction::Play) => self.start_playback(),
            Some(PlayerAction::Stop) => self.stop_playback(),
            None => {}
        }
    }

    fn draw_history(&mut self, ui: &mut egui::Ui) {
        ui.separator();
        let mut reload = false;
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("📚 Chat History").strong().size(16.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                reload = ui.small_button("⟳ Reload").clicked();
            });
        });

        match &self.view.history {
            Some(records) if !records.is_empty() => history_table(ui, records),
            _ if !self.view.history_loaded => {
                ui.label(egui::RichText::new("Loading…").color(DIM));
            }
            _ => {
                ui.label(egui::RichText::new("ℹ️ No chat history yet.").color(BLUE));
            }
        }

        if reload {
            self.refresh_history();
        }
    }

    fn draw_footer(&self, ui: &mut egui::Ui) {
        ui.separator();
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            ui.label("📌 ");
            ui.label(egui::RichText::new("Tip:").strong());
            ui.label(" Use clear and specific questions for the best answers! ✨");
        });
    }
}

// ---------------------------------------------------------------------------
// Rendering helpers
// ---------------------------------------------------------------------------

fn span_text(span: &Span) -> egui::RichText {
    let mut text = egui::RichText::new(&span.text);
    if span.bold {
        text = text.strong();
    }
    if span.italic {
        text = text.italics();
    }
    if span.code {
        text = text.code();
    }
    text
}

fn spans_line(ui: &mut egui::Ui, prefix: Option<String>, spans: &[Span], size: Option<f32>) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        if let Some(prefix) = prefix {
            ui.label(prefix);
        }
        for span in spans {
            let text = span_text(span);
            ui.label(match size {
                Some(s) => text.size(s),
                None => text,
            });
        }
    });
}

fn render_blocks(ui: &mut egui::Ui, blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Heading { level, spans } => {
                let size = match level {
                    1 => 22.0,
                    2 => 19.0,
                    3 => 17.0,
                    _ => 15.0,
                };
                let bold: Vec<Span> = spans
                    .iter()
                    .cloned()
                    .map(|s| Span { bold: true, ..s })
                    .collect();
                spans_line(ui, None, &bold, Some(size));
            }
            Block::Bullet(spans) => spans_line(ui, Some("  • ".into()), spans, None),
            Block::Numbered { number, spans } => {
                spans_line(ui, Some(format!("  {number}. ")), spans, None)
            }
            Block::Paragraph(spans) => spans_line(ui, None, spans, None),
            Block::Blank => ui.add_space(6.0),
        }
    }
}

fn draw_envelope(ui: &mut egui::Ui, bars: &[f32], played: f32) {
    let (rect, _) =
        ui.allocate_exact_size(egui::vec2(ui.available_width(), 28.0), egui::Sense::hover());

    let painter = ui.painter();
    let num_bars = bars.len().max(1);
    let bar_width = rect.width() / num_bars as f32;
    let played_bars = (played * num_bars as f32) as usize;

    for (i, &amplitude) in bars.iter().enumerate() {
        let x = rect.left() + i as f32 * bar_width;
        let bar_height = (amplitude * rect.height()).max(2.0);
        let color = if i < played_bars { GREEN } else { DIM };

        painter.rect_filled(
            egui::Rect::from_center_size(
                egui::pos2(x + bar_width / 2.0, rect.center().y),
                egui::vec2((bar_width * 0.65).max(1.0), bar_height),
            ),
            1.0,
            color,
        );
    }
}

fn history_table(ui: &mut egui::Ui, records: &[AnswerRecord]) {
    egui::ScrollArea::both()
        .id_salt("history")
        .max_height(320.0)
        .show(ui, |ui| {
            egui::Grid::new("history_grid")
                .striped(true)
                .num_columns(4)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    for header in crate::history::HEADERS {
                        ui.label(egui::RichText::new(header).strong());
                    }
                    ui.end_row();

                    for record in records {
                        ui.label(egui::RichText::new(&record.timestamp).monospace());
                        ui.add(egui::Label::new(record.question.as_str()).wrap());
                        ui.add(egui::Label::new(record.answer.as_str()).wrap());
                        ui.label(record.tone.as_str());
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for DocQaApp {
    /// Called every frame by eframe.  Polls the result channel, advances
    /// playback, then renders the window.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();
        self.update_playback();

        // Keep polling while the pipeline works and animate the player.
        if self.view.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(66));
        } else if self.playback.is_some() {
            ctx.request_repaint_after(Duration::from_millis(33));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("page")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.draw_header(ui);
                    self.draw_ask(ui);
                    self.draw_answer(ui, ctx);
                    self.draw_history(ui);
                    self.draw_footer(ui);
                });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("doc-qa window closing");
    }
}
