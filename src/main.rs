//! Application entry point for PDF question answering.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the source document; failure ends the process before any window.
//! 4. Create the [`tokio`] runtime.
//! 5. Build the model client, speech synthesizer and history store.
//! 6. Create pipeline channels (`command`, `result`).
//! 7. Spawn the pipeline orchestrator and request the initial history.
//! 8. Run [`eframe::run_native`], which blocks until the window is closed.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use eframe::egui;
use tokio::sync::mpsc;

use doc_qa::{
    app::DocQaApp,
    config::AppConfig,
    document::DocumentContent,
    history::HistoryStore,
    llm::{AnswerGenerator, GeminiClient, ModelClient, PromptBuilder},
    pipeline::{PipelineCommand, PipelineOrchestrator, PipelineResult},
    tts::{EspeakSynthesizer, SpeechSynthesizer},
};

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let vp = egui::ViewportBuilder::default()
        .with_title(config.ui.title.clone())
        .with_inner_size([width, height])
        .with_min_inner_size([480.0, 400.0]);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("doc-qa starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Document (fatal on failure)
    let document = DocumentContent::load(&config.document.path)
        .with_context(|| format!("failed to load document {}", config.document.path.display()))?;
    log::info!(
        "Loaded {} ({} pages, {} chars)",
        document.source().display(),
        document.page_count(),
        document.text().chars().count()
    );
    if document.is_empty() {
        log::warn!("Document has no extractable text; questions will be refused");
    }
    let document_info = format!(
        "{} · {} pages",
        document
            .source()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| document.source().display().to_string()),
        document.page_count()
    );

    // 4. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 5. Collaborators
    let model: Arc<dyn ModelClient> = Arc::new(GeminiClient::from_config(&config.llm));
    let tts: Arc<dyn SpeechSynthesizer> = Arc::new(EspeakSynthesizer::from_config(&config.tts));
    let history = Arc::new(HistoryStore::open(config.history.resolved_file()));
    log::info!("History file: {}", history.path().display());

    let orchestrator = PipelineOrchestrator::new(
        Arc::new(document),
        PromptBuilder::new(config.document.prompt_budget()),
        AnswerGenerator::new(model),
        tts,
        history,
        config.session.empty_query,
    );

    // 6. Channel setup
    let (command_tx, command_rx) = mpsc::channel::<PipelineCommand>(16);
    let (result_tx, result_rx) = mpsc::channel::<PipelineResult>(64);

    // 7. Orchestrator + initial history load
    rt.spawn(orchestrator.run(command_rx, result_tx));
    command_tx
        .try_send(PipelineCommand::RefreshHistory)
        .context("failed to request initial history")?;

    // 8. Window (blocks until closed)
    let app = DocQaApp::new(command_tx, result_rx, config.clone(), document_info);
    let options = native_options(&config);

    eframe::run_native(
        &config.ui.title,
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow!("window failed: {e}"))?;

    log::info!("doc-qa shut down");
    Ok(())
}
