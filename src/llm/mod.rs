//! Language-model side of the pipeline.
//!
//! This module provides:
//! * [`Tone`]: answer style presets and their instruction sentences.
//! * [`PromptBuilder`]: builds the document question-answering prompt.
//! * [`ModelClient`]: async trait for the generative-language boundary.
//! * [`GeminiClient`]: Gemini `generateContent` REST client.
//! * [`AnswerGenerator`]: extracts the first candidate's text.
//! * [`LlmError`]: error variants for model calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use doc_qa::config::AppConfig;
//! use doc_qa::llm::{AnswerGenerator, GeminiClient, PromptBuilder, Tone};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let generator = AnswerGenerator::new(Arc::new(GeminiClient::from_config(&config.llm)));
//!
//!     let prompt = PromptBuilder::unbounded().build(
//!         "pakistan is a country in south asia",
//!         "where is pakistan",
//!         Some(Tone::Formal),
//!     );
//!     match generator.generate(&prompt).await {
//!         Ok(answer) => println!("{answer}"),
//!         Err(e) => eprintln!("{}", e.user_message()),
//!     }
//! }
//! ```

pub mod client;
pub mod generator;
pub mod prompt;
pub mod tone;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{GeminiClient, GenerateContentResponse, LlmError, ModelClient};
pub use generator::AnswerGenerator;
pub use prompt::PromptBuilder;
pub use tone::{Tone, UnknownTone, FORMAL_INSTRUCTION, FRIENDLY_INSTRUCTION};
