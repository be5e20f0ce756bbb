//! doc-qa: ask questions about a PDF and hear the answers.
//!
//! The binary wires these modules together; each is usable on its own.

pub mod app;
pub mod audio;
pub mod config;
pub mod document;
pub mod history;
pub mod llm;
pub mod markdown;
pub mod pipeline;
pub mod tts;
