//! One row of the answer history.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::llm::Tone;

/// Wall-clock format used for the `Timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column names, in file order.
pub const HEADERS: [&str; 4] = ["Timestamp", "Question", "Answer", "Tone"];

/// A successful question/answer interaction.
///
/// `tone` holds the plain tone name (`Formal` / `Friendly`), never the
/// decorated radio label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Answer")]
    pub answer: String,
    #[serde(rename = "Tone")]
    pub tone: String,
}

impl AnswerRecord {
    /// Record stamped with the current local time.
    pub fn now(question: impl Into<String>, answer: impl Into<String>, tone: Tone) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            question: question.into(),
            answer: answer.into(),
            tone: tone.name().to_string(),
        }
    }
}
