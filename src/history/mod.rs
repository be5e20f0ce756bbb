//! Persistent record of answered questions.

pub mod record;
pub mod store;

pub use record::{AnswerRecord, HEADERS, TIMESTAMP_FORMAT};
pub use store::{HistoryError, HistoryStore};
