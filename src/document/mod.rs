//! Source document handling: PDF text extraction and normalization.
//!
//! ```rust,no_run
//! use doc_qa::document::DocumentContent;
//!
//! let content = DocumentContent::load("Pakistan2.pdf").expect("document is required");
//! println!("{} pages, {} chars", content.page_count(), content.text().len());
//! ```

pub mod loader;
pub mod normalize;

pub use loader::{extract_pages, DocumentContent, DocumentError};
pub use normalize::normalize;
