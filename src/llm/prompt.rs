//! Prompt builder for document question answering.
//!
//! [`PromptBuilder`] embeds the document text, the user's question and the
//! tone instruction into a single flat prompt for the `generateContent`
//! endpoint.  An optional character budget caps how much of the document is
//! embedded; within the budget the document goes in verbatim.

use crate::llm::tone::Tone;

/// Closing line appended to every prompt.
const CLOSING_INSTRUCTION: &str = "Provide a concise and clear answer.";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds question-answering prompts.
///
/// # Example
/// ```rust
/// use doc_qa::llm::{PromptBuilder, Tone};
///
/// let builder = PromptBuilder::unbounded();
/// let prompt = builder.build("pakistan is a country", "where is pakistan", Some(Tone::Formal));
/// assert!(prompt.contains("where is pakistan"));
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_document_chars: Option<usize>,
}

impl PromptBuilder {
    /// Create a builder that embeds at most `max_document_chars` characters
    /// of the document (`None` = no limit).
    pub fn new(max_document_chars: Option<usize>) -> Self {
        Self { max_document_chars }
    }

    /// A builder that always embeds the whole document.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Build the prompt.
    ///
    /// Structure (in order):
    /// 1. Document content
    /// 2. The question, unchanged (an empty question is passed through)
    /// 3. Tone instruction (empty line when `tone` is `None`)
    /// 4. Closing instruction
    pub fn build(&self, content: &str, query: &str, tone: Option<Tone>) -> String {
        let content = self.fit_document(content);
        let instruction = tone.map(Tone::instruction).unwrap_or("");

        let mut prompt = String::with_capacity(content.len() + query.len() + 256);
        prompt.push_str("\nBased on the following content:\n");
        prompt.push_str(content);
        prompt.push_str("\n\nAnswer the following question:\n");
        prompt.push_str(query);
        prompt.push_str("\n\n");
        prompt.push_str(instruction);
        prompt.push_str("\n\n");
        prompt.push_str(CLOSING_INSTRUCTION);
        prompt.push('\n');
        prompt
    }

    /// Cut `content` to the character budget on a char boundary.
    fn fit_document<'a>(&self, content: &'a str) -> &'a str {
        let Some(max) = self.max_document_chars else {
            return content;
        };
        match content.char_indices().nth(max) {
            Some((byte_idx, _)) => {
                log::warn!(
                    "prompt: document truncated to {max} of {} chars",
                    content.chars().count()
                );
                &content[..byte_idx]
            }
            None => content,
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::unbounded()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tone::{FORMAL_INSTRUCTION, FRIENDLY_INSTRUCTION};

    #[test]
    fn embeds_content_and_query_verbatim() {
        let builder = PromptBuilder::unbounded();
        let content = "the indus river flows through punjab and sindh";
        let query = "Which provinces does the Indus cross?";
        let prompt = builder.build(content, query, Some(Tone::Friendly));

        assert!(prompt.contains(content));
        assert!(prompt.contains(query));
        assert!(prompt.contains("Based on the following content:"));
        assert!(prompt.contains("Answer the following question:"));
        assert!(prompt.ends_with("Provide a concise and clear answer.\n"));
    }

    #[test]
    fn formal_tone_adds_formal_sentence_only() {
        let prompt = PromptBuilder::unbounded().build("c", "q", Some(Tone::Formal));
        assert!(prompt.contains(FORMAL_INSTRUCTION));
        assert!(!prompt.contains(FRIENDLY_INSTRUCTION));
    }

    #[test]
    fn friendly_tone_adds_friendly_sentence_only() {
        let prompt = PromptBuilder::unbounded().build("c", "q", Some(Tone::Friendly));
        assert!(prompt.contains(FRIENDLY_INSTRUCTION));
        assert!(!prompt.contains(FORMAL_INSTRUCTION));
    }

    #[test]
    fn unrecognised_tone_adds_no_instruction() {
        for name in ["Casual", "formal", "", "Friendly 😊"] {
            let prompt = PromptBuilder::unbounded().build("c", "q", Tone::parse(name));
            assert!(!prompt.contains(FORMAL_INSTRUCTION), "tone {name:?}");
            assert!(!prompt.contains(FRIENDLY_INSTRUCTION), "tone {name:?}");
        }
    }

    #[test]
    fn empty_query_passes_through() {
        let prompt = PromptBuilder::unbounded().build("some content", "", None);
        assert!(prompt.contains("Answer the following question:\n\n"));
        assert!(prompt.contains("some content"));
    }

    #[test]
    fn pakistan_scenario() {
        let prompt = PromptBuilder::default().build(
            "pakistan is a country in south asia",
            "where is pakistan",
            Tone::parse("Formal"),
        );
        assert!(prompt.contains("pakistan is a country in south asia"));
        assert!(prompt.contains("where is pakistan"));
        assert!(prompt.contains("Please respond in a professional and formal tone."));
    }

    #[test]
    fn budget_truncates_on_char_boundary() {
        let builder = PromptBuilder::new(Some(3));
        let prompt = builder.build("ąęółż", "q", None);
        assert!(prompt.contains("content:\nąęó\n"));
        assert!(!prompt.contains("ąęół"));
    }

    #[test]
    fn content_within_budget_is_verbatim() {
        let builder = PromptBuilder::new(Some(100));
        let content = "short document";
        assert!(builder.build(content, "q", None).contains(content));

        let exact = PromptBuilder::new(Some(content.chars().count()));
        assert!(exact.build(content, "q", None).contains(content));
    }
}
