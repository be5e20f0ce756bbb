//! Answer tone presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Instruction appended to prompts for [`Tone::Formal`].
pub const FORMAL_INSTRUCTION: &str = "Please respond in a professional and formal tone.";

/// Instruction appended to prompts for [`Tone::Friendly`].
pub const FRIENDLY_INSTRUCTION: &str =
    "Please respond in a warm and friendly tone, as if chatting with a friend.";

/// Style preset applied to the answer-generation instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Formal,
    Friendly,
}

impl Tone {
    /// All presets in display order.
    pub const ALL: [Tone; 2] = [Tone::Formal, Tone::Friendly];

    /// Plain name, as stored in the history table.
    pub fn name(self) -> &'static str {
        match self {
            Tone::Formal => "Formal",
            Tone::Friendly => "Friendly",
        }
    }

    /// Label for the tone selector.
    pub fn label(self) -> &'static str {
        match self {
            Tone::Formal => "Formal 🧐",
            Tone::Friendly => "Friendly 😊",
        }
    }

    /// The fixed instruction sentence for this tone.
    pub fn instruction(self) -> &'static str {
        match self {
            Tone::Formal => FORMAL_INSTRUCTION,
            Tone::Friendly => FRIENDLY_INSTRUCTION,
        }
    }

    /// Parse a tone name; anything unrecognised yields `None`.
    pub fn parse(name: &str) -> Option<Tone> {
        name.parse().ok()
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string is not one of the known tone names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tone: {0:?}")]
pub struct UnknownTone(pub String);

impl FromStr for Tone {
    type Err = UnknownTone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Formal" => Ok(Tone::Formal),
            "Friendly" => Ok(Tone::Friendly),
            other => Err(UnknownTone(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!(Tone::parse("Formal"), Some(Tone::Formal));
        assert_eq!(Tone::parse("Friendly"), Some(Tone::Friendly));
        assert_eq!(Tone::parse(" Friendly "), Some(Tone::Friendly));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(Tone::parse("Casual"), None);
        assert_eq!(Tone::parse("formal"), None);
        assert_eq!(Tone::parse(""), None);
        assert_eq!(
            "Sarcastic".parse::<Tone>(),
            Err(UnknownTone("Sarcastic".into()))
        );
    }

    #[test]
    fn name_round_trips_through_parse() {
        for tone in Tone::ALL {
            assert_eq!(Tone::parse(tone.name()), Some(tone));
            assert_eq!(tone.to_string(), tone.name());
        }
    }

    #[test]
    fn labels_start_with_name() {
        for tone in Tone::ALL {
            assert!(tone.label().starts_with(tone.name()));
        }
    }

    #[test]
    fn instructions_are_distinct() {
        assert_ne!(Tone::Formal.instruction(), Tone::Friendly.instruction());
    }
}
