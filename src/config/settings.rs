//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::llm::Tone;

// ---------------------------------------------------------------------------
// DocumentConfig
// ---------------------------------------------------------------------------

/// Settings for the source document that every question is asked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Path of the PDF loaded once at startup.  Relative paths resolve
    /// against the working directory.
    pub path: PathBuf,
    /// Maximum number of document characters embedded in a prompt.
    ///
    /// `0` embeds the whole document no matter how large it is.
    pub max_prompt_chars: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Pakistan2.pdf"),
            max_prompt_chars: 400_000,
        }
    }
}

impl DocumentConfig {
    /// The prompt character budget, `None` when unlimited.
    pub fn prompt_budget(&self) -> Option<usize> {
        (self.max_prompt_chars > 0).then_some(self.max_prompt_chars)
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the API endpoint, without a trailing slash.
    pub base_url: String,
    /// Model identifier (e.g. `"gemini-2.0-flash-lite"`).
    pub model: String,
    /// API key stored in the settings file.  Only consulted when the
    /// environment variable named by `api_key_env` is unset or empty.
    pub api_key: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature.  `None` leaves the service default in place.
    pub temperature: Option<f32>,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-2.0-flash-lite".into(),
            api_key: None,
            api_key_env: "GEMINI_API_KEY".into(),
            temperature: None,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for the text-to-speech engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Executable invoked to synthesize speech.
    pub program: String,
    /// Voice name passed with `-v` (e.g. `"en"`, `"en-us"`).
    pub voice: String,
    /// Speaking rate in words per minute.
    pub words_per_minute: u32,
    /// Maximum seconds a single synthesis may take.
    pub timeout_secs: u64,
    /// Directory for generated audio files.  `None` uses the system temp dir.
    pub output_dir: Option<PathBuf>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".into(),
            voice: "en".into(),
            words_per_minute: 175,
            timeout_secs: 30,
            output_dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryConfig
// ---------------------------------------------------------------------------

/// Settings for the persistent question/answer log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// CSV file holding the history.  `None` uses [`AppPaths::history_file`].
    pub file: Option<PathBuf>,
}

impl HistoryConfig {
    /// The history file location after applying the platform default.
    pub fn resolved_file(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| AppPaths::new().history_file)
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// What happens when the ask button is pressed with an empty query field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyQueryPolicy {
    /// Refuse the query and tell the user to type a question.
    #[default]
    Reject,
    /// Send the empty question to the model unchanged.
    Forward,
}

/// Per-session behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tone preselected when the window opens.
    pub default_tone: Tone,
    /// Handling of empty queries.
    pub empty_query: EmptyQueryPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_tone: Tone::Formal,
            empty_query: EmptyQueryPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window text and geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Heading shown at the top of the window.
    pub title: String,
    /// Hint shown in the empty query field.
    pub query_hint: String,
    /// Initial inner window size `(width, height)` in points.
    pub window_size: (f32, f32),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "PDF Question Answering Bot".into(),
            query_hint: "What would you like to know about Pakistan?".into(),
            window_size: (820.0, 900.0),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use doc_qa::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// println!("{}", config.document.path.display());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Source document settings.
    pub document: DocumentConfig,
    /// Language-model settings.
    pub llm: LlmConfig,
    /// Speech synthesis settings.
    pub tts: TtsConfig,
    /// History store settings.
    pub history: HistoryConfig,
    /// Session behaviour.
    pub session: SessionConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.document.path, loaded.document.path);
        assert_eq!(
            original.document.max_prompt_chars,
            loaded.document.max_prompt_chars
        );

        assert_eq!(original.llm.base_url, loaded.llm.base_url);
        assert_eq!(original.llm.model, loaded.llm.model);
        assert_eq!(original.llm.api_key, loaded.llm.api_key);
        assert_eq!(original.llm.api_key_env, loaded.llm.api_key_env);
        assert_eq!(original.llm.timeout_secs, loaded.llm.timeout_secs);

        assert_eq!(original.tts.program, loaded.tts.program);
        assert_eq!(original.tts.voice, loaded.tts.voice);
        assert_eq!(original.tts.words_per_minute, loaded.tts.words_per_minute);

        assert_eq!(original.session.default_tone, loaded.session.default_tone);
        assert_eq!(original.session.empty_query, loaded.session.empty_query);

        assert_eq!(original.ui.title, loaded.ui.title);
        assert_eq!(original.ui.window_size, loaded.ui.window_size);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.document.path, default.document.path);
        assert_eq!(config.llm.model, default.llm.model);
        assert_eq!(config.tts.program, default.tts.program);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.document.path, PathBuf::from("Pakistan2.pdf"));
        assert_eq!(cfg.document.prompt_budget(), Some(400_000));
        assert_eq!(cfg.llm.model, "gemini-2.0-flash-lite");
        assert_eq!(cfg.llm.api_key_env, "GEMINI_API_KEY");
        assert!(cfg.llm.api_key.is_none());
        assert_eq!(cfg.tts.program, "espeak-ng");
        assert!(cfg.history.file.is_none());
        assert_eq!(cfg.session.default_tone, Tone::Formal);
        assert_eq!(cfg.session.empty_query, EmptyQueryPolicy::Reject);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.document.path = PathBuf::from("/srv/docs/handbook.pdf");
        cfg.document.max_prompt_chars = 0;
        cfg.llm.api_key = Some("test-key".into());
        cfg.llm.temperature = Some(0.2);
        cfg.tts.output_dir = Some(PathBuf::from("/tmp/answers"));
        cfg.history.file = Some(PathBuf::from("/srv/history.csv"));
        cfg.session.default_tone = Tone::Friendly;
        cfg.session.empty_query = EmptyQueryPolicy::Forward;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.document.path, PathBuf::from("/srv/docs/handbook.pdf"));
        assert_eq!(loaded.document.prompt_budget(), None);
        assert_eq!(loaded.llm.api_key, Some("test-key".into()));
        assert_eq!(loaded.llm.temperature, Some(0.2));
        assert_eq!(loaded.tts.output_dir, Some(PathBuf::from("/tmp/answers")));
        assert_eq!(loaded.history.resolved_file(), PathBuf::from("/srv/history.csv"));
        assert_eq!(loaded.session.default_tone, Tone::Friendly);
        assert_eq!(loaded.session.empty_query, EmptyQueryPolicy::Forward);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[document]\npath = \"/srv/handbook.pdf\"\n").expect("write");

        let cfg = AppConfig::load_from(&path).expect("partial file loads");
        let default = AppConfig::default();

        assert_eq!(cfg.document.path, PathBuf::from("/srv/handbook.pdf"));
        assert_eq!(cfg.document.prompt_budget(), Some(400_000));
        assert_eq!(cfg.llm.model, default.llm.model);
        assert_eq!(cfg.tts.timeout_secs, default.tts.timeout_secs);
        assert_eq!(cfg.session.empty_query, EmptyQueryPolicy::Reject);
        assert_eq!(cfg.ui.window_size, default.ui.window_size);
    }

    #[test]
    fn partial_section_keeps_defaults_for_missing_fields() {
        let cfg: AppConfig = toml::from_str("[tts]\nvoice = \"en-us\"\n").expect("parse");
        assert_eq!(cfg.tts.voice, "en-us");
        assert_eq!(cfg.tts.program, "espeak-ng");
        assert_eq!(cfg.tts.words_per_minute, 175);
    }

    #[test]
    fn empty_query_policy_uses_lowercase_names() {
        let toml_src = r#"
            [session]
            default_tone = "Friendly"
            empty_query = "forward"
        "#;
        #[derive(Deserialize)]
        struct Partial {
            session: SessionConfig,
        }
        let parsed: Partial = toml::from_str(toml_src).expect("parse");
        assert_eq!(parsed.session.empty_query, EmptyQueryPolicy::Forward);
        assert_eq!(parsed.session.default_tone, Tone::Friendly);
    }
}
