//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\doc-qa\
//!   macOS:   ~/Library/Application Support/doc-qa/
//!   Linux:   ~/.config/doc-qa/
//!
//! Data dir (chat history):
//!   Windows: %LOCALAPPDATA%\doc-qa\
//!   macOS:   ~/Library/Application Support/doc-qa/
//!   Linux:   ~/.local/share/doc-qa/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for persistent application data.
    pub data_dir: PathBuf,
    /// Default location of the question/answer history table.
    pub history_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "doc-qa";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let history_file = data_dir.join("chat_history.csv");

        Self {
            config_dir,
            settings_file,
            data_dir,
            history_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
