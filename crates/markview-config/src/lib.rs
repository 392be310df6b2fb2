//! Configuration management for markview.
//!
//! Parses `markview.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `emoji.root_path`
//! - `style_sheets[].href`
//! - `scripts[].src`

mod expand;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the raw HTML escape flag.
    pub escape_html: Option<bool>,
    /// Override basics-only mode.
    pub basics_only: Option<bool>,
    /// Override the emoji image root.
    pub emoji_root_path: Option<String>,
    /// Override the remote source timeout.
    pub timeout_secs: Option<u64>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "markview.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Render options.
    pub render: RenderConfig,
    /// Emoji image location.
    pub emoji: EmojiConfig,
    /// Stylesheets added to every document, in order.
    pub style_sheets: Vec<StyleSheetConfig>,
    /// Scripts added to every document, in order.
    pub scripts: Vec<ScriptConfig>,
    /// Remote source fetching.
    pub source: SourceConfig,
    /// Localization table for `@{key}` references.
    pub localization: HashMap<String, String>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Render configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Escape raw HTML in the source.
    pub escape_html: bool,
    /// Disable every extension.
    pub basics_only: bool,
    /// Text before a footnote reference number.
    pub footnote_ref_prefix: String,
    /// Text after a footnote reference number.
    pub footnote_ref_suffix: String,
    /// Class prefix for fenced code with a language.
    pub code_language_class_prefix: String,
    /// Class for fenced code without a language.
    pub no_language_class: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            escape_html: true,
            basics_only: false,
            footnote_ref_prefix: "[".to_owned(),
            footnote_ref_suffix: "]".to_owned(),
            code_language_class_prefix: String::new(),
            no_language_class: "nohighlight".to_owned(),
        }
    }
}

/// Emoji configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EmojiConfig {
    /// Base URI of emoji images.
    pub root_path: String,
    /// Image file extension, without the dot.
    pub image_extension: String,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            root_path: "file:///android_asset/emoji/".to_owned(),
            image_extension: "png".to_owned(),
        }
    }
}

/// Where a configured resource comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceSource<'a> {
    /// Loaded from a URI.
    External(&'a str),
    /// Embedded in the document.
    Inline(&'a str),
}

/// Pick the single set source of a resource entry.
fn exactly_one<'a>(
    external: Option<&'a str>,
    inline: Option<&'a str>,
    field: &str,
    names: (&str, &str),
) -> Result<ResourceSource<'a>, ConfigError> {
    let source = match (external, inline) {
        (Some(uri), None) => ResourceSource::External(uri),
        (None, Some(body)) => ResourceSource::Inline(body),
        _ => {
            return Err(ConfigError::Validation(format!(
                "{field} must set exactly one of {} or {}",
                names.0, names.1
            )));
        }
    };
    let (ResourceSource::External(text) | ResourceSource::Inline(text)) = source;
    require_non_empty(text, field)?;
    Ok(source)
}

/// A `[[style_sheets]]` entry.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StyleSheetConfig {
    /// Stylesheet URI.
    pub href: Option<String>,
    /// Inline CSS.
    pub css: Option<String>,
}

impl StyleSheetConfig {
    /// Validated source of this stylesheet.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` unless exactly one non-empty source is set.
    pub fn source(&self) -> Result<ResourceSource<'_>, ConfigError> {
        exactly_one(
            self.href.as_deref(),
            self.css.as_deref(),
            "style_sheets entry",
            ("href", "css"),
        )
    }
}

/// A `[[scripts]]` entry.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Script URI.
    pub src: Option<String>,
    /// Inline code.
    pub code: Option<String>,
    /// Load with `defer`. External scripts only.
    pub defer: bool,
    /// Load with `async`. External scripts only.
    #[serde(rename = "async")]
    pub is_async: bool,
}

impl ScriptConfig {
    /// Validated source of this script.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` unless exactly one non-empty source is set.
    pub fn source(&self) -> Result<ResourceSource<'_>, ConfigError> {
        exactly_one(
            self.src.as_deref(),
            self.code.as_deref(),
            "scripts entry",
            ("src", "code"),
        )
    }
}

/// Remote source configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Timeout for fetching an `http(s)://` source, in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl SourceConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`emoji.root_path`").
        field: String,
        /// Error message (e.g., "${`ASSETS`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `markview.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, so they take precedence over
    /// config file values, and the result is validated afterwards.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_from(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("No {CONFIG_FILENAME} found, using defaults");
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(escape_html) = settings.escape_html {
            self.render.escape_html = escape_html;
        }
        if let Some(basics_only) = settings.basics_only {
            self.render.basics_only = basics_only;
        }
        if let Some(root_path) = &settings.emoji_root_path {
            self.emoji.root_path.clone_from(root_path);
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.source.timeout_secs = timeout_secs;
        }
    }

    /// Search for a config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "Discovered config file");
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            style_sheets = config.style_sheets.len(),
            scripts = config.scripts.len(),
            "Loaded config"
        );
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.emoji.image_extension, "emoji.image_extension")?;
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "source.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        for style_sheet in &self.style_sheets {
            style_sheet.source()?;
        }
        for script in &self.scripts {
            script.source()?;
        }
        Ok(())
    }
}
