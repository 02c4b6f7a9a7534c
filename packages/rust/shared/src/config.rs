//! Application configuration for the guidebook converter.
//!
//! User config lives at `~/.guidebook/guidebook.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GuidebookError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "guidebook.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".guidebook";

/// Placeholder substituted with the lesson number in the URL template.
pub const LESSON_PLACEHOLDER: &str = "{id}";

// ---------------------------------------------------------------------------
// Config structs (matching guidebook.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP fetch settings.
    #[serde(default)]
    pub fetch: FetchSection,

    /// Defaults for `guidebook batch`.
    #[serde(default)]
    pub batch: BatchDefaults,

    /// Defaults for `guidebook page`.
    #[serde(default)]
    pub page: PageDefaults,
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    /// Lesson URL with a `{id}` placeholder.
    #[serde(default = "default_url_template")]
    pub url_template: String,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum requests in flight across all hosts.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum requests in flight to one host.
    #[serde(default = "default_per_host")]
    pub per_host: usize,

    /// Total timeout per request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            url_template: default_url_template(),
            user_agent: default_user_agent(),
            concurrency: default_concurrency(),
            per_host: default_per_host(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_url_template() -> String {
    "https://duome.eu/guidebook/en/de/{id}".into()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .into()
}
fn default_concurrency() -> usize {
    10
}
fn default_per_host() -> usize {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[batch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDefaults {
    #[serde(default = "default_start")]
    pub start: u32,

    #[serde(default = "default_end")]
    pub end: u32,

    /// Combined output file.
    #[serde(default = "default_batch_output")]
    pub output: String,
}

impl Default for BatchDefaults {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: default_end(),
            output: default_batch_output(),
        }
    }
}

fn default_start() -> u32 {
    1
}
fn default_end() -> u32 {
    156
}
fn default_batch_output() -> String {
    "all_duolingo_guidebooks.md".into()
}

/// `[page]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDefaults {
    /// Single-page output file.
    #[serde(default = "default_page_output")]
    pub output: String,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            output: default_page_output(),
        }
    }
}

fn default_page_output() -> String {
    "duolingo_guidebook.md".into()
}

// ---------------------------------------------------------------------------
// Fetch config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub url_template: String,
    pub user_agent: String,
    pub concurrency: usize,
    pub per_host: usize,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            url_template: config.fetch.url_template.clone(),
            user_agent: config.fetch.user_agent.clone(),
            concurrency: config.fetch.concurrency,
            per_host: config.fetch.per_host,
            timeout_secs: config.fetch.timeout_secs,
        }
    }
}

impl FetchConfig {
    /// Reject settings that would deadlock or never match a lesson.
    pub fn validate(&self) -> Result<()> {
        if !self.url_template.contains(LESSON_PLACEHOLDER) {
            return Err(GuidebookError::config(format!(
                "url_template must contain {LESSON_PLACEHOLDER}: {}",
                self.url_template
            )));
        }
        if self.concurrency == 0 || self.per_host == 0 {
            return Err(GuidebookError::config(
                "concurrency and per_host must be at least 1",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(GuidebookError::config("timeout_secs must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.guidebook/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GuidebookError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.guidebook/guidebook.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GuidebookError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| GuidebookError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GuidebookError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| GuidebookError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GuidebookError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("url_template"));
        assert!(toml_str.contains("all_duolingo_guidebooks.md"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.batch.end, 156);
        assert_eq!(parsed.fetch.concurrency, 10);
        assert_eq!(parsed.page.output, "duolingo_guidebook.md");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[fetch]
url_template = "https://duome.eu/guidebook/en/fr/{id}"
per_host = 2

[batch]
end = 10
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.fetch.per_host, 2);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.batch.start, 1);
        assert_eq!(config.batch.end, 10);
        assert!(config.fetch.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn fetch_config_from_app_config() {
        let fetch = FetchConfig::from(&AppConfig::default());
        assert_eq!(fetch.concurrency, 10);
        assert_eq!(fetch.per_host, 5);
        assert_eq!(fetch.timeout_secs, 30);
        assert!(fetch.validate().is_ok());
    }

    #[test]
    fn fetch_config_validation() {
        let mut fetch = FetchConfig::default();
        fetch.url_template = "https://duome.eu/guidebook/en/de/".into();
        assert!(fetch.validate().unwrap_err().to_string().contains("{id}"));

        let mut fetch = FetchConfig::default();
        fetch.per_host = 0;
        assert!(fetch.validate().is_err());
    }

    #[test]
    fn load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("guidebook-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[page]\noutput = \"lesson.md\"\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.page.output, "lesson.md");

        std::fs::write(&path, "[page\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
