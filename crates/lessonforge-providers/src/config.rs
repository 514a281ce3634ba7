//! Toolkit configuration and provider factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lessonforge_core::traits::TextProvider;

use crate::gemini::GeminiProvider;

/// Top-level lessonforge configuration.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure
/// in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ToolkitConfig {
    /// Gemini API key. May reference an env var as `${GEMINI_API_KEY}`.
    #[serde(default)]
    pub api_key: String,
    /// Override for the API base URL (tests, proxies).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub model: String,
    /// Default sampling temperature (0.0 = factual).
    #[serde(default)]
    pub temperature: f64,
    /// Directory holding usage.json and gems.json.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// The `.docx` test template consumed read-only by the test generator.
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
}

impl std::fmt::Debug for ToolkitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolkitConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("data_dir", &self.data_dir)
            .field("template_path", &self.template_path)
            .finish()
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_template_path() -> PathBuf {
    PathBuf::from("test_template.docx")
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: default_model(),
            temperature: 0.0,
            data_dir: default_data_dir(),
            template_path: default_template_path(),
        }
    }
}

impl ToolkitConfig {
    /// Where the usage ledger persists.
    pub fn usage_path(&self) -> PathBuf {
        self.data_dir.join("usage.json")
    }

    /// Where the gem store persists.
    pub fn gems_path(&self) -> PathBuf {
        self.data_dir.join("gems.json")
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `lessonforge.toml` in the current directory
/// 2. `~/.config/lessonforge/config.toml`
///
/// Environment variable overrides: `LESSONFORGE_GEMINI_KEY`, `GEMINI_API_KEY`.
pub fn load_config() -> Result<ToolkitConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ToolkitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("lessonforge.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ToolkitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ToolkitConfig::default(),
    };

    // Apply env var overrides, most specific first.
    if let Ok(key) = std::env::var("LESSONFORGE_GEMINI_KEY") {
        config.api_key = key;
    } else if config.api_key.is_empty() {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.api_key = key;
        }
    }

    config.api_key = resolve_env_vars(&config.api_key);
    if let Some(url) = &config.base_url {
        config.base_url = Some(resolve_env_vars(url));
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("lessonforge"))
}

/// Create the provider instance the config describes.
pub fn create_provider(config: &ToolkitConfig) -> Arc<dyn TextProvider> {
    Arc::new(GeminiProvider::new(
        &config.api_key,
        config.base_url.clone(),
    ))
}
