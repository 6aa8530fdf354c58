//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use secstudy_core::traits::ModelProvider;

use crate::gemini::GeminiProvider;
use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;

/// Configuration for a single model provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in
/// logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
    /// Canned responses for offline runs and tests.
    Mock {
        #[serde(default)]
        reply: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock { reply } => {
                f.debug_struct("Mock").field("reply", reply).finish()
            }
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Top-level secstudy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for tutoring prompts.
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    /// Max tokens per generation.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Hard timeout for one model request, in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Path of the JSON progress file.
    #[serde(default = "default_progress_file")]
    pub progress_file: PathBuf,
    /// Topics eligible for discovery recommendations, in preference order.
    #[serde(default = "default_catalog")]
    pub catalog: Vec<String>,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_output_tokens() -> u32 {
    1024
}
fn default_timeout() -> u64 {
    30
}
fn default_progress_file() -> PathBuf {
    PathBuf::from("study_progress.json")
}
fn default_catalog() -> Vec<String> {
    ["phishing", "passwords", "malware", "firewalls", "encryption"]
        .map(String::from)
        .to_vec()
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            request_timeout_secs: default_timeout(),
            progress_file: default_progress_file(),
            catalog: default_catalog(),
        }
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

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
            base_url: resolve_env_vars(base_url),
        },
        ProviderConfig::Mock { reply } => ProviderConfig::Mock {
            reply: reply.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `secstudy.toml` in the current directory
/// 2. `~/.config/secstudy/config.toml`
///
/// Environment variable override: `SECSTUDY_GEMINI_KEY`.
pub fn load_config() -> Result<StudyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("secstudy.toml");
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
            toml::from_str::<StudyConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StudyConfig::default(),
    };

    // Apply env var override
    if let Ok(key) = std::env::var("SECSTUDY_GEMINI_KEY") {
        config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::Gemini { api_key, .. }) = config.providers.get_mut("gemini") {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("secstudy"))
}

/// Create a provider instance from its configuration.
///
/// Fails fast on a missing Gemini credential so a misconfigured session is
/// an unrecoverable startup error rather than a surprise mid-conversation.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
    request_timeout_secs: u64,
) -> Result<Box<dyn ModelProvider>> {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            anyhow::ensure!(
                !api_key.trim().is_empty(),
                "no API key configured for provider '{name}'. \
                 Set SECSTUDY_GEMINI_KEY or fill in api_key in secstudy.toml."
            );
            Ok(Box::new(GeminiProvider::new(
                api_key,
                base_url.clone(),
                request_timeout_secs,
            )))
        }
        ProviderConfig::Ollama { base_url } => {
            Ok(Box::new(OllamaProvider::new(base_url, request_timeout_secs)))
        }
        ProviderConfig::Mock { reply } => Ok(Box::new(match reply {
            Some(text) => MockProvider::with_fixed_response(text),
            None => MockProvider::new(HashMap::new()),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SECSTUDY_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SECSTUDY_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SECSTUDY_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_SECSTUDY_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = StudyConfig::default();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.default_model, "gemini-1.5-flash");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.catalog.contains(&"phishing".to_string()));
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
[providers.gemini]
type = "gemini"
api_key = "test-key"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

default_provider = "gemini"
default_model = "gemini-1.5-flash"
progress_file = "my_progress.json"
catalog = ["phishing", "vpn"]
"#;
        let config: StudyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert!(matches!(
            config.providers.get("gemini"),
            Some(ProviderConfig::Gemini { .. })
        ));
        assert_eq!(config.progress_file, PathBuf::from("my_progress.json"));
        assert_eq!(config.catalog, vec!["phishing", "vpn"]);
    }

    #[test]
    fn missing_explicit_config_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secstudy.toml");
        std::fs::write(&path, "default_model = \"gemini-1.5-pro\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_model, "gemini-1.5-pro");
    }

    #[test]
    fn gemini_without_key_is_rejected() {
        let config = ProviderConfig::Gemini {
            api_key: "  ".into(),
            base_url: None,
        };
        let err = create_provider("gemini", &config, 30).unwrap_err();
        assert!(err.to_string().contains("no API key configured"));
    }

    #[test]
    fn debug_masks_api_key() {
        let config = ProviderConfig::Gemini {
            api_key: "super-secret".into(),
            base_url: None,
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }
}
