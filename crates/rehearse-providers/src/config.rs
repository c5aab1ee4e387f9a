//! Configuration loading and the provider factory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use rehearse_core::concepts::ConceptTagger;
use rehearse_core::traits::GenerationProvider;

use crate::anthropic::AnthropicProvider;
use crate::ollama::{OllamaProvider, DEFAULT_BASE_URL as OLLAMA_URL};
use crate::openai::OpenAiProvider;

/// File name searched for in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "rehearse.toml";

/// Connection settings for one provider.
///
/// `Debug` masks API keys so configs can be logged.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Anthropic { base_url, .. } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                base_url, org_id, ..
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Ollama { base_url } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

impl ProviderConfig {
    fn resolve_env(self) -> Self {
        match self {
            ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
                api_key: resolve_env_vars(&api_key),
                base_url: base_url.as_deref().map(resolve_env_vars),
            },
            ProviderConfig::OpenAI {
                api_key,
                base_url,
                org_id,
            } => ProviderConfig::OpenAI {
                api_key: resolve_env_vars(&api_key),
                base_url: base_url.as_deref().map(resolve_env_vars),
                org_id: org_id.as_deref().map(resolve_env_vars),
            },
            ProviderConfig::Ollama { base_url } => ProviderConfig::Ollama {
                base_url: resolve_env_vars(&base_url),
            },
        }
    }
}

fn default_ollama_url() -> String {
    OLLAMA_URL.to_string()
}

/// Top-level rehearse configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RehearseConfig {
    /// Provider settings keyed by the name used in `provider/model`.
    pub providers: BTreeMap<String, ProviderConfig>,
    pub default_provider: String,
    pub default_model: String,
    /// Sampling temperature for question generation. Judging always uses 0.
    pub default_temperature: f64,
    pub max_tokens: u32,
    /// Questions per round when `--count` is not given.
    pub question_count: u32,
    /// Seconds to wait for the judge before skipping a theory answer.
    /// Zero disables the limit.
    pub evaluation_timeout_secs: u64,
    /// Where practice sessions are saved.
    pub output_dir: PathBuf,
    /// Replacement concept vocabulary.
    pub concepts: Option<Vec<String>>,
}

impl Default for RehearseConfig {
    fn default() -> Self {
        Self {
            providers: BTreeMap::new(),
            default_provider: "anthropic".to_string(),
            default_model: "claude-sonnet-4-20250514".to_string(),
            default_temperature: 0.7,
            max_tokens: 2048,
            question_count: 5,
            evaluation_timeout_secs: 60,
            output_dir: PathBuf::from("./rehearse-sessions"),
            concepts: None,
        }
    }
}

impl RehearseConfig {
    /// Concept tagger for this configuration.
    pub fn tagger(&self) -> ConceptTagger {
        match &self.concepts {
            Some(words) => ConceptTagger::with_vocabulary(words),
            None => ConceptTagger::default(),
        }
    }

    /// Split a `provider/model` selector, falling back to the configured defaults.
    ///
    /// A bare name without `/` is taken as a model of the default provider.
    pub fn resolve_model(&self, selector: Option<&str>) -> (String, String) {
        match selector.map(str::trim).filter(|s| !s.is_empty()) {
            Some(selector) => match selector.split_once('/') {
                Some((provider, model)) => (provider.to_string(), model.to_string()),
                None => (self.default_provider.clone(), selector.to_string()),
            },
            None => (self.default_provider.clone(), self.default_model.clone()),
        }
    }

    /// Build the provider registered under `name`.
    pub fn provider(&self, name: &str) -> Result<Arc<dyn GenerationProvider>> {
        let config = self.providers.get(name).with_context(|| {
            format!(
                "provider '{name}' is not configured; add [providers.{name}] to {LOCAL_CONFIG_FILE} \
                 or set REHEARSE_{}_KEY",
                name.to_uppercase()
            )
        })?;
        create_provider(config)
    }
}

/// Expand `${VAR}` references from the environment. Unset variables expand
/// to the empty string; an unterminated `${` is left as is.
fn resolve_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &rest[start + 2..start + 2 + len];
        out.push_str(&std::env::var(name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    out.push_str(rest);
    out
}

/// Load configuration from the default locations.
///
/// Search order:
/// 1. `rehearse.toml` in the current directory
/// 2. `~/.config/rehearse/config.toml`
///
/// Environment overrides: `REHEARSE_ANTHROPIC_KEY`, `REHEARSE_OPENAI_KEY`.
pub fn load_config() -> Result<RehearseConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<RehearseConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from(LOCAL_CONFIG_FILE);
            if local.exists() {
                Some(local)
            } else {
                global_config_path().filter(|p| p.exists())
            }
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<RehearseConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => RehearseConfig::default(),
    };

    Ok(apply_env(config))
}

fn apply_env(mut config: RehearseConfig) -> RehearseConfig {
    if let Ok(key) = std::env::var("REHEARSE_ANTHROPIC_KEY") {
        match config.providers.get_mut("anthropic") {
            Some(ProviderConfig::Anthropic { api_key, .. }) => *api_key = key,
            _ => {
                config.providers.insert(
                    "anthropic".into(),
                    ProviderConfig::Anthropic {
                        api_key: key,
                        base_url: None,
                    },
                );
            }
        }
    }

    if let Ok(key) = std::env::var("REHEARSE_OPENAI_KEY") {
        match config.providers.get_mut("openai") {
            Some(ProviderConfig::OpenAI { api_key, .. }) => *api_key = key,
            _ => {
                config.providers.insert(
                    "openai".into(),
                    ProviderConfig::OpenAI {
                        api_key: key,
                        base_url: None,
                        org_id: None,
                    },
                );
            }
        }
    }

    config.providers = std::mem::take(&mut config.providers)
        .into_iter()
        .map(|(name, provider)| (name, provider.resolve_env()))
        .collect();
    config
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("rehearse")
            .join("config.toml")
    })
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn GenerationProvider>> {
    Ok(match config {
        ProviderConfig::Anthropic { api_key, base_url } => {
            anyhow::ensure!(!api_key.is_empty(), "anthropic api_key is empty");
            Arc::new(AnthropicProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            anyhow::ensure!(!api_key.is_empty(), "openai api_key is empty");
            Arc::new(OpenAiProvider::new(
                api_key,
                base_url.clone(),
                org_id.clone(),
            )?)
        }
        ProviderConfig::Ollama { base_url } => Arc::new(OllamaProvider::new(base_url)?),
    })
}

/// Starter configuration written by `rehearse init`.
pub const STARTER_CONFIG: &str = r#"# rehearse configuration

default_provider = "anthropic"
default_model = "claude-sonnet-4-20250514"
default_temperature = 0.7
max_tokens = 2048
question_count = 5
evaluation_timeout_secs = 60
output_dir = "./rehearse-sessions"

# Replace the built-in concept keywords:
# concepts = ["closure", "event-loop", "prototype"]

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_REHEARSE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_REHEARSE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_REHEARSE_TEST_VAR}_suffix_${_REHEARSE_TEST_VAR}"),
            "prefix_hello_suffix_hello"
        );
        std::env::remove_var("_REHEARSE_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_edge_cases() {
        assert_eq!(resolve_env_vars("${_REHEARSE_SURELY_UNSET}x"), "x");
        assert_eq!(resolve_env_vars("no vars"), "no vars");
        assert_eq!(resolve_env_vars("broken ${VAR"), "broken ${VAR");
    }

    #[test]
    fn default_config() {
        let config = RehearseConfig::default();
        assert_eq!(config.default_provider, "anthropic");
        assert_eq!(config.question_count, 5);
        assert_eq!(config.evaluation_timeout_secs, 60);
        assert!(config.concepts.is_none());
    }

    #[test]
    fn parse_partial_config_fills_defaults() {
        let toml_str = r#"
default_provider = "openai"
default_model = "gpt-4.1"
concepts = ["Closure", "prototype"]

[providers.anthropic]
type = "anthropic"
api_key = "sk-test"

[providers.openai]
type = "openai"
api_key = "sk-openai"

[providers.local]
type = "ollama"
"#;
        let config: RehearseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.max_tokens, 2048);
        assert!(matches!(
            config.providers.get("local"),
            Some(ProviderConfig::Ollama { base_url }) if base_url == OLLAMA_URL
        ));
        assert!(config.tagger().tag("what is a closure?").contains("closure"));
    }

    #[test]
    fn starter_config_parses() {
        let config: RehearseConfig = toml::from_str(STARTER_CONFIG).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.default_temperature, 0.7);
        assert_eq!(config.output_dir, PathBuf::from("./rehearse-sessions"));
    }

    #[test]
    fn debug_masks_keys() {
        let config = ProviderConfig::OpenAI {
            api_key: "sk-secret".into(),
            base_url: None,
            org_id: None,
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("***"));
    }

    #[test]
    fn resolve_model_selector() {
        let config = RehearseConfig::default();
        assert_eq!(
            config.resolve_model(Some("ollama/llama3.1:8b")),
            ("ollama".to_string(), "llama3.1:8b".to_string())
        );
        assert_eq!(
            config.resolve_model(Some("claude-haiku-4-5-20251001")),
            ("anthropic".to_string(), "claude-haiku-4-5-20251001".to_string())
        );
        assert_eq!(
            config.resolve_model(None),
            ("anthropic".to_string(), "claude-sonnet-4-20250514".to_string())
        );
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "question_count = 3\n\n[providers.ollama]\ntype = \"ollama\"\nbase_url = \"http://box:11434\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.question_count, 3);
        assert!(config.provider("ollama").is_ok());
        assert!(config.provider("missing").is_err());
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn empty_key_is_rejected() {
        let config = ProviderConfig::Anthropic {
            api_key: String::new(),
            base_url: None,
        };
        assert!(create_provider(&config).is_err());
    }
}
