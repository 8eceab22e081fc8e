//! Configuration module for trailbot.
//!
//! Loads typed configuration from `~/.trailbot/config.json`, then lets a
//! few environment variables override the credentials so keys never have
//! to live on disk.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variables that override credentials in the config file.
const ENV_OPENAI_KEYS: &[&str] = &["OPENAI_KEY", "OPENAI_API_KEY"];
const ENV_HUGGINGFACE_KEY: &str = "HUGGINGFACE_API_KEY";
const ENV_RAPIDAPI_KEY: &str = "RAPIDAPI_KEY";
const ENV_GEOCODE_KEY: &str = "GEOCODE_API_KEY";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub agent: AgentSettings,
    pub services: ServicesConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when the file does not exist. Environment overrides are applied last.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Config::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path, without env overrides.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Get the default config directory path.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".trailbot")
    }

    /// Overlay credentials found through `lookup` (normally `std::env::var`).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = ENV_OPENAI_KEYS.iter().find_map(|&k| non_empty(k)) {
            self.providers
                .openai
                .get_or_insert_with(ProviderEntry::default)
                .api_key = key;
        }
        if let Some(key) = non_empty(ENV_HUGGINGFACE_KEY) {
            self.providers
                .huggingface
                .get_or_insert_with(ProviderEntry::default)
                .api_key = key;
        }
        if let Some(key) = non_empty(ENV_RAPIDAPI_KEY) {
            self.services.trails.api_key = key;
        }
        if let Some(key) = non_empty(ENV_GEOCODE_KEY) {
            self.services.geocoder.api_key = Some(key);
        }
    }

    /// Validate the configuration, returning every problem found.
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match self.providers.find_active(self.agent.provider.as_deref()) {
            None => match self.agent.provider.as_deref() {
                Some(name) => errors.push(format!(
                    "agent.provider is `{}` but that provider has no usable credentials.",
                    name
                )),
                None => errors.push(
                    "No completion provider configured. Set providers.openai.apiKey \
                     (or the OPENAI_KEY environment variable)."
                        .into(),
                ),
            },
            Some(ActiveProvider::OpenAi(_)) => {
                if !is_real_key(&self.services.trails.api_key) {
                    errors.push(
                        "services.trails.apiKey is missing. Set it (or RAPIDAPI_KEY) \
                         so trail lookups can run."
                            .into(),
                    );
                }
            }
            Some(_) => {}
        }

        if self.agent.model.is_empty() {
            errors.push("agent.model is empty. Specify a model name.".into());
        }
        if self.agent.max_trails_shown == 0 {
            errors.push("agent.maxTrailsShown must be at least 1.".into());
        }
        if self.agent.request_timeout_secs == 0 {
            errors.push("agent.requestTimeoutSecs must be at least 1.".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Write the default config template to disk.
    pub fn write_default_template() -> anyhow::Result<PathBuf> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = serde_json::json!({
            "providers": {
                "openai": {
                    "apiKey": "sk-YOUR_KEY_HERE"
                }
            },
            "agent": {
                "model": "gpt-3.5-turbo",
                "maxTrailsShown": 1
            },
            "services": {
                "trails": {
                    "apiKey": "YOUR_RAPIDAPI_KEY"
                }
            }
        });

        std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;
        Ok(path)
    }
}

/// A key counts as configured when it is non-empty and not a template
/// placeholder.
fn is_real_key(key: &str) -> bool {
    !key.trim().is_empty() && !key.contains("YOUR_")
}

// ── Provider Configuration ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderEntry {
    pub api_key: String,
    pub api_base: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BotLibreEntry {
    pub application: String,
    pub instance: String,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: Option<ProviderEntry>,
    pub huggingface: Option<ProviderEntry>,
    pub botlibre: Option<BotLibreEntry>,
}

/// The provider selected for this process.
#[derive(Debug, Clone, Copy)]
pub enum ActiveProvider<'a> {
    OpenAi(&'a ProviderEntry),
    HuggingFace(&'a ProviderEntry),
    BotLibre(&'a BotLibreEntry),
}

impl ActiveProvider<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi(_) => "openai",
            Self::HuggingFace(_) => "huggingface",
            Self::BotLibre(_) => "botlibre",
        }
    }
}

impl ProvidersConfig {
    /// Pick the provider to use.
    ///
    /// With an explicit `preferred` name only that provider is considered.
    /// Otherwise the first usable one wins, in the order openai,
    /// huggingface, botlibre.
    pub fn find_active(&self, preferred: Option<&str>) -> Option<ActiveProvider<'_>> {
        let openai = self
            .openai
            .as_ref()
            .filter(|e| is_real_key(&e.api_key))
            .map(ActiveProvider::OpenAi);
        let huggingface = self
            .huggingface
            .as_ref()
            .filter(|e| is_real_key(&e.api_key))
            .map(ActiveProvider::HuggingFace);
        let botlibre = self
            .botlibre
            .as_ref()
            .filter(|e| !e.application.trim().is_empty())
            .map(ActiveProvider::BotLibre);

        match preferred {
            Some("openai") => openai,
            Some("huggingface") => huggingface,
            Some("botlibre") => botlibre,
            Some(_) => None,
            None => openai.or(huggingface).or(botlibre),
        }
    }
}

// ── Agent Configuration ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentSettings {
    /// Explicit provider selection (`openai`, `huggingface`, `botlibre`).
    pub provider: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_trails_shown: usize,
    pub request_timeout_secs: u64,
    pub system_prompt: Option<String>,
}

impl AgentSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            provider: None,
            model: "gpt-3.5-turbo".into(),
            max_tokens: 3000,
            temperature: 0.7,
            max_trails_shown: 1,
            request_timeout_secs: 30,
            system_prompt: None,
        }
    }
}

// ── External Services ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub geocoder: GeocoderConfig,
    pub trails: TrailsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeocoderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://geocode.maps.co".into(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrailsConfig {
    pub base_url: String,
    pub api_key: String,
    /// Value of the `X-RapidAPI-Host` header.
    pub host: String,
}

impl Default for TrailsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://trailapi-trailapi.p.rapidapi.com".into(),
            api_key: String::new(),
            host: "trailapi-trailapi.p.rapidapi.com".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.model, "gpt-3.5-turbo");
        assert_eq!(config.agent.max_tokens, 3000);
        assert_eq!(config.agent.max_trails_shown, 1);
        assert_eq!(config.services.geocoder.base_url, "https://geocode.maps.co");
        assert!(config.providers.find_active(None).is_none());
    }

    #[test]
    fn test_deserialize_minimal_json() {
        let json = r#"{"providers": {"openai": {"apiKey": "sk-test"}}, "agent": {"maxTrailsShown": 3}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.providers.openai.unwrap().api_key, "sk-test");
        assert_eq!(config.agent.max_trails_shown, 3);
        assert_eq!(config.agent.temperature, 0.7);
    }

    #[test]
    fn test_find_active_prefers_openai() {
        let json = r#"{"providers": {
            "huggingface": {"apiKey": "hf_x"},
            "openai": {"apiKey": "sk-x"}
        }}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.providers.find_active(None).unwrap().name(), "openai");
        assert_eq!(
            config.providers.find_active(Some("huggingface")).unwrap().name(),
            "huggingface"
        );
        assert!(config.providers.find_active(Some("botlibre")).is_none());
    }

    #[test]
    fn test_placeholder_key_is_not_active() {
        let json = r#"{"providers": {"openai": {"apiKey": "sk-YOUR_KEY_HERE"}}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.providers.find_active(None).is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("OPENAI_KEY", "sk-env"),
            ("RAPIDAPI_KEY", "rapid-env"),
            ("GEOCODE_API_KEY", ""),
        ]));

        assert_eq!(config.providers.openai.as_ref().unwrap().api_key, "sk-env");
        assert_eq!(config.services.trails.api_key, "rapid-env");
        assert!(config.services.geocoder.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_all_problems() {
        let json = r#"{"providers": {"openai": {"apiKey": "sk-x"}}, "agent": {"model": "", "maxTrailsShown": 0}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("services.trails.apiKey")));
    }

    #[test]
    fn test_botlibre_needs_no_trail_key() {
        let json = r#"{"providers": {"botlibre": {"application": "123", "instance": "456"}}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
    }
}
