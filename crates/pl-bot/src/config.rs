//! Bot configuration, loadable from TOML with environment overrides.

use anyhow::{Context, bail};
use pl_catalog::regions::{DEFAULT_FUZZY_THRESHOLD, DEFAULT_SUGGESTION_THRESHOLD};
use pl_inference::OllamaConfig;
use pl_protocol::Language;
use serde::Deserialize;

/// Config path used when neither the CLI nor `PASTALINK_CONFIG` names one.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/pastalink/bot.toml";

/// Top-level configuration for the bot service.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// JSON catalog file.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    /// Reply language when detection finds no evidence.
    #[serde(default)]
    pub fallback_language: Language,
    /// Classifications below this confidence are treated as unclassified.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Cap on entries listed in one disambiguation reply.
    #[serde(default = "default_max_links")]
    pub max_links_per_response: usize,
    #[serde(default)]
    pub server: ServerConfig,
    /// LLM tier settings. Optional, defaults to enabled.
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub regions: RegionsConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Input guard limits, in characters.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_min_message_chars")]
    pub min_message_chars: usize,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

/// Region normalization thresholds (Jaro-Winkler similarity).
#[derive(Debug, Clone, Deserialize)]
pub struct RegionsConfig {
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
}

fn default_catalog_path() -> String {
    "/etc/pastalink/catalog.json".into()
}
fn default_min_confidence() -> f64 {
    0.5
}
fn default_max_links() -> usize {
    6
}
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_min_message_chars() -> usize {
    2
}
fn default_max_message_chars() -> usize {
    1000
}
fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}
fn default_suggestion_threshold() -> f64 {
    DEFAULT_SUGGESTION_THRESHOLD
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            min_message_chars: default_min_message_chars(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            fallback_language: Language::default(),
            min_confidence: default_min_confidence(),
            max_links_per_response: default_max_links(),
            server: ServerConfig::default(),
            ollama: OllamaConfig::default(),
            input: InputConfig::default(),
            regions: RegionsConfig::default(),
        }
    }
}

impl BotConfig {
    /// Config file path: first CLI argument, then `PASTALINK_CONFIG`, then the default.
    pub fn resolve_path(cli_arg: Option<String>) -> String {
        cli_arg
            .or_else(|| std::env::var("PASTALINK_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load config from a TOML file path, apply environment overrides and validate.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        let mut config = Self::from_toml_str(&contents)
            .with_context(|| format!("parsing config file {path}"))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `OLLAMA_HOST`, `OLLAMA_MODEL` and `PASTALINK_CATALOG` from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("OLLAMA_HOST").filter(|v| !v.is_empty()) {
            self.ollama.host = host;
        }
        if let Some(model) = lookup("OLLAMA_MODEL").filter(|v| !v.is_empty()) {
            self.ollama.model = model;
        }
        if let Some(path) = lookup("PASTALINK_CATALOG").filter(|v| !v.is_empty()) {
            self.catalog_path = path;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            bail!("min_confidence must be within [0, 1], got {}", self.min_confidence);
        }
        if self.max_links_per_response < 2 {
            bail!(
                "max_links_per_response must be at least 2, got {}",
                self.max_links_per_response
            );
        }
        if self.input.min_message_chars == 0
            || self.input.min_message_chars > self.input.max_message_chars
        {
            bail!(
                "input limits must satisfy 0 < min_message_chars <= max_message_chars, got {}..{}",
                self.input.min_message_chars,
                self.input.max_message_chars
            );
        }
        for (name, value) in [
            ("regions.fuzzy_threshold", self.regions.fuzzy_threshold),
            ("regions.suggestion_threshold", self.regions.suggestion_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be within [0, 1], got {value}");
            }
        }
        if self.ollama.enabled && self.ollama.timeout_secs == 0 {
            bail!("ollama.timeout_secs must be positive");
        }
        if self.catalog_path.trim().is_empty() {
            bail!("catalog_path must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn deserialize_minimal_config() {
        let config = BotConfig::from_toml_str("").unwrap();
        assert_eq!(config.catalog_path, "/etc/pastalink/catalog.json");
        assert_eq!(config.fallback_language, Language::It);
        assert_eq!(config.min_confidence, 0.5);
        assert_eq!(config.max_links_per_response, 6);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ollama.model, "llama3.1:8b");
        assert_eq!(config.input.max_message_chars, 1000);
        assert_eq!(config.regions.fuzzy_threshold, 0.88);
        config.validate().unwrap();
    }

    #[test]
    fn deserialize_full_config() {
        let toml = r#"
catalog_path = "/srv/pastalink/catalog.json"
fallback_language = "en"
min_confidence = 0.65
max_links_per_response = 4

[server]
host = "127.0.0.1"
port = 9000

[ollama]
host = "http://gpu-box:11434"
model = "qwen2.5:7b"
timeout_secs = 15
enabled = false

[input]
min_message_chars = 3
max_message_chars = 500

[regions]
fuzzy_threshold = 0.9
"#;
        let config = BotConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.fallback_language, Language::En);
        assert_eq!(config.min_confidence, 0.65);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.ollama.timeout_secs, 15);
        assert!(!config.ollama.enabled);
        assert_eq!(config.input.min_message_chars, 3);
        assert_eq!(config.regions.fuzzy_threshold, 0.9);
        assert_eq!(config.regions.suggestion_threshold, 0.7);
        config.validate().unwrap();
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OLLAMA_HOST", "http://ollama:11434"),
            ("OLLAMA_MODEL", ""),
            ("PASTALINK_CATALOG", "/data/catalog.json"),
        ]);
        let mut config = BotConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.ollama.host, "http://ollama:11434");
        assert_eq!(config.ollama.model, "llama3.1:8b");
        assert_eq!(config.catalog_path, "/data/catalog.json");
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let mut config = BotConfig::default();
        config.min_confidence = 1.2;
        assert!(config.validate().is_err());

        let mut config = BotConfig::default();
        config.max_links_per_response = 1;
        assert!(config.validate().is_err());

        let mut config = BotConfig::default();
        config.input.min_message_chars = 2000;
        assert!(config.validate().is_err());

        let mut config = BotConfig::default();
        config.regions.fuzzy_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_language_fails_to_parse() {
        assert!(BotConfig::from_toml_str(r#"fallback_language = "de""#).is_err());
    }

    #[test]
    fn resolve_path_prefers_cli() {
        assert_eq!(
            BotConfig::resolve_path(Some("/tmp/bot.toml".into())),
            "/tmp/bot.toml"
        );
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"min_confidence = 0.7\n[server]\nport = 8181\n")
            .unwrap();
        let config = BotConfig::from_file(&file.path().to_string_lossy()).unwrap();
        assert_eq!(config.min_confidence, 0.7);
        assert_eq!(config.server.port, 8181);
    }

    #[test]
    fn from_file_missing_is_error() {
        assert!(BotConfig::from_file("/nonexistent/pastalink.toml").is_err());
    }
}
