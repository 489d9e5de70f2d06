//! Configuration management for PremiumBot
//!
//! Configuration is loaded from `~/.premiumbot/config.json` (or an explicit
//! path) with environment variable overrides on top.

mod types;
pub mod validate;

pub use types::*;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{BotError, Result};

impl Config {
    /// Returns the PremiumBot configuration directory path (~/.premiumbot)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".premiumbot")
    }

    /// Returns the path to the config file (~/.premiumbot/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| {
                BotError::Config(format!("invalid config file '{}': {}", path.display(), e))
            })?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// `OPENAI_API_KEY`, `HOST` and `PORT` are honoured directly; the
    /// `PREMIUMBOT_SECTION_KEY` variables take precedence over them.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|k| var(k));

        // Agent
        if let Some(val) = var("PREMIUMBOT_AGENT_MODEL") {
            self.agent.model = val;
        }
        if let Some(v) = parse_var(&var, "PREMIUMBOT_AGENT_TEMPERATURE") {
            self.agent.temperature = v;
        }
        if let Some(v) = parse_var(&var, "PREMIUMBOT_AGENT_MAX_TOKENS") {
            self.agent.max_tokens = v;
        }
        if let Some(v) = parse_var(&var, "PREMIUMBOT_AGENT_MAX_TOOL_ITERATIONS") {
            self.agent.max_tool_iterations = v;
        }
        if let Some(val) = var("PREMIUMBOT_AGENT_SYSTEM_PROMPT_FILE") {
            self.agent.system_prompt_file = Some(val);
        }

        // Provider
        if let Some(val) = first(&["PREMIUMBOT_PROVIDERS_OPENAI_API_KEY", "OPENAI_API_KEY"]) {
            let provider = self
                .providers
                .openai
                .get_or_insert_with(ProviderConfig::default);
            provider.api_key = Some(val);
        }
        if let Some(val) = var("PREMIUMBOT_PROVIDERS_OPENAI_API_BASE") {
            let provider = self
                .providers
                .openai
                .get_or_insert_with(ProviderConfig::default);
            provider.api_base = Some(val);
        }
        if let Some(v) = parse_var(&var, "PREMIUMBOT_RETRY_ENABLED") {
            self.retry.enabled = v;
        }

        // Gateway
        if let Some(val) = first(&["PREMIUMBOT_GATEWAY_HOST", "HOST"]) {
            self.gateway.host = val;
        }
        if let Some(v) =
            parse_var(&var, "PREMIUMBOT_GATEWAY_PORT").or_else(|| parse_var(&var, "PORT"))
        {
            self.gateway.port = v;
        }
        if let Some(v) = parse_var(&var, "PREMIUMBOT_GATEWAY_RATE_LIMIT") {
            self.gateway.rate_limit = v;
        }

        // Table, sessions, logging
        if let Some(val) = var("PREMIUMBOT_PREMIUM_TABLE_PATH") {
            self.premium.table_path = val;
        }
        if let Some(v) = parse_var(&var, "PREMIUMBOT_SESSIONS_PERSIST") {
            self.sessions.persist = v;
        }
        if let Some(val) = var("PREMIUMBOT_LOGGING_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The configured OpenAI API key, if non-empty.
    pub fn openai_api_key(&self) -> Option<&str> {
        self.providers
            .openai
            .as_ref()
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.trim().is_empty())
    }

    /// The configured OpenAI base URL, if any.
    pub fn openai_api_base(&self) -> Option<&str> {
        self.providers
            .openai
            .as_ref()
            .and_then(|p| p.api_base.as_deref())
            .filter(|b| !b.trim().is_empty())
    }

    /// Resolved premium table path (expands ~).
    pub fn table_path(&self) -> PathBuf {
        expand_home(&self.premium.table_path)
    }

    /// Resolved session storage directory (expands ~).
    pub fn session_storage_path(&self) -> PathBuf {
        expand_home(&self.sessions.storage_path)
    }
}

/// Read and parse one variable; unparseable values are ignored.
fn parse_var<T, F>(var: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key).and_then(|v| v.trim().parse().ok())
}

/// Expand ~ to home directory in a path string
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
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
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.agent.temperature, 0.0);
        assert_eq!(config.agent.max_tool_iterations, 8);
        assert_eq!(config.agent.greeting_seed, "Hi");
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.gateway.port, 8000);
        assert_eq!(config.gateway.rate_limit, 100);
        assert_eq!(config.gateway.rate_window_secs, 3600);
        assert_eq!(config.gateway.exit_keywords, vec!["quit", "exit", "q"]);
        assert!(!config.retry.enabled);
        assert!(!config.sessions.persist);
        assert!(config.openai_api_key().is_none());
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{"gateway": {"port": 9090}, "agent": {"model": "gpt-4o-mini"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.gateway.port, 9090);
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.agent.model, "gpt-4o-mini");
        assert_eq!(config.agent.max_tool_iterations, 8);
    }

    #[test]
    fn test_plain_env_names() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
        ]));
        assert_eq!(config.openai_api_key(), Some("sk-test"));
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(config.gateway.port, 9000);
    }

    #[test]
    fn test_prefixed_env_wins() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[
            ("OPENAI_API_KEY", "plain"),
            ("PREMIUMBOT_PROVIDERS_OPENAI_API_KEY", "prefixed"),
            ("PORT", "9000"),
            ("PREMIUMBOT_GATEWAY_PORT", "9100"),
            ("PREMIUMBOT_AGENT_MAX_TOOL_ITERATIONS", "3"),
            ("PREMIUMBOT_SESSIONS_PERSIST", "true"),
        ]));
        assert_eq!(config.openai_api_key(), Some("prefixed"));
        assert_eq!(config.gateway.port, 9100);
        assert_eq!(config.agent.max_tool_iterations, 3);
        assert!(config.sessions.persist);
    }

    #[test]
    fn test_unparseable_env_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[("PORT", "not-a-port")]));
        assert_eq!(config.gateway.port, 8000);
    }

    #[test]
    fn test_empty_api_key_is_missing() {
        let mut config = Config::default();
        config.apply_overrides_from(env(&[("OPENAI_API_KEY", "  ")]));
        assert!(config.openai_api_key().is_none());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.premium.table_path, "premium.json");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = Config::default();
        config.gateway.farewell = "See you!".to_string();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.gateway.farewell, "See you!");
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("premium.json"), PathBuf::from("premium.json"));
        assert_eq!(expand_home("/abs/x.json"), PathBuf::from("/abs/x.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/t.json"), home.join("t.json"));
        }
    }
}
