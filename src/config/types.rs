//! Configuration type definitions for PremiumBot
//!
//! All types implement serde traits for JSON serialization and have sensible
//! defaults, so a partial (or missing) config file is always valid.

use serde::{Deserialize, Serialize};

/// Main configuration struct for PremiumBot
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Model, sampling and persona settings
    pub agent: AgentConfig,
    /// LLM provider credentials
    pub providers: ProvidersConfig,
    /// Retry behavior for provider calls
    pub retry: RetryConfig,
    /// WebSocket gateway configuration
    pub gateway: GatewayConfig,
    /// Premium reference table
    pub premium: PremiumConfig,
    /// Session storage
    pub sessions: SessionsConfig,
    /// Logging output
    pub logging: LoggingConfig,
}

// ============================================================================
// Agent Configuration
// ============================================================================

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model identifier sent to the provider
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens per completion
    pub max_tokens: u32,
    /// Maximum tool rounds in a single turn
    pub max_tool_iterations: usize,
    /// Optional file replacing the built-in persona template
    pub system_prompt_file: Option<String>,
    /// Advisor name substituted into the persona
    pub advisor_name: String,
    /// Product name substituted into the persona
    pub product_name: String,
    /// Language the advisor must speak
    pub language: String,
    /// Synthetic first user message that triggers the greeting
    pub greeting_seed: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            max_tool_iterations: 8,
            system_prompt_file: None,
            advisor_name: "Jordan".to_string(),
            product_name: "Cancer Care Protection".to_string(),
            language: "English".to_string(),
            greeting_seed: "Hi".to_string(),
        }
    }
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// LLM provider configurations
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    /// OpenAI configuration
    pub openai: Option<ProviderConfig>,
}

/// Generic provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<String>,
    /// Custom API base URL
    #[serde(default)]
    pub api_base: Option<String>,
}

/// Retry behavior for provider calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable automatic retry for transient provider errors.
    pub enabled: bool,
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds for exponential backoff.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

// ============================================================================
// Gateway Configuration
// ============================================================================

/// Gateway server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Connections accepted per IP per window (0 disables the limiter)
    pub rate_limit: u32,
    /// Rate limit window length in seconds
    pub rate_window_secs: u64,
    /// CORS allowed origins; `"*"` allows any
    pub allowed_origins: Vec<String>,
    /// Messages that end the conversation (case-insensitive)
    pub exit_keywords: Vec<String>,
    /// Reply sent before closing on an exit keyword
    pub farewell: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            rate_limit: 100,
            rate_window_secs: 3600,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            exit_keywords: vec!["quit".to_string(), "exit".to_string(), "q".to_string()],
            farewell: "Goodbye!".to_string(),
        }
    }
}

// ============================================================================
// Premium Table & Sessions
// ============================================================================

/// Premium reference table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiumConfig {
    /// Path to the JSON premium table
    pub table_path: String,
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            table_path: "premium.json".to_string(),
        }
    }
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Write sessions to disk as JSON files
    pub persist: bool,
    /// Directory for persisted sessions
    pub storage_path: String,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            persist: false,
            storage_path: "~/.premiumbot/sessions".to_string(),
        }
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// Single-line text
    #[default]
    Compact,
    /// JSON lines
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Append logs to this file instead of stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}
