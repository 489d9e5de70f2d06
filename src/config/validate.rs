//! Configuration validation with unknown field detection.

use serde_json::Value;

use super::Config;

/// Known top-level config field names.
const KNOWN_TOP_LEVEL: &[&str] = &[
    "agent",
    "providers",
    "retry",
    "gateway",
    "premium",
    "sessions",
    "logging",
];

/// Known fields for each section.
const KNOWN_AGENT: &[&str] = &[
    "model",
    "temperature",
    "max_tokens",
    "max_tool_iterations",
    "system_prompt_file",
    "advisor_name",
    "product_name",
    "language",
    "greeting_seed",
];
const KNOWN_PROVIDERS: &[&str] = &["openai"];
const KNOWN_RETRY: &[&str] = &["enabled", "max_retries", "base_delay_ms", "max_delay_ms"];
const KNOWN_GATEWAY: &[&str] = &[
    "host",
    "port",
    "rate_limit",
    "rate_window_secs",
    "allowed_origins",
    "exit_keywords",
    "farewell",
];
const KNOWN_PREMIUM: &[&str] = &["table_path"];
const KNOWN_SESSIONS: &[&str] = &["persist", "storage_path"];
const KNOWN_LOGGING: &[&str] = &["level", "format", "file"];

fn known_fields(section: &str) -> Option<&'static [&'static str]> {
    match section {
        "agent" => Some(KNOWN_AGENT),
        "providers" => Some(KNOWN_PROVIDERS),
        "retry" => Some(KNOWN_RETRY),
        "gateway" => Some(KNOWN_GATEWAY),
        "premium" => Some(KNOWN_PREMIUM),
        "sessions" => Some(KNOWN_SESSIONS),
        "logging" => Some(KNOWN_LOGGING),
        _ => None,
    }
}

/// A validation diagnostic.
#[derive(Debug)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub path: String,
    pub message: String,
}

#[derive(Debug, PartialEq)]
pub enum DiagnosticLevel {
    Ok,
    Warn,
    Error,
}

impl Diagnostic {
    fn new(level: DiagnosticLevel, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            DiagnosticLevel::Ok => "[OK]",
            DiagnosticLevel::Warn => "[WARN]",
            DiagnosticLevel::Error => "[ERROR]",
        };
        if self.path.is_empty() {
            write!(f, "{} {}", prefix, self.message)
        } else {
            write!(f, "{} {}: {}", prefix, self.path, self.message)
        }
    }
}

/// Simple Levenshtein distance for "did you mean?" suggestions.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut curr = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev = curr;
    }
    prev[b.len()]
}

/// Suggest the closest known field name (if distance <= 3).
pub fn suggest_field(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| format!("did you mean '{}'?", k))
}

fn unknown_field(path: String, key: &str, known: &[&str]) -> Diagnostic {
    let message = match suggest_field(key, known) {
        Some(hint) => format!("Unknown field '{}' ({})", key, hint),
        None => format!("Unknown field '{}'", key),
    };
    Diagnostic::new(DiagnosticLevel::Error, path, message)
}

/// Validate a raw JSON config value against known field names.
pub fn validate_config(raw: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match raw.as_object() {
        Some(o) => o,
        None => {
            diagnostics.push(Diagnostic::new(
                DiagnosticLevel::Error,
                "",
                "Config must be a JSON object",
            ));
            return diagnostics;
        }
    };

    diagnostics.push(Diagnostic::new(DiagnosticLevel::Ok, "", "Valid JSON"));

    let mut has_unknown = false;
    for (key, value) in obj {
        let Some(known) = known_fields(key) else {
            has_unknown = true;
            diagnostics.push(unknown_field(key.clone(), key, KNOWN_TOP_LEVEL));
            continue;
        };
        let Some(section) = value.as_object() else {
            continue;
        };
        for field in section.keys() {
            if !known.contains(&field.as_str()) {
                has_unknown = true;
                diagnostics.push(unknown_field(format!("{}.{}", key, field), field, known));
            }
        }
    }

    if let Some(openai) = obj
        .get("providers")
        .and_then(|p| p.get("openai"))
        .and_then(|o| o.as_object())
    {
        for field in openai.keys() {
            if field != "api_key" && field != "api_base" {
                has_unknown = true;
                diagnostics.push(unknown_field(
                    format!("providers.openai.{}", field),
                    field,
                    &["api_key", "api_base"],
                ));
            }
        }
    }

    if !has_unknown {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Ok,
            "",
            "All fields recognized",
        ));
    }

    diagnostics
}

/// Semantic checks on a parsed config: missing credentials, unusable values.
pub fn validate_values(config: &Config) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if config.openai_api_key().is_none() {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Error,
            "providers.openai.api_key",
            "Missing; set it in the config or via OPENAI_API_KEY",
        ));
    }
    if !config.table_path().exists() {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Error,
            "premium.table_path",
            format!("File not found: {}", config.table_path().display()),
        ));
    }
    if config.agent.max_tool_iterations == 0 {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Warn,
            "agent.max_tool_iterations",
            "0 means the model can never use the premium lookup",
        ));
    }
    if config.gateway.rate_limit == 0 {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Warn,
            "gateway.rate_limit",
            "0 disables connection rate limiting",
        ));
    }
    if config.gateway.rate_window_secs == 0 {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Error,
            "gateway.rate_window_secs",
            "Must be greater than 0",
        ));
    }
    if config.gateway.allowed_origins.iter().any(|o| o.trim() == "*") {
        diagnostics.push(Diagnostic::new(
            DiagnosticLevel::Warn,
            "gateway.allowed_origins",
            "'*' allows any origin",
        ));
    }

    diagnostics
}
