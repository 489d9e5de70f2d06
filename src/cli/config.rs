//! Config check command handler.

use std::path::Path;

use anyhow::{Context, Result};

use premiumbot::config::validate::{validate_config, validate_values, DiagnosticLevel};
use premiumbot::config::Config;

use super::ConfigAction;

/// Validate configuration file.
pub(crate) fn cmd_config(config_path: Option<&Path>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Check => {
            let path = config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(Config::path);
            println!("Config file: {}", path.display());

            let mut diagnostics = Vec::new();
            if path.exists() {
                let content =
                    std::fs::read_to_string(&path).context("Failed to read config file")?;
                let raw: serde_json::Value = match serde_json::from_str(&content) {
                    Ok(v) => v,
                    Err(e) => {
                        println!("[ERROR] Invalid JSON: {}", e);
                        return Ok(());
                    }
                };
                diagnostics.extend(validate_config(&raw));
            } else {
                println!("[OK] No config file found (using defaults)");
            }

            match Config::load_from_path(&path) {
                Ok(config) => diagnostics.extend(validate_values(&config)),
                Err(e) => println!("[ERROR] {}", e),
            }

            for diag in &diagnostics {
                println!("{}", diag);
            }

            let errors = diagnostics
                .iter()
                .filter(|d| d.level == DiagnosticLevel::Error)
                .count();
            let warnings = diagnostics
                .iter()
                .filter(|d| d.level == DiagnosticLevel::Warn)
                .count();

            if errors == 0 && warnings == 0 {
                println!("\nConfiguration looks good!");
            } else {
                println!("\nFound {} error(s), {} warning(s)", errors, warnings);
            }
        }
    }
    Ok(())
}
