//! Shared CLI helpers: config loading and service assembly.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use premiumbot::agent::{BoundModel, ContextBuilder, ConversationDriver};
use premiumbot::config::Config;
use premiumbot::gateway::{ChatSettings, SessionGateway};
use premiumbot::providers::{ChatOptions, LLMProvider, OpenAIProvider, RetryProvider};
use premiumbot::session::SessionManager;
use premiumbot::tools::{PremiumLookupTool, PremiumTable, ToolInvoker};

/// Load config from `path`, or the default location when `None`.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => Config::load_from_path(p)
            .with_context(|| format!("Failed to load configuration from {}", p.display())),
        None => Config::load().with_context(|| "Failed to load configuration"),
    }
}

/// Load the premium table named by the config.
pub(crate) fn load_table(config: &Config) -> Result<Arc<PremiumTable>> {
    let path = config.table_path();
    let table = PremiumTable::load(&path)
        .with_context(|| format!("Failed to load premium table from {}", path.display()))?;
    Ok(Arc::new(table))
}

/// Build the OpenAI provider, wrapped in retries when enabled.
pub(crate) fn create_provider(config: &Config) -> Result<Arc<dyn LLMProvider>> {
    let api_key = config.openai_api_key().ok_or_else(|| {
        anyhow!("No OpenAI API key configured. Set OPENAI_API_KEY or providers.openai.api_key")
    })?;

    let provider = match config.openai_api_base() {
        Some(base) => OpenAIProvider::with_base_url(api_key, base),
        None => OpenAIProvider::new(api_key),
    };

    if !config.retry.enabled {
        return Ok(Arc::new(provider));
    }

    info!(
        max_retries = config.retry.max_retries,
        "Provider retries enabled"
    );
    Ok(Arc::new(
        RetryProvider::new(Box::new(provider))
            .with_max_retries(config.retry.max_retries)
            .with_base_delay_ms(config.retry.base_delay_ms)
            .with_max_delay_ms(config.retry.max_delay_ms),
    ))
}

/// Assemble the session gateway from config. Fails fast on a missing API
/// key, an unloadable table or an unreadable persona file.
pub(crate) fn create_gateway(config: &Config) -> Result<SessionGateway> {
    let provider = create_provider(config)?;
    let table = load_table(config)?;
    info!(rows = table.len(), brackets = table.brackets().len(), "Premium table loaded");

    let invoker = ToolInvoker::new(Arc::new(PremiumLookupTool::new(table)));
    let options = ChatOptions::new()
        .with_max_tokens(config.agent.max_tokens)
        .with_temperature(config.agent.temperature);
    let model = BoundModel::new(provider, invoker.definition())
        .with_model(&config.agent.model)
        .with_options(options);
    let model_name = model.model_name().to_string();
    let driver = ConversationDriver::new(model, invoker)
        .with_max_iterations(config.agent.max_tool_iterations);
    info!(
        model = %model_name,
        max_tool_iterations = driver.max_iterations(),
        "Conversation driver ready"
    );

    let mut context = ContextBuilder::new()
        .with_advisor_name(&config.agent.advisor_name)
        .with_product_name(&config.agent.product_name)
        .with_language(&config.agent.language)
        .with_greeting_seed(&config.agent.greeting_seed);
    if let Some(file) = &config.agent.system_prompt_file {
        context = context
            .with_template_file(Path::new(file))
            .with_context(|| "Failed to load system prompt")?;
    }

    let sessions = if config.sessions.persist {
        let path = config.session_storage_path();
        info!(path = %path.display(), "Persisting sessions");
        SessionManager::with_path(path).with_context(|| "Failed to open session storage")?
    } else {
        SessionManager::new_memory()
    };

    Ok(SessionGateway::new(driver, context, sessions))
}

pub(crate) fn chat_settings(config: &Config) -> ChatSettings {
    ChatSettings {
        exit_keywords: config.gateway.exit_keywords.clone(),
        farewell: config.gateway.farewell.clone(),
    }
}
