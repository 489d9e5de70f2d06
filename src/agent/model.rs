//! Model caller bound to a single tool definition.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::providers::{ChatOptions, LLMProvider, ToolDefinition};
use crate::session::Message;

/// A provider plus the one tool the model may request.
///
/// The tool definition is fixed at construction; every completion advertises
/// exactly that tool.
#[derive(Clone)]
pub struct BoundModel {
    provider: Arc<dyn LLMProvider>,
    tool: ToolDefinition,
    model: Option<String>,
    options: ChatOptions,
}

impl BoundModel {
    pub fn new(provider: Arc<dyn LLMProvider>, tool: ToolDefinition) -> Self {
        Self {
            provider,
            tool,
            model: None,
            options: ChatOptions::default(),
        }
    }

    /// Override the provider's default model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    /// Model identifier used for requests.
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Ask the model for the next assistant message given the full history.
    pub async fn complete(&self, history: &[Message]) -> Result<Message> {
        let response = self
            .provider
            .chat(
                history.to_vec(),
                vec![self.tool.clone()],
                self.model.as_deref(),
                self.options.clone(),
            )
            .await?;

        if let Some(usage) = &response.usage {
            debug!(
                provider = self.provider.name(),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model usage"
            );
        }

        Ok(response.into_message())
    }
}
