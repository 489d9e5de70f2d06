//! Tool invoker: runs the single registered tool for a model tool call.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::providers::ToolDefinition;
use crate::session::ToolCall;

use super::Tool;

/// Executes model tool calls against exactly one tool.
///
/// `invoke` always yields text. Unknown tool names, undecodable arguments and
/// tool errors become an `Error: ...` string so the caller can still answer
/// every request with one tool-result message.
#[derive(Clone)]
pub struct ToolInvoker {
    tool: Arc<dyn Tool>,
}

impl ToolInvoker {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self { tool }
    }

    /// Name of the registered tool.
    pub fn tool_name(&self) -> &str {
        self.tool.name()
    }

    /// The definition the model is bound to.
    pub fn definition(&self) -> ToolDefinition {
        self.tool.definition()
    }

    /// Run one tool call and return its result text.
    pub async fn invoke(&self, call: &ToolCall) -> String {
        if call.name != self.tool.name() {
            warn!(tool = %call.name, id = %call.id, "Model requested an unknown tool");
            return format!(
                "Error: unknown tool '{}'. The only available tool is '{}'.",
                call.name,
                self.tool.name()
            );
        }

        let args: Value = match serde_json::from_str(&call.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!(tool = %call.name, id = %call.id, error = %e, "Invalid tool arguments");
                return format!("Error: tool arguments are not valid JSON: {}", e);
            }
        };

        info!(tool = %call.name, id = %call.id, "Executing tool");
        let start = Instant::now();

        match self.tool.execute(args).await {
            Ok(output) => {
                info!(
                    tool = %call.name,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tool executed successfully"
                );
                output
            }
            Err(e) => {
                error!(
                    tool = %call.name,
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tool execution failed"
                );
                format!("Error: {}", e)
            }
        }
    }
}
