//! Tool types for premiumbot
//!
//! This module defines the `Tool` trait implemented by the lookup tool the
//! model is allowed to call.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::providers::ToolDefinition;

/// A capability the model may request during a turn.
///
/// `execute` returns plain text meant for the model. Input the tool can
/// explain to the customer (unsupported values, no matching record) should
/// come back as `Ok` text; `Err` is reserved for arguments the tool cannot
/// make sense of at all.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use premiumbot::tools::Tool;
/// use premiumbot::error::Result;
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str { "echo" }
///     fn description(&self) -> &str { "Echo the message back" }
///     fn parameters(&self) -> Value {
///         serde_json::json!({
///             "type": "object",
///             "properties": {"message": {"type": "string"}},
///             "required": ["message"]
///         })
///     }
///     async fn execute(&self, args: Value) -> Result<String> {
///         Ok(args["message"].as_str().unwrap_or_default().to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model uses to request this tool.
    fn name(&self) -> &str;

    /// Description sent to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's arguments.
    fn parameters(&self) -> Value;

    /// Execute the tool with the model-supplied arguments.
    async fn execute(&self, args: Value) -> Result<String>;

    /// The definition advertised to the model.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}
