//! OpenAI Provider Implementation
//!
//! This module implements the `LLMProvider` trait for OpenAI's Chat Completions API,
//! handling message conversion, tool calls, and response parsing.
//!
//! # Example
//!
//! ```rust,ignore
//! use premiumbot::providers::{openai::OpenAIProvider, ChatOptions, LLMProvider};
//! use premiumbot::session::Message;
//!
//! async fn example() {
//!     let provider = OpenAIProvider::new("your-api-key");
//!
//!     let messages = vec![
//!         Message::system("You are a friendly insurance advisor."),
//!         Message::user("Hi"),
//!     ];
//!
//!     let response = provider
//!         .chat(messages, vec![], None, ChatOptions::default())
//!         .await
//!         .unwrap();
//!
//!     println!("OpenAI: {}", response.content);
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BotError, ProviderError, Result};
use crate::session::{Message, Role};

use super::{
    parse_provider_error, ChatOptions, LLMProvider, LLMResponse, LLMToolCall, ToolDefinition,
    Usage,
};

/// The OpenAI API endpoint URL.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// The default OpenAI model to use.
pub const DEFAULT_MODEL: &str = "gpt-4o";

// ============================================================================
// OpenAI API Request Types
// ============================================================================

/// OpenAI API request body.
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    /// Only sent alongside `tools`; one tool request per model reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    parallel_tool_calls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A message in OpenAI's format.
#[derive(Debug, Serialize)]
struct OpenAIMessage {
    /// Role: "system", "user", "assistant", or "tool"
    role: String,
    /// Message content (null for an assistant message that only calls tools)
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCallRequest>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

/// A tool call in a request (assistant requesting tool execution).
#[derive(Debug, Serialize)]
struct OpenAIToolCallRequest {
    id: String,
    /// Always "function"
    r#type: String,
    function: OpenAIFunctionCall,
}

/// Function call details.
#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    /// JSON-encoded arguments
    arguments: String,
}

/// OpenAI tool definition.
#[derive(Debug, Serialize)]
struct OpenAITool {
    r#type: String,
    function: OpenAIFunctionDef,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

// ============================================================================
// OpenAI API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAIToolCallResponse>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIToolCallResponse {
    id: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
    #[serde(default)]
    r#type: String,
}

// ============================================================================
// OpenAI Provider
// ============================================================================

/// OpenAI chat-completion provider.
pub struct OpenAIProvider {
    /// API key for authentication
    api_key: String,
    /// API base URL
    api_base: String,
    /// Model used when the caller does not override it
    model: String,
    /// HTTP client for making requests
    client: Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given API key.
    ///
    /// # Example
    /// ```
    /// use premiumbot::providers::openai::OpenAIProvider;
    /// use premiumbot::providers::LLMProvider;
    ///
    /// let provider = OpenAIProvider::new("sk-xxx");
    /// assert_eq!(provider.name(), "openai");
    /// assert_eq!(provider.default_model(), "gpt-4o");
    /// ```
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: OPENAI_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client: Client::new(),
        }
    }

    /// Create a provider against an OpenAI-compatible endpoint.
    ///
    /// A trailing slash on `api_base` is removed.
    pub fn with_base_url(api_key: &str, api_base: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            client: Client::new(),
        }
    }

    /// Set the default model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert history messages to OpenAI API format.
fn convert_messages(messages: Vec<Message>) -> Vec<OpenAIMessage> {
    messages
        .into_iter()
        .map(|msg| {
            let role = match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            }
            .to_string();

            let tool_calls = msg.tool_calls.filter(|tcs| !tcs.is_empty()).map(|tcs| {
                tcs.into_iter()
                    .map(|tc| OpenAIToolCallRequest {
                        id: tc.id,
                        r#type: "function".to_string(),
                        function: OpenAIFunctionCall {
                            name: tc.name,
                            arguments: tc.arguments,
                        },
                    })
                    .collect()
            });

            OpenAIMessage {
                role,
                content: if msg.content.is_empty() && tool_calls.is_some() {
                    None
                } else {
                    Some(msg.content)
                },
                tool_calls,
                tool_call_id: msg.tool_call_id,
            }
        })
        .collect()
}

fn convert_tools(tools: Vec<ToolDefinition>) -> Vec<OpenAITool> {
    tools
        .into_iter()
        .map(|t| OpenAITool {
            r#type: "function".to_string(),
            function: OpenAIFunctionDef {
                name: t.name,
                description: t.description,
                parameters: t.parameters,
            },
        })
        .collect()
}

fn convert_response(response: OpenAIResponse) -> LLMResponse {
    let choice = response.choices.into_iter().next();

    let (content, tool_calls) = match choice {
        Some(c) => {
            let content = c.message.content.unwrap_or_default();
            let tool_calls = c
                .message
                .tool_calls
                .map(|tcs| {
                    tcs.into_iter()
                        .map(|tc| {
                            LLMToolCall::new(&tc.id, &tc.function.name, &tc.function.arguments)
                        })
                        .collect()
                })
                .unwrap_or_default();
            (content, tool_calls)
        }
        None => (String::new(), Vec::new()),
    };

    let mut llm_response = if tool_calls.is_empty() {
        LLMResponse::text(&content)
    } else {
        LLMResponse::with_tools(&content, tool_calls)
    };

    if let Some(usage) = response.usage {
        llm_response =
            llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
    }

    llm_response
}

/// Map a non-success body to a typed error, preferring OpenAI's own message.
fn convert_error(status: u16, body: &str) -> ProviderError {
    let detail = match serde_json::from_str::<OpenAIErrorResponse>(body) {
        Ok(parsed) if parsed.error.r#type.is_empty() => parsed.error.message,
        Ok(parsed) => format!("{} - {}", parsed.error.r#type, parsed.error.message),
        Err(_) => body.to_string(),
    };
    parse_provider_error(status, &detail)
}

/// Classify a failure to get any response at all.
///
/// Timeouts and connect/transport failures are transient and typed so a
/// retry layer can act on them.
fn send_error(e: reqwest::Error) -> BotError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string()).into()
    } else if e.is_connect() || e.is_request() {
        ProviderError::Network(format!("OpenAI request failed: {}", e)).into()
    } else {
        BotError::Provider(format!("OpenAI request failed: {}", e))
    }
}

// ============================================================================
// LLMProvider Implementation
// ============================================================================

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(
        &self,
        messages: Vec<Message>,
        tools: Vec<ToolDefinition>,
        model: Option<&str>,
        options: ChatOptions,
    ) -> Result<LLMResponse> {
        let model = model.unwrap_or(&self.model);
        let (openai_tools, parallel_tool_calls) = if tools.is_empty() {
            (None, None)
        } else {
            (Some(convert_tools(tools)), Some(false))
        };

        let request = OpenAIRequest {
            model: model.to_string(),
            messages: convert_messages(messages),
            tools: openai_tools,
            parallel_tool_calls,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        debug!(model = %model, messages = request.messages.len(), "OpenAI request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(convert_error(status.as_u16(), &error_text).into());
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| BotError::Provider(format!("Failed to parse OpenAI response: {}", e)))?;

        let converted = convert_response(openai_response);
        debug!(
            tool_calls = converted.tool_calls.len(),
            total_tokens = converted.usage.as_ref().map(|u| u.total_tokens),
            "OpenAI response received"
        );
        Ok(converted)
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ToolCall;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_mock(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(_req): Json<Value>| {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAIProvider::new("test-key");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.default_model(), "gpt-4o");
        assert_eq!(provider.api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_openai_provider_with_base_url_and_model() {
        let provider =
            OpenAIProvider::with_base_url("test-key", "https://custom.api/v1/").with_model("gpt-4o-mini");
        assert_eq!(provider.api_base, "https://custom.api/v1");
        assert_eq!(provider.default_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_convert_messages_with_tool_calls() {
        let tool_call = ToolCall::new("call_1", "premium_filter", r#"{"age": "30"}"#);
        let messages = vec![
            Message::system("sys"),
            Message::assistant_with_tools("", vec![tool_call]),
            Message::tool_result("call_1", "IDR 100"),
        ];
        let converted = convert_messages(messages);

        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[1].role, "assistant");
        assert!(converted[1].content.is_none());
        let calls = converted[1].tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].r#type, "function");
        assert_eq!(converted[2].role, "tool");
        assert_eq!(converted[2].tool_call_id, Some("call_1".to_string()));
        assert_eq!(converted[2].content, Some("IDR 100".to_string()));
    }

    #[test]
    fn test_convert_response_with_tool_calls() {
        let response = OpenAIResponse {
            choices: vec![OpenAIChoice {
                message: OpenAIResponseMessage {
                    content: None,
                    tool_calls: Some(vec![OpenAIToolCallResponse {
                        id: "call_123".to_string(),
                        function: OpenAIFunctionCall {
                            name: "premium_filter".to_string(),
                            arguments: r#"{"age":"30"}"#.to_string(),
                        },
                    }]),
                },
            }],
            usage: Some(OpenAIUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            }),
        };
        let converted = convert_response(response);

        assert_eq!(converted.content, "");
        assert_eq!(converted.tool_calls[0].name, "premium_filter");
        assert_eq!(converted.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_convert_response_empty_choices() {
        let converted = convert_response(OpenAIResponse {
            choices: vec![],
            usage: None,
        });
        assert_eq!(converted.content, "");
        assert!(!converted.has_tool_calls());
    }

    #[test]
    fn test_request_serialization_omits_unset_fields() {
        let request = OpenAIRequest {
            model: "gpt-4o".to_string(),
            messages: vec![],
            tools: None,
            parallel_tool_calls: None,
            max_tokens: None,
            temperature: Some(0.0),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("temperature"));
        assert!(!json.contains("tools"));
        assert!(!json.contains("parallel_tool_calls"));
        assert!(!json.contains("max_tokens"));
    }

    #[test]
    fn test_convert_error_uses_api_message() {
        let body = r#"{"error":{"message":"Incorrect API key","type":"invalid_request_error"}}"#;
        let err = convert_error(401, body);
        assert!(matches!(err, ProviderError::Auth(_)));
        assert!(err.to_string().contains("Incorrect API key"));

        let err = convert_error(503, "upstream down");
        assert!(matches!(err, ProviderError::ServerError(_)));
    }

    #[tokio::test]
    async fn test_chat_against_mock_server() {
        let base = spawn_mock(
            StatusCode::OK,
            json!({
                "choices": [{"message": {"content": "Hello! How can I help?"}}],
                "usage": {"prompt_tokens": 3, "completion_tokens": 4}
            }),
        )
        .await;
        let provider = OpenAIProvider::with_base_url("k", &base);
        let response = provider
            .chat(vec![Message::user("Hi")], vec![], None, ChatOptions::new())
            .await
            .unwrap();
        assert_eq!(response.content, "Hello! How can I help?");
        assert_eq!(response.usage.unwrap().total_tokens, 7);
    }

    #[tokio::test]
    async fn test_chat_maps_rate_limit() {
        let base = spawn_mock(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "slow down", "type": "rate_limit"}}),
        )
        .await;
        let provider = OpenAIProvider::with_base_url("k", &base);
        let err = provider
            .chat(vec![Message::user("Hi")], vec![], None, ChatOptions::new())
            .await
            .unwrap_err();
        match err {
            BotError::ProviderTyped(pe) => assert!(pe.is_retryable()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_retryable() {
        // Reserve a port, then free it so nothing is listening there.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = OpenAIProvider::with_base_url("k", &format!("http://{}/v1", addr));
        let err = provider
            .chat(vec![Message::user("Hi")], vec![], None, ChatOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BotError::ProviderTyped(ProviderError::Network(_))
        ));
        assert!(crate::providers::retry::is_retryable(&err));
    }
}
