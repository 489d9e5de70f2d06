//! Session types for premiumbot
//!
//! This module defines the conversation types: messages, roles, tool calls,
//! and the per-connection `Session` that owns one ordered history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A conversation session: one connection's ordered message history.
///
/// Sessions are identified by an opaque id generated when the connection
/// opens. The history is append-only; nothing in the crate reorders or
/// edits a message once it has been pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session
    pub key: String,
    /// Ordered list of messages in this conversation
    pub messages: Vec<Message>,
    /// When this session was created
    pub created_at: DateTime<Utc>,
    /// When this session was last modified
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new empty session with the given key.
    ///
    /// # Example
    /// ```
    /// use premiumbot::session::Session;
    ///
    /// let session = Session::new("session-1");
    /// assert!(session.messages.is_empty());
    /// ```
    pub fn new(key: &str) -> Self {
        let now = Utc::now();
        Self {
            key: key.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new empty session with a freshly generated v4 UUID key.
    pub fn with_random_key() -> Self {
        Self::new(&Uuid::new_v4().to_string())
    }

    /// Append a message and bump `updated_at`.
    ///
    /// # Example
    /// ```
    /// use premiumbot::session::{Session, Message};
    ///
    /// let mut session = Session::new("test");
    /// session.add_message(Message::user("Hello!"));
    /// assert_eq!(session.messages.len(), 1);
    /// ```
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Get the number of messages in this session.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Check if this session is empty (no messages).
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get the last message in this session, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Text of the most recent plain assistant answer, if any.
    pub fn latest_answer(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_plain_assistant())
            .map(|m| m.content.as_str())
    }

    /// Check the request/response pairing of tool traffic.
    ///
    /// Every assistant message carrying tool calls must be followed directly
    /// by one tool-result message per call, with matching ids in request
    /// order. Returns the index of the first offending message, or `None`
    /// when the whole history is well formed.
    pub fn find_pairing_violation(&self) -> Option<usize> {
        let mut i = 0;
        while i < self.messages.len() {
            let msg = &self.messages[i];
            if msg.is_tool_result() {
                // A result with no request directly before it.
                return Some(i);
            }
            if let Some(calls) = msg.tool_calls.as_ref().filter(|c| !c.is_empty()) {
                for (offset, call) in calls.iter().enumerate() {
                    let idx = i + 1 + offset;
                    match self.messages.get(idx) {
                        Some(result)
                            if result.is_tool_result()
                                && result.tool_call_id.as_deref() == Some(call.id.as_str()) => {}
                        // A trailing unanswered request is a violation too.
                        _ => return Some(idx),
                    }
                }
                i += 1 + calls.len();
                continue;
            }
            i += 1;
        }
        None
    }
}

/// A single message in a conversation.
///
/// Messages can be from users, assistants, system prompts, or tool results.
/// An assistant message with a non-empty `tool_calls` list is a tool request;
/// its `content` may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The text content of the message
    pub content: String,
    /// Tool calls made by the assistant (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// ID of the tool call this message is responding to (for tool results)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a new user message.
    ///
    /// # Example
    /// ```
    /// use premiumbot::session::{Message, Role};
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a new plain assistant message.
    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a new system message.
    ///
    /// # Example
    /// ```
    /// use premiumbot::session::{Message, Role};
    ///
    /// let msg = Message::system("You are a friendly insurance advisor.");
    /// assert_eq!(msg.role, Role::System);
    /// ```
    pub fn system(content: &str) -> Self {
        Self {
            role: Role::System,
            content: content.to_string(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a new tool result message answering the call `tool_call_id`.
    ///
    /// # Example
    /// ```
    /// use premiumbot::session::{Message, Role};
    ///
    /// let msg = Message::tool_result("call_123", "The Premium plan is IDR 100");
    /// assert_eq!(msg.role, Role::Tool);
    /// assert_eq!(msg.tool_call_id, Some("call_123".to_string()));
    /// ```
    pub fn tool_result(tool_call_id: &str, content: &str) -> Self {
        Self {
            role: Role::Tool,
            content: content.to_string(),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.to_string()),
        }
    }

    /// Create an assistant message requesting one or more tool calls.
    ///
    /// # Example
    /// ```
    /// use premiumbot::session::{Message, ToolCall};
    ///
    /// let call = ToolCall::new("call_1", "premium_filter", r#"{"age": "30"}"#);
    /// let msg = Message::assistant_with_tools("", vec![call]);
    /// assert!(msg.has_tool_calls());
    /// ```
    pub fn assistant_with_tools(content: &str, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    /// Check if this message has tool calls.
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls
            .as_ref()
            .map(|tc| !tc.is_empty())
            .unwrap_or(false)
    }

    /// Check if this message is a tool result.
    pub fn is_tool_result(&self) -> bool {
        self.role == Role::Tool
    }

    /// An assistant message that requests nothing, i.e. a final answer.
    pub fn is_plain_assistant(&self) -> bool {
        self.role == Role::Assistant && !self.has_tool_calls()
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt
    System,
    /// User input
    User,
    /// Model output
    Assistant,
    /// Tool execution result
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call, echoed back in the tool result
    pub id: String,
    /// Name of the tool to execute
    pub name: String,
    /// JSON-encoded argument object
    pub arguments: String,
}

impl ToolCall {
    /// Create a new tool call.
    pub fn new(id: &str, name: &str, arguments: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }
}
