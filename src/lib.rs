//! PremiumBot - conversational cancer insurance sales agent
//!
//! A WebSocket gateway runs one conversation per connection. Each user
//! message advances a turn: the model is called, may request the
//! `premium_filter` lookup any number of times, and finally answers in text.

pub mod agent;
pub mod config;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod session;
pub mod tools;
pub mod utils;

pub use agent::{BoundModel, ContextBuilder, ConversationDriver, DriverState};
pub use config::Config;
pub use error::{BotError, ProviderError, Result};
pub use gateway::{FixedWindowRateLimiter, SessionGateway};
pub use providers::{
    ChatOptions, LLMProvider, LLMResponse, LLMToolCall, OpenAIProvider, ToolDefinition, Usage,
};
pub use session::{Message, Role, Session, SessionManager, ToolCall};
pub use tools::{PremiumLookupTool, PremiumTable, Tool, ToolInvoker};
