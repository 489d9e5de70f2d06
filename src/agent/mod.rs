//! Agent module - the conversation core
//!
//! - `ContextBuilder`: persona system prompt and greeting seed for new sessions
//! - `BoundModel`: a provider bound to the single lookup tool
//! - `ConversationDriver`: the model/tool state machine that runs one turn

pub mod context;
pub mod driver;
mod model;

pub use context::ContextBuilder;
pub use driver::{ConversationDriver, DriverState, DEFAULT_MAX_TOOL_ITERATIONS};
pub use model::BoundModel;
