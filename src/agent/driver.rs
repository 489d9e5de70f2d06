//! Conversation driver
//!
//! Runs one turn as an explicit state machine:
//!
//! ```text
//!            model reply has tool calls
//!  AwaitingModel ───────────────────────▶ AwaitingTool(calls)
//!       ▲   │                                    │
//!       │   │ plain reply                        │ one result per call,
//!       │   ▼                                    │ in request order
//!       │  Done                                  │
//!       └────────────────────────────────────────┘
//! ```
//!
//! Only the final plain answer leaves the driver. Tool failures are text
//! inside tool results, so the state machine has no failure state; model
//! errors propagate to the caller unretried.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{BotError, Result};
use crate::session::{Message, Role, Session, ToolCall};
use crate::tools::ToolInvoker;

use super::model::BoundModel;

/// Default cap on tool rounds per turn.
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 8;

/// Where a turn currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverState {
    /// The model is to be asked for its next message.
    AwaitingModel,
    /// The last assistant message requested these calls.
    AwaitingTool(Vec<ToolCall>),
    /// The last message is a plain assistant answer.
    Done,
}

/// Alternates model calls and tool calls until the model answers plainly.
#[derive(Clone)]
pub struct ConversationDriver {
    model: BoundModel,
    invoker: ToolInvoker,
    max_iterations: usize,
}

impl ConversationDriver {
    pub fn new(model: BoundModel, invoker: ToolInvoker) -> Self {
        Self {
            model,
            invoker,
            max_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }

    /// Set the maximum number of tool rounds a single turn may take.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Run one transition, appending to `session`.
    pub async fn step(&self, state: DriverState, session: &mut Session) -> Result<DriverState> {
        match state {
            DriverState::AwaitingModel => {
                let reply = self.model.complete(&session.messages).await?;
                let next = match &reply.tool_calls {
                    Some(calls) if !calls.is_empty() => DriverState::AwaitingTool(calls.clone()),
                    _ => DriverState::Done,
                };
                session.add_message(reply);
                Ok(next)
            }
            DriverState::AwaitingTool(calls) => {
                for call in &calls {
                    let result = self.invoker.invoke(call).await;
                    session.add_message(Message::tool_result(&call.id, &result));
                }
                Ok(DriverState::AwaitingModel)
            }
            DriverState::Done => Ok(DriverState::Done),
        }
    }

    /// Run a full turn.
    ///
    /// The session's last message must be from the user (the seed greeting
    /// counts). On success the returned session ends with a plain assistant
    /// message. If the model keeps requesting tools past the cap, the turn
    /// fails with [`BotError::IterationLimit`].
    pub async fn advance(&self, mut session: Session) -> Result<Session> {
        match session.last_message() {
            Some(m) if m.role == Role::User => {}
            Some(m) => {
                return Err(BotError::Session(format!(
                    "cannot advance session {}: last message is from {}, expected user",
                    session.key, m.role
                )))
            }
            None => {
                return Err(BotError::Session(format!(
                    "cannot advance session {}: history is empty",
                    session.key
                )))
            }
        }

        let start = Instant::now();
        let mut state = DriverState::AwaitingModel;
        let mut rounds = 0;

        while state != DriverState::Done {
            if let DriverState::AwaitingTool(calls) = &state {
                if rounds == self.max_iterations {
                    warn!(
                        session_id = %session.key,
                        limit = self.max_iterations,
                        "Tool loop reached maximum iterations"
                    );
                    return Err(BotError::IterationLimit {
                        limit: self.max_iterations,
                    });
                }
                rounds += 1;
                debug!(
                    session_id = %session.key,
                    round = rounds,
                    calls = calls.len(),
                    "Running tool round"
                );
            }
            state = self.step(state, &mut session).await?;
        }

        info!(
            session_id = %session.key,
            tool_rounds = rounds,
            latency_ms = start.elapsed().as_millis() as u64,
            "Turn complete"
        );
        Ok(session)
    }
}
