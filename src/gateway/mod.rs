//! Session gateway and its WebSocket transport
//!
//! `SessionGateway` owns the live sessions and runs turns through the
//! conversation driver. `server` exposes it over axum: one WebSocket
//! connection is one session, admitted by the per-IP rate limiter.

pub mod rate_limit;
pub mod server;
mod session_gateway;

pub use rate_limit::FixedWindowRateLimiter;
pub use server::{
    build_router, serve, spawn_limiter_sweeper, AppState, ChatSettings, ERROR_REPLY,
    INBOUND_QUEUE_CAPACITY, SETUP_FAILURE_REASON,
};
pub use session_gateway::{OpenedSession, SessionGateway};
