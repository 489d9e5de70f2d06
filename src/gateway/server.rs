//! HTTP and WebSocket transport for the session gateway.
//!
//! Routes:
//! - `GET /` welcome document
//! - `GET /health` liveness plus the open session count
//! - `GET /chat` chat WebSocket, one session per connection

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

use crate::error::{BotError, Result};

use super::rate_limit::FixedWindowRateLimiter;
use super::session_gateway::SessionGateway;

/// Sent in place of an answer when a turn fails.
pub const ERROR_REPLY: &str =
    "Sorry, something went wrong while processing your message. Please try again.";

/// Close reason when the greeting turn fails.
pub const SETUP_FAILURE_REASON: &str = "Internal error";

/// User messages held for a connection while a turn is running.
/// Text arriving while the queue is full is dropped.
pub const INBOUND_QUEUE_CAPACITY: usize = 8;

/// Per-connection chat behaviour.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub exit_keywords: Vec<String>,
    pub farewell: String,
}

impl ChatSettings {
    /// Whether `text` ends the conversation (trimmed, case-insensitive).
    pub fn is_exit_keyword(&self, text: &str) -> bool {
        let text = text.trim();
        self.exit_keywords
            .iter()
            .any(|k| k.trim().eq_ignore_ascii_case(text))
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            exit_keywords: vec!["quit".into(), "exit".into(), "q".into()],
            farewell: "Goodbye!".into(),
        }
    }
}

/// Shared state for every route.
pub struct AppState {
    pub gateway: Arc<SessionGateway>,
    pub limiter: Arc<FixedWindowRateLimiter>,
    pub chat: ChatSettings,
}

impl AppState {
    pub fn new(
        gateway: Arc<SessionGateway>,
        limiter: Arc<FixedWindowRateLimiter>,
        chat: ChatSettings,
    ) -> Self {
        Self {
            gateway,
            limiter,
            chat,
        }
    }
}

/// Build the router. `"*"` in `allowed_origins` allows any origin.
pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Result<Router> {
    let cors = cors_layer(allowed_origins)?;
    Ok(Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", get(chat))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if allowed_origins.iter().any(|o| o.trim() == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o.trim())
                .map_err(|_| BotError::Config(format!("invalid allowed origin '{}'", o)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "Gateway listening");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    info!("Gateway stopped");
    Ok(())
}

/// Periodically drop expired rate-limit windows.
pub fn spawn_limiter_sweeper(
    limiter: Arc<FixedWindowRateLimiter>,
    every: Duration,
) -> JoinHandle<()> {
    let every = every.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick fires immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            limiter.sweep();
            debug!(tracked = limiter.entry_count(), "Swept rate limiter");
        }
    })
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Medical Insurance Chatbot",
        "websocket_info": "Connect to the WebSocket endpoint at /chat",
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "active_sessions": state.gateway.active_sessions().await,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn chat(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| {
        let span = info_span!("session", %peer, session_id = tracing::field::Empty);
        handle_socket(socket, peer.ip(), state).instrument(span)
    })
    .into_response()
}

async fn handle_socket(socket: WebSocket, ip: IpAddr, state: Arc<AppState>) {
    let (mut sink, stream) = socket.split();

    if !state.limiter.check(ip) {
        warn!("Rate limit exceeded, rejecting connection");
        let reason = format!("Rate limit exceeded ({}/hour)", state.limiter.limit());
        close(&mut sink, close_code::POLICY, &reason).await;
        return;
    }

    let (inbound_tx, mut inbound) = mpsc::channel(INBOUND_QUEUE_CAPACITY);
    let (closed_tx, mut closed) = watch::channel(false);
    let reader = tokio::spawn(read_frames(stream, inbound_tx, closed_tx).in_current_span());

    let opened = tokio::select! {
        biased;
        _ = disconnected(&mut closed) => {
            info!("Client left before the greeting");
            reader.abort();
            return;
        }
        opened = state.gateway.open_session() => opened,
    };

    let opened = match opened {
        Ok(opened) => opened,
        Err(e) => {
            error!(error = %e, "Failed to open session");
            close(&mut sink, close_code::ERROR, SETUP_FAILURE_REASON).await;
            reader.abort();
            return;
        }
    };
    let id = opened.id;
    Span::current().record("session_id", id.as_str());

    if sink.send(Message::Text(opened.greeting.into())).await.is_ok() {
        converse(&state, &id, &mut sink, &mut inbound, &mut closed).await;
    }

    reader.abort();
    state.gateway.close_session(&id).await;
    info!("Connection closed");
}

/// Answer user messages one at a time until the client leaves or says goodbye.
async fn converse(
    state: &AppState,
    id: &str,
    sink: &mut SplitSink<WebSocket, Message>,
    inbound: &mut mpsc::Receiver<String>,
    closed: &mut watch::Receiver<bool>,
) {
    while let Some(text) = inbound.recv().await {
        if state.chat.is_exit_keyword(&text) {
            info!("Client ended the conversation");
            let _ = sink
                .send(Message::Text(state.chat.farewell.clone().into()))
                .await;
            close(sink, close_code::NORMAL, "").await;
            return;
        }

        let reply = tokio::select! {
            biased;
            _ = disconnected(closed) => {
                info!("Client disconnected mid-turn, abandoning turn");
                return;
            }
            result = state.gateway.advance_with_user_text(id, &text) => match result {
                Ok(answer) => answer,
                Err(e) => {
                    error!(error = %e, "Turn failed");
                    ERROR_REPLY.to_string()
                }
            },
        };

        if sink.send(Message::Text(reply.into())).await.is_err() {
            debug!("Client went away before the reply was sent");
            return;
        }
    }
}

/// Forward text frames until the client closes, then flag the disconnect.
///
/// Never waits on the queue, so a close frame is seen even mid-turn.
async fn read_frames(
    mut stream: SplitStream<WebSocket>,
    inbound: mpsc::Sender<String>,
    closed: watch::Sender<bool>,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match inbound.try_send(text.as_str().to_owned()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(
                        capacity = INBOUND_QUEUE_CAPACITY,
                        "Inbound queue full, dropping message"
                    );
                }
                Err(TrySendError::Closed(_)) => break,
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => debug!("Ignoring binary frame"),
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "WebSocket read failed");
                break;
            }
        }
    }
    let _ = closed.send(true);
}

/// Resolves once the reader has seen the client go away.
async fn disconnected(closed: &mut watch::Receiver<bool>) {
    let _ = closed.wait_for(|c| *c).await;
}

async fn close(sink: &mut SplitSink<WebSocket, Message>, code: u16, reason: &str) {
    let frame = CloseFrame {
        code,
        reason: reason.to_string().into(),
    };
    if let Err(e) = sink.send(Message::Close(Some(frame))).await {
        debug!(error = %e, "Failed to send close frame");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{BoundModel, ContextBuilder, ConversationDriver};
    use crate::providers::{ChatOptions, LLMProvider, LLMResponse, ToolDefinition};
    use crate::session::{Message as ChatMessage, SessionManager};
    use crate::tools::{PremiumLookupTool, PremiumTable, ToolInvoker};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct Hello;

    #[async_trait]
    impl LLMProvider for Hello {
        async fn chat(
            &self,
            _messages: Vec<ChatMessage>,
            _tools: Vec<ToolDefinition>,
            _model: Option<&str>,
            _options: ChatOptions,
        ) -> Result<LLMResponse> {
            Ok(LLMResponse::text("Hello"))
        }

        fn default_model(&self) -> &str {
            "hello"
        }

        fn name(&self) -> &str {
            "hello"
        }
    }

    fn state() -> Arc<AppState> {
        let table = PremiumTable::from_json_str(
            r#"[{"Age": "30", "Cancer_type": "Lung Cancer", "Stage": "Early Stage",
                 "Gender": "Male", "Option A": "1", "Option B": "2", "Option C": "3"}]"#,
        )
        .unwrap();
        let invoker = ToolInvoker::new(Arc::new(PremiumLookupTool::new(Arc::new(table))));
        let model = BoundModel::new(Arc::new(Hello), invoker.definition());
        let gateway = SessionGateway::new(
            ConversationDriver::new(model, invoker),
            ContextBuilder::new(),
            SessionManager::new_memory(),
        );
        Arc::new(AppState::new(
            Arc::new(gateway),
            Arc::new(FixedWindowRateLimiter::new(100, Duration::from_secs(3600))),
            ChatSettings::default(),
        ))
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_exit_keywords() {
        let settings = ChatSettings::default();
        assert!(settings.is_exit_keyword("quit"));
        assert!(settings.is_exit_keyword("  EXIT "));
        assert!(settings.is_exit_keyword("Q"));
        assert!(!settings.is_exit_keyword("quite"));
        assert!(!settings.is_exit_keyword(""));
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let err = build_router(state(), &["bad\norigin".to_string()])
            .err()
            .unwrap();
        assert!(matches!(err, BotError::Config(_)));
    }

    #[tokio::test]
    async fn test_root_route() {
        let router = build_router(state(), &["http://localhost:3000".to_string()]).unwrap();
        let (status, body) = get_json(router, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Welcome to Medical Insurance Chatbot");
        assert_eq!(
            body["websocket_info"],
            "Connect to the WebSocket endpoint at /chat"
        );
    }

    #[tokio::test]
    async fn test_health_counts_sessions() {
        let state = state();
        state.gateway.open_session().await.unwrap();
        let router = build_router(state, &["*".to_string()]).unwrap();
        let (status, body) = get_json(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["active_sessions"], 1);
    }

    #[tokio::test]
    async fn test_cors_header_for_allowed_origin() {
        let router = build_router(state(), &["http://localhost:3000".to_string()]).unwrap();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
    }
}
