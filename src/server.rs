use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Config;
use crate::constants::{EVENT_QUEUE_CAPACITY, OUTBOUND_QUEUE_CAPACITY};
use crate::error::ServerError;
use crate::game::Game;
use crate::gateway::{client_link, ClientInbox, OutboundMessage};
use crate::hub::{run_hub, GameEvent, Hub};
use crate::protocol::{parse_client_message, ClientMessage};
use crate::rng::{OsRandom, RandomSource, Rng};
use crate::types::Direction;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Hardening and no-cache headers stamped on every HTTP response.
const SECURITY_HEADERS: [(&str, &str); 11] = [
    ("x-dns-prefetch-control", "off"),
    ("x-frame-options", "SAMEORIGIN"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-download-options", "noopen"),
    ("x-content-type-options", "nosniff"),
    ("x-xss-protection", "1; mode=block"),
    ("surrogate-control", "no-store"),
    (
        "cache-control",
        "no-store, no-cache, must-revalidate, proxy-revalidate",
    ),
    ("pragma", "no-cache"),
    ("expires", "0"),
    ("x-powered-by", "PHP 7.4.3"),
];

#[derive(Clone)]
pub struct AppState {
    events: mpsc::Sender<GameEvent>,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(events: mpsc::Sender<GameEvent>) -> Self {
        Self {
            events,
            started_at: Utc::now(),
        }
    }
}

pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = static_dir {
        tracing::info!(root = %static_dir.display(), "serving static files");
        app.fallback_service(ServeDir::new(static_dir).not_found_service(not_found.into_service()))
    } else {
        tracing::warn!("static file root not found, serving the game socket only");
        app.fallback(not_found)
    };

    let mut app = app.layer(CorsLayer::permissive());
    for (name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }
    app
}

/// Starts the game loop and serves HTTP until the listener fails.
pub async fn run(config: Config) -> Result<(), ServerError> {
    config.validate()?;

    let rng: Box<dyn RandomSource + Send> = match config.seed {
        Some(seed) => Box::new(Rng::new(seed)),
        None => Box::new(OsRandom::new()),
    };
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let game = Game::new(config.bounds(), rng);
    tokio::spawn(run_hub(Hub::new(game), events_rx, config.rank_interval()));

    let app = router(AppState::new(events_tx), config.resolve_static_dir());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!(%addr, width = config.world_width, height = config.world_height, "listening");
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "startedAt": state.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// What the reader does with one inbound WebSocket frame.
#[derive(Debug, PartialEq, Eq)]
enum FrameAction {
    Move(Option<Direction>),
    Close,
    Ignore,
}

fn decode_frame(message: Message) -> FrameAction {
    let parsed = match &message {
        Message::Text(raw) => parse_client_message(raw.as_str()),
        Message::Binary(raw) => match std::str::from_utf8(raw) {
            Ok(text) => parse_client_message(text),
            Err(_) => None,
        },
        Message::Close(_) => return FrameAction::Close,
        _ => return FrameAction::Ignore,
    };
    match parsed {
        Some(ClientMessage::PlayerMove { direction }) => FrameAction::Move(direction),
        None => FrameAction::Ignore,
    }
}

async fn handle_socket(state: AppState, socket: WebSocket) {
    let client_id = make_client_id();
    let (link, inbox) = client_link(OUTBOUND_QUEUE_CAPACITY);

    let connected = GameEvent::Connected {
        client_id: client_id.clone(),
        link,
    };
    if state.events.send(connected).await.is_err() {
        tracing::warn!(client_id, "game loop is gone, refusing connection");
        return;
    }

    let (ws_sender, mut ws_receiver) = socket.split();
    let mut writer = tokio::spawn(write_frames(ws_sender, inbox));

    // The writer stops after a close frame; the socket is done at that point.
    let writer_finished = loop {
        let received = tokio::select! {
            _ = &mut writer => break true,
            received = ws_receiver.next() => received,
        };
        let Some(Ok(message)) = received else {
            break false;
        };

        let direction = match decode_frame(message) {
            FrameAction::Move(direction) => direction,
            FrameAction::Close => break false,
            FrameAction::Ignore => {
                tracing::debug!(client_id, "dropping unrecognized frame");
                continue;
            }
        };
        let moved = GameEvent::Moved {
            client_id: client_id.clone(),
            direction,
        };
        if state.events.send(moved).await.is_err() {
            break false;
        }
    };

    let _ = state
        .events
        .send(GameEvent::Disconnected {
            client_id: client_id.clone(),
        })
        .await;
    if !writer_finished {
        let _ = writer.await;
    }
}

/// Drains the client's queues into the socket. Close requests jump the queue.
async fn write_frames(mut sink: SplitSink<WebSocket, Message>, mut inbox: ClientInbox) {
    loop {
        let outbound = tokio::select! {
            biased;
            Some(close) = inbox.control.recv() => close,
            Some(outbound) = inbox.outbound.recv() => outbound,
            else => break,
        };
        let should_close = matches!(outbound, OutboundMessage::Close { .. });
        let result = match outbound {
            OutboundMessage::Text(payload) => sink.send(Message::Text(payload.into())).await,
            OutboundMessage::Close { code, reason } => {
                let frame = CloseFrame {
                    code,
                    reason: reason.into(),
                };
                sink.send(Message::Close(Some(frame))).await
            }
        };
        if result.is_err() || should_close {
            break;
        }
    }
}

fn make_client_id() -> String {
    let seq = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed);
    format!("client_{seq}")
}
