//! Viewer sessions: WebSocket upgrade and the per-connection push loop.
//!
//! Each session polls the latest-value cache on a fixed cadence and
//! pushes whatever it holds. Sessions are isolated tasks: a dead or
//! slow viewer ends only its own loop and never touches the cache, the
//! subscription, or the other viewers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::cache::LatestValueCache;

/// Shared state for the viewer surface.
#[derive(Clone)]
pub struct ViewerState {
    pub cache: Arc<LatestValueCache>,
    pub viewers: Arc<AtomicUsize>,
    pub push_interval: Duration,
}

impl ViewerState {
    pub fn new(cache: Arc<LatestValueCache>, push_interval: Duration) -> Self {
        Self {
            cache,
            viewers: Arc::new(AtomicUsize::new(0)),
            push_interval,
        }
    }
}

/// Router for the push endpoint; callers layer informational routes on top.
pub fn viewer_router(state: ViewerState) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ViewerState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

// Decrements the live-viewer count when the session ends, however it ends.
struct ViewerGuard(Arc<AtomicUsize>);

impl Drop for ViewerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// One session, handshake to teardown.
///
/// Poll-and-push rather than event-driven: the cache has no subscriber
/// notification, and a fixed cadence is all the display needs. Nothing
/// is sent while the cache is empty. Any send failure, receive error,
/// or Close frame ends the session.
async fn handle_socket(socket: WebSocket, state: ViewerState) {
    state.viewers.fetch_add(1, Ordering::Relaxed);
    let _guard = ViewerGuard(state.viewers.clone());
    debug!("viewer session active");

    let (mut sender, mut receiver) = socket.split();
    let mut ticker = tokio::time::interval(state.push_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(snapshot) = state.cache.read().await else {
                    continue;
                };
                let json = match serde_json::to_string(&*snapshot) {
                    Ok(json) => json,
                    Err(e) => {
                        debug!("snapshot encoding failed: {e}");
                        continue;
                    }
                };
                if let Err(e) = sender.send(Message::Text(json)).await {
                    debug!("viewer send failed, closing session: {e}");
                    break;
                }
            }
            msg = receiver.next() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                // Viewers only listen; ignore anything else they send.
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("viewer session closed");
}
