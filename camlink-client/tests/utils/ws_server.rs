use anyhow::Result;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

/// What the test tells the server to do with the connected client.
#[derive(Debug)]
pub enum ServerAction {
    Send(String),
    Close,
}

#[derive(Clone)]
struct ServerState {
    silent: bool,
    inbound: mpsc::UnboundedSender<String>,
    actions: Arc<Mutex<Option<mpsc::UnboundedReceiver<ServerAction>>>>,
}

/// In-process signaling server serving a single WebSocket client on `/ws`.
pub struct MockSignalingServer {
    pub url: String,
    inbound: mpsc::UnboundedReceiver<String>,
    actions: mpsc::UnboundedSender<ServerAction>,
    task: JoinHandle<()>,
}

impl MockSignalingServer {
    pub async fn start() -> Result<Self> {
        Self::bind(false).await
    }

    /// A server that completes the handshake and then never reads, so pings
    /// are never answered.
    pub async fn start_silent() -> Result<Self> {
        Self::bind(true).await
    }

    async fn bind(silent: bool) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let (actions, actions_rx) = mpsc::unbounded_channel();
        let state = ServerState {
            silent,
            inbound: inbound_tx,
            actions: Arc::new(Mutex::new(Some(actions_rx))),
        };

        let app = Router::new().route("/ws", get(ws_handler)).with_state(state);
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            url: format!("ws://{addr}/ws"),
            inbound,
            actions,
            task,
        })
    }

    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.actions.send(ServerAction::Send(text.into()));
    }

    pub fn close_client(&self) {
        let _ = self.actions.send(ServerAction::Close);
    }

    /// Next text frame received from the client.
    pub async fn next_inbound(&mut self) -> Option<String> {
        tokio::time::timeout(
            std::time::Duration::from_millis(super::SIGNAL_TIMEOUT_MS),
            self.inbound.recv(),
        )
        .await
        .ok()
        .flatten()
    }
}

impl Drop for MockSignalingServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: ServerState) {
    let Some(mut actions) = state.actions.lock().await.take() else {
        tracing::warn!("[MockServer] Only one client is served");
        return;
    };
    if state.silent {
        let _socket = socket;
        while actions.recv().await.is_some() {}
        return;
    }

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            action = actions.recv() => match action {
                Some(ServerAction::Send(text)) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Some(ServerAction::Close) | None => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let _ = state.inbound.send(text.as_str().to_owned());
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("[MockServer] Client session finished");
}
