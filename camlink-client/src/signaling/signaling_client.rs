use crate::link::EventSink;
use crate::signaling::{ChannelHealth, Heartbeat, HeartbeatVerdict, SignalingChannel, SignalingEvent};
use bytes::Bytes;
use camlink_core::{IceCandidate, SessionDescription, SignalMessage};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket signaling client.
///
/// One instance serves exactly one connection attempt. `connect()` spawns a
/// connection task that dials the server, pumps outbound frames through a
/// writer task, reads inbound frames in arrival order and runs the heartbeat.
/// The task reports `Connected` once and then exactly one terminal event.
pub struct SignalingClient {
    url: String,
    heartbeat: Heartbeat,
    events: EventSink<SignalingEvent>,
    health: Arc<ChannelHealth>,
    outgoing: Option<mpsc::UnboundedSender<Message>>,
    task: Option<JoinHandle<()>>,
}

impl SignalingClient {
    pub fn new(
        url: impl Into<String>,
        heartbeat: Heartbeat,
        events: EventSink<SignalingEvent>,
    ) -> Self {
        Self {
            url: url.into(),
            heartbeat,
            events,
            health: Arc::new(ChannelHealth::new()),
            outgoing: None,
            task: None,
        }
    }

    fn send_signal(&self, msg: SignalMessage) {
        debug_assert!(
            msg.is_client_originated(),
            "'{}' is never sent by the client",
            msg.type_name()
        );
        let Some(outgoing) = &self.outgoing else {
            warn!(
                "Attempted to send '{}' on a signaling channel that is not connected",
                msg.type_name()
            );
            return;
        };
        match msg.encode() {
            Ok(json) => {
                if outgoing.send(Message::text(json)).is_err() {
                    warn!("Failed to queue '{}': signaling writer is gone", msg.type_name());
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }
}

impl SignalingChannel for SignalingClient {
    fn connect(&mut self) {
        if self.task.is_some() {
            warn!(url = %self.url, "Signaling client already started");
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.outgoing = Some(tx.clone());
        self.task = Some(tokio::spawn(run_connection(
            self.url.clone(),
            self.heartbeat,
            self.events.clone(),
            self.health.clone(),
            tx,
            rx,
        )));
    }

    fn send_ready(&self) {
        self.send_signal(SignalMessage::Ready);
    }

    fn send_description(&self, description: &SessionDescription) {
        self.send_signal(description.clone().into());
    }

    fn send_candidate(&self, candidate: &IceCandidate) {
        self.send_signal(candidate.clone().into());
    }

    fn disconnect(&mut self) {
        if let Some(outgoing) = self.outgoing.take() {
            let _ = outgoing.send(Message::Close(None));
        }
        if let Some(task) = self.task.take() {
            task.abort();
            info!(session = %self.events.session(), "Signaling client disconnected");
        }
        self.health.mark_closed();
    }

    fn is_connection_alive(&self) -> bool {
        let alive = self.task.is_some() && self.health.is_alive(self.heartbeat.timeout);
        if !alive && self.health.is_stale(self.heartbeat.timeout) {
            warn!(
                since = ?self.health.since_last_pong(),
                "Heartbeat timeout: no pong within {:?}",
                self.heartbeat.timeout
            );
        }
        alive
    }
}

impl Drop for SignalingClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn run_connection(
    url: String,
    heartbeat: Heartbeat,
    events: EventSink<SignalingEvent>,
    health: Arc<ChannelHealth>,
    outgoing_tx: mpsc::UnboundedSender<Message>,
    outgoing_rx: mpsc::UnboundedReceiver<Message>,
) {
    info!(%url, session = %events.session(), "Connecting to signaling server");

    // The staleness clock covers the handshake too: a dial that stalls past
    // the heartbeat timeout counts as a failed health check.
    let ws = match time::timeout(heartbeat.timeout, connect_async(url.as_str())).await {
        Ok(Ok((ws, _))) => ws,
        Ok(Err(e)) => {
            warn!(%url, "Failed to open signaling channel: {}", e);
            events.emit(SignalingEvent::Disconnected);
            return;
        }
        Err(_) => {
            warn!(%url, timeout = ?heartbeat.timeout, "Signaling handshake timed out");
            events.emit(SignalingEvent::HealthCheckFailed);
            return;
        }
    };

    health.mark_open();
    info!(%url, "Signaling channel open");
    events.emit(SignalingEvent::Connected);

    let (sink, stream) = ws.split();
    let mut send_task = tokio::spawn(write_loop(sink, outgoing_rx));

    let terminal = tokio::select! {
        event = read_loop(stream, &events, &health) => event,
        event = heartbeat_loop(heartbeat, &health, &outgoing_tx) => event,
        _ = &mut send_task => SignalingEvent::Disconnected,
    };

    // Lets the writer flush a close frame and release the socket.
    let _ = outgoing_tx.send(Message::Close(None));
    health.mark_closed();

    info!(session = %events.session(), ?terminal, "Signaling channel finished");
    events.emit(terminal);
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        let closing = matches!(msg, Message::Close(_));
        if let Err(e) = sink.send(msg).await {
            warn!("Failed to send signaling frame: {}", e);
            break;
        }
        if closing {
            break;
        }
    }
    debug!("Signaling writer finished");
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    events: &EventSink<SignalingEvent>,
    health: &ChannelHealth,
) -> SignalingEvent {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Some(event) = parse_inbound(text.as_str()) {
                    events.emit(event);
                }
            }
            Ok(Message::Binary(data)) => match std::str::from_utf8(&data) {
                Ok(text) => {
                    if let Some(event) = parse_inbound(text) {
                        events.emit(event);
                    }
                }
                Err(_) => warn!(len = data.len(), "Dropping non UTF-8 binary signaling frame"),
            },
            Ok(Message::Pong(_)) => {
                health.record_pong();
                debug!("Received pong");
            }
            Ok(Message::Close(frame)) => {
                info!(?frame, "Signaling server closed the channel");
                return SignalingEvent::Disconnected;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Signaling receive error: {}", e);
                return SignalingEvent::Disconnected;
            }
        }
    }

    info!("Signaling stream ended");
    SignalingEvent::Disconnected
}

async fn heartbeat_loop(
    heartbeat: Heartbeat,
    health: &ChannelHealth,
    outgoing: &mpsc::UnboundedSender<Message>,
) -> SignalingEvent {
    let mut ticker = time::interval_at(Instant::now() + heartbeat.interval, heartbeat.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(interval = ?heartbeat.interval, timeout = ?heartbeat.timeout, "Starting heartbeat");

    loop {
        ticker.tick().await;
        match heartbeat.check(health) {
            HeartbeatVerdict::Probe => {
                if outgoing.send(Message::Ping(Bytes::new())).is_err() {
                    warn!("Ping failed: signaling writer is gone");
                    return SignalingEvent::HealthCheckFailed;
                }
                debug!("Ping sent");
            }
            HeartbeatVerdict::Stale(since) => {
                warn!(?since, "Heartbeat timeout, signaling channel presumed dead");
                return SignalingEvent::HealthCheckFailed;
            }
            HeartbeatVerdict::NotRunning => {
                warn!("Cannot send ping, signaling channel is not running");
                return SignalingEvent::HealthCheckFailed;
            }
        }
    }
}

/// Decodes one inbound frame. Malformed and unrecognized payloads are
/// dropped with a diagnostic.
pub(crate) fn parse_inbound(text: &str) -> Option<SignalingEvent> {
    let message = match SignalMessage::decode(text) {
        Ok(m) => m,
        Err(e) => {
            warn!("Failed to decode signaling message: {}. Text: {}", e, text);
            return None;
        }
    };

    match &message {
        SignalMessage::Unknown => {
            debug!("Ignoring signaling message of unrecognized type: {}", text);
            None
        }
        m if !m.is_server_originated() => {
            warn!(
                "Server sent '{}', which only flows client to server; ignoring",
                m.type_name()
            );
            None
        }
        SignalMessage::Candidate { .. } => {
            IceCandidate::from_message(&message).map(SignalingEvent::RemoteCandidate)
        }
        SignalMessage::Offer { .. } => {
            SessionDescription::from_message(&message).map(SignalingEvent::RemoteDescription)
        }
        SignalMessage::Ready | SignalMessage::Answer { .. } => None,
    }
}
