use crate::link::{
    Backoff, EventSink, LinkCommand, LinkEvent, LinkEventKind, LinkHandle, LinkSnapshot,
    NegotiationOutcome, NegotiationWorker, SessionFactory, WebRtcSessionFactory,
};
use crate::signaling::{SignalingChannel, SignalingEvent};
use crate::transport::{MediaTransport, RemoteTrack, TransportEvent};
use camlink_core::{ConnectionState, FailureReason, LinkConfig, Result, SessionId, TransportState};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, warn};

/// Signaling client, transport and negotiation worker of one connection attempt.
struct ActiveSession {
    id: SessionId,
    signaling: Box<dyn SignalingChannel>,
    transport: Arc<dyn MediaTransport>,
    negotiation: NegotiationWorker,
}

impl ActiveSession {
    fn close(mut self) {
        self.negotiation.stop();
        self.signaling.disconnect();
        self.transport.close();
        info!(session = %self.id, "Session torn down");
    }
}

/// Owner of the shared camera link.
///
/// All state lives on the task running [`LinkManager::run`]. Public operations
/// arrive as [`LinkCommand`]s through a [`LinkHandle`], and signaling,
/// transport and negotiation events arrive tagged with the session that
/// produced them. Events from a session that has since been torn down are
/// dropped, so a stale callback can never move the state machine.
pub struct LinkManager {
    factory: Arc<dyn SessionFactory>,
    backoff: Backoff,
    max_attempts: Option<u32>,

    command_rx: mpsc::UnboundedReceiver<LinkCommand>,
    event_rx: mpsc::UnboundedReceiver<LinkEvent>,
    event_tx: mpsc::UnboundedSender<LinkEvent>,
    published: watch::Sender<LinkSnapshot>,

    state: ConnectionState,
    track: Option<RemoteTrack>,
    error: Option<FailureReason>,
    observers: usize,
    attempts: u32,
    reconnect_at: Option<Instant>,
    session: Option<ActiveSession>,
}

impl LinkManager {
    pub fn new(config: &LinkConfig, factory: Arc<dyn SessionFactory>) -> (Self, LinkHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (published, snapshot_rx) = watch::channel(LinkSnapshot::default());

        let manager = Self {
            factory,
            backoff: Backoff::new(config.max_reconnect_delay),
            max_attempts: config.max_reconnect_attempts,
            command_rx,
            event_rx,
            event_tx,
            published,
            state: ConnectionState::Disconnected,
            track: None,
            error: None,
            observers: 0,
            attempts: 0,
            reconnect_at: None,
            session: None,
        };

        (manager, LinkHandle::new(command_tx, snapshot_rx))
    }

    /// Validates `config` and starts a manager backed by webrtc-rs.
    pub fn spawn(config: &LinkConfig) -> Result<LinkHandle> {
        Self::spawn_with_factory(config, WebRtcSessionFactory::new(config))
    }

    pub fn spawn_with_factory(
        config: &LinkConfig,
        factory: impl SessionFactory,
    ) -> Result<LinkHandle> {
        config.validate()?;
        let (manager, handle) = Self::new(config, Arc::new(factory));
        tokio::spawn(manager.run());
        Ok(handle)
    }

    pub async fn run(mut self) {
        info!("Link manager started");

        loop {
            let deadline = self.reconnect_at;

            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(LinkCommand::Shutdown { done }) => {
                            info!("Shutdown requested");
                            self.disconnect();
                            self.publish();
                            let _ = done.send(());
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All link handles dropped. Shutting down.");
                            self.disconnect();
                            self.publish();
                            break;
                        }
                    }
                }

                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event).await;
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.reconnect_at = None;
                    info!(attempt = self.attempts, "Reconnect timer fired");
                    self.open_session().await;
                }
            }

            self.publish();
        }

        info!("Link manager finished");
    }

    async fn handle_command(&mut self, cmd: LinkCommand) {
        match cmd {
            LinkCommand::StartObserving => self.start_observing().await,
            LinkCommand::StopObserving => self.stop_observing(),
            LinkCommand::Connect => self.connect().await,
            LinkCommand::Disconnect => self.disconnect(),
            LinkCommand::EnterBackground => {
                info!(state = %self.state, "Entered background, keeping the link as is");
            }
            LinkCommand::EnterForeground => self.enter_foreground().await,
            LinkCommand::Shutdown { .. } => {}
        }
    }

    async fn start_observing(&mut self) {
        self.observers += 1;
        debug!(observers = self.observers, state = %self.state, "Observer attached");

        match self.state {
            ConnectionState::Disconnected if self.observers == 1 => self.connect().await,
            ConnectionState::Failed => {
                info!("Link failed earlier, retrying on attach");
                self.connect().await;
            }
            ConnectionState::Connected if self.track.is_none() => {
                warn!("Connected without a media track, forcing reconnect");
                self.reconnect().await;
            }
            _ => {}
        }
    }

    fn stop_observing(&mut self) {
        if self.observers == 0 {
            warn!("stop_observing called with no observers attached");
            return;
        }
        self.observers -= 1;
        debug!(observers = self.observers, "Observer detached, keeping the link warm");
    }

    async fn enter_foreground(&mut self) {
        if self.observers == 0 {
            debug!("Entered foreground with no observers");
            return;
        }

        match self.state {
            ConnectionState::Failed | ConnectionState::Disconnected => {
                info!(state = %self.state, "Entered foreground, reconnecting");
                self.connect().await;
            }
            ConnectionState::Connected if self.track.is_none() => {
                warn!("Entered foreground connected without a media track, forcing reconnect");
                self.reconnect().await;
            }
            ConnectionState::Connected if !self.signaling_alive() => {
                warn!("Entered foreground with a dead signaling channel, forcing reconnect");
                self.reconnect().await;
            }
            _ => debug!(state = %self.state, "Entered foreground, link looks healthy"),
        }
    }

    async fn connect(&mut self) {
        if self.state.is_attempting() {
            warn!(state = %self.state, "connect() ignored, an attempt is already underway");
            return;
        }
        if self.state == ConnectionState::Connected {
            warn!("connect() called while connected, disconnecting first");
            self.disconnect();
        }
        self.open_session().await;
    }

    async fn reconnect(&mut self) {
        self.disconnect();
        self.connect().await;
    }

    async fn open_session(&mut self) {
        self.reconnect_at = None;
        self.teardown_session();

        let id = SessionId::new();
        self.error = None;
        self.set_state(ConnectionState::Connecting);
        info!(session = %id, attempt = self.attempts, "Opening session");

        let transport = match self
            .factory
            .transport(EventSink::new(id, self.event_tx.clone()))
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                error!(session = %id, "Failed to create media transport: {}", e);
                self.fail(FailureReason::ConnectionFailed);
                return;
            }
        };

        let mut signaling = self.factory.signaling(EventSink::new(id, self.event_tx.clone()));
        let negotiation =
            NegotiationWorker::spawn(transport.clone(), EventSink::new(id, self.event_tx.clone()));
        signaling.connect();

        self.session = Some(ActiveSession {
            id,
            signaling,
            transport,
            negotiation,
        });
    }

    fn disconnect(&mut self) {
        self.reconnect_at = None;
        self.teardown_session();
        self.track = None;
        self.error = None;
        self.attempts = 0;
        self.set_state(ConnectionState::Disconnected);
    }

    fn teardown_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
        }
    }

    async fn handle_event(&mut self, event: LinkEvent) {
        if self.session.as_ref().map(|s| s.id) != Some(event.session) {
            debug!(session = %event.session, "Dropping event from a torn down session");
            return;
        }

        match event.kind {
            LinkEventKind::Signaling(e) => self.handle_signaling_event(e),
            LinkEventKind::Transport(e) => self.handle_transport_event(e),
            LinkEventKind::Negotiation(e) => self.handle_negotiation_outcome(e),
        }
    }

    fn handle_signaling_event(&mut self, event: SignalingEvent) {
        let Some(session) = &self.session else {
            return;
        };

        match event {
            SignalingEvent::Connected => {
                info!(session = %session.id, "Signaling connected, sending ready");
                session.signaling.send_ready();
            }

            SignalingEvent::RemoteDescription(description) => {
                session.negotiation.apply_description(description);
            }

            SignalingEvent::RemoteCandidate(candidate) => {
                session.negotiation.add_candidate(candidate);
            }

            SignalingEvent::Disconnected | SignalingEvent::HealthCheckFailed => {
                if matches!(
                    self.state,
                    ConnectionState::Connecting | ConnectionState::Connected
                ) {
                    warn!(session = %session.id, ?event, "Signaling channel lost");
                    self.fail(FailureReason::ConnectionLost);
                }
            }
        }
    }

    fn handle_transport_event(&mut self, event: TransportEvent) {
        let Some(session) = &self.session else {
            return;
        };

        match event {
            TransportEvent::LocalCandidate(candidate) => {
                session.signaling.send_candidate(&candidate);
            }

            TransportEvent::RemoteTrack(track) => {
                info!(session = %session.id, id = track.id(), "Remote video track available");
                self.track = Some(track);
                self.mark_connected();
            }

            TransportEvent::StateChanged(state) => {
                info!(session = %session.id, %state, "Transport state changed");
                match state {
                    TransportState::Connected | TransportState::Completed => self.mark_connected(),
                    TransportState::Failed => self.fail(FailureReason::ConnectionFailed),
                    TransportState::Disconnected => self.fail(FailureReason::ConnectionLost),
                    TransportState::Closed => {
                        self.teardown_session();
                        self.track = None;
                        self.set_state(ConnectionState::Disconnected);
                    }
                    TransportState::New | TransportState::Connecting => {}
                }
            }
        }
    }

    fn handle_negotiation_outcome(&mut self, outcome: NegotiationOutcome) {
        let Some(session) = &self.session else {
            return;
        };

        match outcome {
            NegotiationOutcome::AnswerReady(answer) => {
                info!(session = %session.id, "Sending answer");
                session.signaling.send_description(&answer);
            }
            NegotiationOutcome::RemoteDescriptionRejected(reason) => {
                error!(session = %session.id, "Negotiation failed: {}", reason);
                self.fail(FailureReason::ConnectionFailed);
            }
            NegotiationOutcome::CandidateRejected(reason) => {
                warn!(session = %session.id, "Remote candidate rejected: {}", reason);
            }
        }
    }

    fn mark_connected(&mut self) {
        self.reconnect_at = None;
        self.attempts = 0;
        self.error = None;
        self.set_state(ConnectionState::Connected);
    }

    fn fail(&mut self, reason: FailureReason) {
        self.teardown_session();
        self.track = None;
        self.error = Some(reason);
        self.set_state(ConnectionState::Failed);
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        self.reconnect_at = None;

        if matches!(self.max_attempts, Some(max) if self.attempts >= max) {
            warn!(attempts = self.attempts, "Reconnect attempts exhausted, staying failed");
            return;
        }

        let delay = self.backoff.delay(self.attempts);
        self.attempts = self.attempts.saturating_add(1);
        self.set_state(ConnectionState::Reconnecting);
        self.reconnect_at = Some(Instant::now() + delay);
        info!(attempt = self.attempts, ?delay, "Reconnect scheduled");
    }

    fn signaling_alive(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.signaling.is_connection_alive())
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            info!(from = %self.state, to = %state, "Link state changed");
            self.state = state;
        }
    }

    fn publish(&self) {
        let next = LinkSnapshot {
            state: self.state,
            track: self.track.clone(),
            error: self.error,
        };
        self.published.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}
