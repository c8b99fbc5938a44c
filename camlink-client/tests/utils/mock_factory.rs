use async_trait::async_trait;
use camlink_client::{
    EventSink, MediaTransport, SessionFactory, SignalingChannel, SignalingEvent, TransportEvent,
};
use camlink_core::{Error, Result, SessionId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::mock_signaling::{AutoConnect, MockSignaling, MockSignalingProbe, SentSignal};
use super::mock_transport::{MockTransport, MockTransportBehavior};

/// How every session built by the factory behaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSessionConfig {
    pub auto_connect: AutoConnect,
    pub transport: MockTransportBehavior,
    pub fail_transport_creation: bool,
}

/// One connection attempt made by the manager, handed to the test so it can
/// play both the signaling server and the media engine.
pub struct MockSession {
    pub id: SessionId,
    pub created_at: Instant,
    pub transport: Arc<MockTransport>,
    pub signaling: Arc<MockSignalingProbe>,
    signaling_events: EventSink<SignalingEvent>,
    transport_events: EventSink<TransportEvent>,
    sent_rx: mpsc::UnboundedReceiver<SentSignal>,
}

impl MockSession {
    /// Injects an event as if the signaling server produced it.
    pub fn signal(&self, event: SignalingEvent) {
        self.signaling_events.emit(event);
    }

    /// Injects an event as if the media engine produced it.
    pub fn transport_event(&self, event: TransportEvent) {
        self.transport_events.emit(event);
    }

    /// Next signal the manager pushed out through this session.
    pub async fn next_sent(&mut self) -> Option<SentSignal> {
        self.sent_rx.recv().await
    }
}

struct PendingTransport {
    id: SessionId,
    events: EventSink<TransportEvent>,
    transport: Arc<MockTransport>,
}

/// SessionFactory that builds mock sessions and reports each one to the test.
pub struct MockSessionFactory {
    config: MockSessionConfig,
    pending: Mutex<Option<PendingTransport>>,
    transport_attempts: Arc<AtomicUsize>,
    sessions_tx: mpsc::UnboundedSender<MockSession>,
}

impl MockSessionFactory {
    pub fn new(
        config: MockSessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<MockSession>, Arc<AtomicUsize>) {
        let (sessions_tx, sessions_rx) = mpsc::unbounded_channel();
        let transport_attempts = Arc::new(AtomicUsize::new(0));
        let factory = Self {
            config,
            pending: Mutex::new(None),
            transport_attempts: transport_attempts.clone(),
            sessions_tx,
        };
        (factory, sessions_rx, transport_attempts)
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    fn signaling(&self, events: EventSink<SignalingEvent>) -> Box<dyn SignalingChannel> {
        let id = events.session();
        let (signaling, probe, sent_rx) =
            MockSignaling::new(events.clone(), self.config.auto_connect);

        let pending = self.pending.lock().unwrap().take();
        match pending {
            Some(p) if p.id == id => {
                let _ = self.sessions_tx.send(MockSession {
                    id,
                    created_at: Instant::now(),
                    transport: p.transport,
                    signaling: probe,
                    signaling_events: events,
                    transport_events: p.events,
                    sent_rx,
                });
            }
            _ => panic!("signaling requested for {id} without a matching transport"),
        }

        Box::new(signaling)
    }

    async fn transport(&self, events: EventSink<TransportEvent>) -> Result<Arc<dyn MediaTransport>> {
        self.transport_attempts.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_transport_creation {
            return Err(Error::Transport("mock transport creation failure".into()));
        }

        let transport = Arc::new(MockTransport::new(self.config.transport));
        *self.pending.lock().unwrap() = Some(PendingTransport {
            id: events.session(),
            events,
            transport: transport.clone(),
        });
        Ok(transport)
    }
}
