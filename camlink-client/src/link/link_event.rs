use crate::link::NegotiationOutcome;
use crate::signaling::SignalingEvent;
use crate::transport::TransportEvent;
use camlink_core::SessionId;
use std::marker::PhantomData;
use tokio::sync::mpsc;

/// Event delivered to the link manager, tagged with the session that produced it.
#[derive(Debug)]
pub struct LinkEvent {
    pub session: SessionId,
    pub kind: LinkEventKind,
}

#[derive(Debug)]
pub enum LinkEventKind {
    Signaling(SignalingEvent),
    Transport(TransportEvent),
    Negotiation(NegotiationOutcome),
}

impl From<SignalingEvent> for LinkEventKind {
    fn from(event: SignalingEvent) -> Self {
        Self::Signaling(event)
    }
}

impl From<TransportEvent> for LinkEventKind {
    fn from(event: TransportEvent) -> Self {
        Self::Transport(event)
    }
}

impl From<NegotiationOutcome> for LinkEventKind {
    fn from(event: NegotiationOutcome) -> Self {
        Self::Negotiation(event)
    }
}

/// Non-owning handle back to the manager.
///
/// Signaling clients and transports only ever hold one of these; the manager
/// owns them, never the other way round.
pub struct EventSink<E> {
    session: SessionId,
    tx: mpsc::UnboundedSender<LinkEvent>,
    _kind: PhantomData<fn(E)>,
}

impl<E> Clone for EventSink<E> {
    fn clone(&self) -> Self {
        Self {
            session: self.session,
            tx: self.tx.clone(),
            _kind: PhantomData,
        }
    }
}

impl<E> EventSink<E>
where
    E: Into<LinkEventKind>,
{
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<LinkEvent>) -> Self {
        Self {
            session,
            tx,
            _kind: PhantomData,
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Returns `false` once the manager is gone.
    pub fn emit(&self, event: E) -> bool {
        self.tx
            .send(LinkEvent {
                session: self.session,
                kind: event.into(),
            })
            .is_ok()
    }
}
