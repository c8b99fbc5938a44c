use crate::link::EventSink;
use crate::transport::MediaTransport;
use camlink_core::{IceCandidate, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of one negotiation step, reported back to the link manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationOutcome {
    /// The remote offer was applied and this answer must go back to the server.
    AnswerReady(SessionDescription),

    /// Applying the remote description or answering it failed. Fatal for the session.
    RemoteDescriptionRejected(String),

    /// A single remote candidate was refused. Not fatal.
    CandidateRejected(String),
}

#[derive(Debug)]
enum NegotiationOp {
    RemoteDescription(SessionDescription),
    RemoteCandidate(IceCandidate),
}

/// Per-session task applying remote negotiation input in arrival order.
///
/// Candidates that arrive before any remote description are held back and
/// applied right after it, since the engine refuses them until then.
pub struct NegotiationWorker {
    ops: mpsc::UnboundedSender<NegotiationOp>,
    task: JoinHandle<()>,
}

impl NegotiationWorker {
    pub fn spawn(transport: Arc<dyn MediaTransport>, events: EventSink<NegotiationOutcome>) -> Self {
        let (ops, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(transport, events, rx));
        Self { ops, task }
    }

    pub fn apply_description(&self, description: SessionDescription) {
        self.submit(NegotiationOp::RemoteDescription(description));
    }

    pub fn add_candidate(&self, candidate: IceCandidate) {
        self.submit(NegotiationOp::RemoteCandidate(candidate));
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    fn submit(&self, op: NegotiationOp) {
        if self.ops.send(op).is_err() {
            warn!("Negotiation worker is gone, dropping remote input");
        }
    }
}

impl Drop for NegotiationWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    transport: Arc<dyn MediaTransport>,
    events: EventSink<NegotiationOutcome>,
    mut ops: mpsc::UnboundedReceiver<NegotiationOp>,
) {
    let mut has_remote = false;
    let mut pending: Vec<IceCandidate> = Vec::new();

    while let Some(op) = ops.recv().await {
        match op {
            NegotiationOp::RemoteDescription(description) => {
                match answer(transport.as_ref(), description).await {
                    Ok(Some(local)) => {
                        has_remote = true;
                        events.emit(NegotiationOutcome::AnswerReady(local));
                    }
                    Ok(None) => has_remote = true,
                    Err(e) => {
                        events.emit(NegotiationOutcome::RemoteDescriptionRejected(e.to_string()));
                        continue;
                    }
                }

                for candidate in pending.drain(..) {
                    add_candidate(transport.as_ref(), &events, candidate).await;
                }
            }
            NegotiationOp::RemoteCandidate(candidate) if !has_remote => {
                debug!("Holding remote candidate until a remote description is applied");
                pending.push(candidate);
            }
            NegotiationOp::RemoteCandidate(candidate) => {
                add_candidate(transport.as_ref(), &events, candidate).await;
            }
        }
    }

    debug!(session = %events.session(), "Negotiation worker finished");
}

/// Applies `description`; an offer is answered, an answer is only applied.
async fn answer(
    transport: &dyn MediaTransport,
    description: SessionDescription,
) -> camlink_core::Result<Option<SessionDescription>> {
    let is_offer = description.is_offer();
    info!(kind = %description.kind, "Applying remote description");
    transport.set_remote_description(description).await?;

    if !is_offer {
        return Ok(None);
    }
    let local = transport.create_answer().await?;
    info!("Local answer created");
    Ok(Some(local))
}

async fn add_candidate(
    transport: &dyn MediaTransport,
    events: &EventSink<NegotiationOutcome>,
    candidate: IceCandidate,
) {
    let Err(e) = transport.add_remote_candidate(candidate).await else {
        return;
    };
    warn!("Failed to add remote ICE candidate: {}", e);
    events.emit(NegotiationOutcome::CandidateRejected(e.to_string()));
}
