use async_trait::async_trait;
use camlink_client::MediaTransport;
use camlink_core::{Error, IceCandidate, Result, SessionDescription};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const MOCK_ANSWER_SDP: &str = "v=0\r\no=mock-answer\r\n";

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    CreateOffer,
    CreateAnswer,
    SetRemote(SessionDescription),
    AddCandidate(IceCandidate),
}

/// How the mock engine reacts to negotiation input.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockTransportBehavior {
    pub reject_remote_description: bool,
    pub reject_candidates: bool,
}

/// MediaTransport that records every call instead of touching the network.
#[derive(Debug, Default)]
pub struct MockTransport {
    behavior: MockTransportBehavior,
    calls: Mutex<Vec<TransportCall>>,
    closes: AtomicUsize,
}

impl MockTransport {
    pub fn new(behavior: MockTransportBehavior) -> Self {
        Self {
            behavior,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaTransport for MockTransport {
    async fn create_offer(&self) -> Result<SessionDescription> {
        self.record(TransportCall::CreateOffer);
        Ok(SessionDescription::offer("v=0\r\no=mock-offer\r\n"))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        self.record(TransportCall::CreateAnswer);
        Ok(SessionDescription::answer(MOCK_ANSWER_SDP))
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        self.record(TransportCall::SetRemote(description));
        if self.behavior.reject_remote_description {
            return Err(Error::Negotiation("mock rejects remote descriptions".into()));
        }
        Ok(())
    }

    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.record(TransportCall::AddCandidate(candidate));
        if self.behavior.reject_candidates {
            return Err(Error::Transport("mock rejects candidates".into()));
        }
        Ok(())
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_records_calls() {
        let transport = MockTransport::new(MockTransportBehavior {
            reject_candidates: true,
            ..Default::default()
        });

        transport
            .set_remote_description(SessionDescription::offer("v=0"))
            .await
            .unwrap();
        let answer = transport.create_answer().await.unwrap();
        assert_eq!(answer.sdp, MOCK_ANSWER_SDP);

        let candidate = IceCandidate::new("candidate:1", None, Some(0));
        assert!(transport.add_remote_candidate(candidate.clone()).await.is_err());

        assert_eq!(
            transport.calls(),
            vec![
                TransportCall::SetRemote(SessionDescription::offer("v=0")),
                TransportCall::CreateAnswer,
                TransportCall::AddCandidate(candidate),
            ]
        );
    }
}
