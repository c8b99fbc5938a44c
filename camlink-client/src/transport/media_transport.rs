use async_trait::async_trait;
use camlink_core::{IceCandidate, Result, SessionDescription};

/// Capability contract of the peer-to-peer media engine.
///
/// Events (local candidates, remote tracks, state changes) are reported
/// through the [`EventSink`](crate::EventSink) the transport was built with.
#[async_trait]
pub trait MediaTransport: Send + Sync + 'static {
    /// Creates a local offer and applies it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Creates a local answer and applies it as the local description.
    /// Requires a remote offer to have been applied.
    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()>;

    /// May fail for an individual candidate without affecting the session.
    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Releases the session. Idempotent.
    fn close(&self);
}
