use camlink_core::{IceCandidate, SessionDescription};

/// Control-channel capability the link manager drives.
///
/// Every method returns immediately; outbound frames are queued and inbound
/// traffic is reported through the [`EventSink`](crate::EventSink) the
/// channel was created with. Send failures are logged, never retried.
pub trait SignalingChannel: Send + 'static {
    /// Opens the channel. Eventually reports `Connected` or `Disconnected`.
    fn connect(&mut self);

    /// Asks the server to start negotiation by pushing an offer.
    fn send_ready(&self);

    fn send_description(&self, description: &SessionDescription);

    fn send_candidate(&self, candidate: &IceCandidate);

    /// Stops the heartbeat and closes the channel. Idempotent; nothing is
    /// reported after this returns.
    fn disconnect(&mut self);

    /// Transport-reported openness combined with heartbeat freshness.
    fn is_connection_alive(&self) -> bool;
}
