use camlink_core::{IceCandidate, SessionDescription};

/// Everything a signaling client can report to the link manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingEvent {
    /// The channel opened; the server is waiting for `ready`.
    Connected,

    /// The channel closed or could not be opened. Terminal for this client.
    Disconnected,

    /// No liveness acknowledgment within the timeout window. Terminal for this client.
    HealthCheckFailed,

    RemoteDescription(SessionDescription),

    RemoteCandidate(IceCandidate),
}
