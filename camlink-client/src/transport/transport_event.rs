use crate::transport::RemoteTrack;
use camlink_core::{IceCandidate, TransportState};

/// Events the media transport raises for the link manager.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A local ICE candidate was gathered and must be trickled to the server.
    LocalCandidate(IceCandidate),

    /// Remote media arrived; this is what observers render.
    RemoteTrack(RemoteTrack),

    /// ICE connection state moved.
    StateChanged(TransportState),
}
