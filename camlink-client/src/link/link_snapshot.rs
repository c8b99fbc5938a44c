use crate::transport::RemoteTrack;
use camlink_core::{ConnectionState, FailureReason};

/// Read-only view of the shared link published to observers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkSnapshot {
    pub state: ConnectionState,
    pub track: Option<RemoteTrack>,
    pub error: Option<FailureReason>,
}

impl LinkSnapshot {
    pub fn has_track(&self) -> bool {
        self.track.is_some()
    }

    /// Short user-facing text for the current error, if any.
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.map(FailureReason::message)
    }

    /// Connected with media flowing.
    pub fn is_live(&self) -> bool {
        self.state == ConnectionState::Connected && self.track.is_some()
    }
}
