mod description;
mod session;
mod signaling;
mod state;

pub use description::{IceCandidate, SdpKind, SessionDescription};
pub use session::SessionId;
pub use signaling::{IceServerConfig, SignalMessage};
pub use state::{ConnectionState, FailureReason, TransportState};
