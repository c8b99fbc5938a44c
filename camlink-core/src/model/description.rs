use crate::model::signaling::SignalMessage;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpKind {
    Offer,
    Answer,
}

impl fmt::Display for SdpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offer => f.write_str("offer"),
            Self::Answer => f.write_str("answer"),
        }
    }
}

/// A negotiation payload (offer or answer) in SDP form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    pub kind: SdpKind,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: SdpKind::Answer,
            sdp: sdp.into(),
        }
    }

    pub fn is_offer(&self) -> bool {
        self.kind == SdpKind::Offer
    }

    /// Extracts a description from an inbound envelope, if it carries one.
    pub fn from_message(message: &SignalMessage) -> Option<Self> {
        match message {
            SignalMessage::Offer { sdp } => Some(Self::offer(sdp.clone())),
            SignalMessage::Answer { sdp } => Some(Self::answer(sdp.clone())),
            _ => None,
        }
    }
}

impl From<SessionDescription> for SignalMessage {
    fn from(desc: SessionDescription) -> Self {
        match desc.kind {
            SdpKind::Offer => SignalMessage::Offer { sdp: desc.sdp },
            SdpKind::Answer => SignalMessage::Answer { sdp: desc.sdp },
        }
    }
}

/// One trickled ICE candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(
        candidate: impl Into<String>,
        sdp_mid: Option<String>,
        sdp_m_line_index: Option<u16>,
    ) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid,
            sdp_m_line_index,
        }
    }

    pub fn from_message(message: &SignalMessage) -> Option<Self> {
        match message {
            SignalMessage::Candidate {
                candidate,
                sdp_mid,
                sdp_m_line_index,
            } => Some(Self::new(candidate.clone(), sdp_mid.clone(), *sdp_m_line_index)),
            _ => None,
        }
    }
}

impl From<IceCandidate> for SignalMessage {
    fn from(c: IceCandidate) -> Self {
        SignalMessage::Candidate {
            candidate: c.candidate,
            sdp_mid: c.sdp_mid,
            sdp_m_line_index: c.sdp_m_line_index,
        }
    }
}
