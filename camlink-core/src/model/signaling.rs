use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

/// JSON envelope exchanged over the signaling channel.
///
/// `ready` and `answer` flow client to server, `offer` flows server to
/// client, `candidate` flows both ways. Any other `type` decodes to
/// [`SignalMessage::Unknown`] and is ignored by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalMessage {
    Ready,
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    Candidate {
        candidate: String,
        #[serde(rename = "sdpMid")]
        sdp_mid: Option<String>,
        #[serde(rename = "sdpMLineIndex")]
        sdp_m_line_index: Option<u16>,
    },
    #[serde(other, skip_serializing)]
    Unknown,
}

impl SignalMessage {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_client_originated(&self) -> bool {
        matches!(self, Self::Ready | Self::Answer { .. } | Self::Candidate { .. })
    }

    pub fn is_server_originated(&self) -> bool {
        matches!(self, Self::Offer { .. } | Self::Candidate { .. })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::Candidate { .. } => "candidate",
            Self::Unknown => "unknown",
        }
    }
}
