use crate::model::client::ClientId;
use serde::{Deserialize, Serialize};

/// Wire schema for everything that crosses the relay.
///
/// The relay itself never looks past the `type` tag; the SDP and candidate
/// payloads are opaque strings interpreted only by the peer-connection
/// transports on each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalMessage {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    IceCandidate {
        candidate: String,
    },
    /// Server greeting carrying the assigned participant id.
    Connection {
        #[serde(rename = "clientId")]
        client_id: ClientId,
        message: String,
    },
    /// Any `type` value nobody recognizes. Receivers log it and move on.
    #[serde(other)]
    Unknown,
}

impl SignalMessage {
    /// Tag name for logging, without touching the payload.
    pub fn kind(&self) -> &'static str {
        match self {
            SignalMessage::Offer { .. } => "offer",
            SignalMessage::Answer { .. } => "answer",
            SignalMessage::IceCandidate { .. } => "ice-candidate",
            SignalMessage::Connection { .. } => "connection",
            SignalMessage::Unknown => "unknown",
        }
    }
}
