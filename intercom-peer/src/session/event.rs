use crate::transport::RemoteMedia;
use std::sync::Arc;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Single-consumer event queue feeding one negotiation session.
///
/// Every stimulus (relay frames, transport callbacks, the watchdog timer,
/// local disconnect requests) lands here, so the state machine only ever
/// advances one event at a time.
///
/// Transport-sourced events carry the generation of the transport that
/// produced them; events from a transport that has since been torn down are
/// ignored by the controller.
pub enum ControllerEvent {
    /// Relay connection established.
    LinkOpened,
    /// Raw frame relayed from the other peer.
    LinkMessage(String),
    /// Relay connection closed or failed.
    LinkClosed,
    /// Local ICE candidate discovered by the transport.
    CandidateDiscovered { generation: u64, candidate: String },
    /// Remote media became usable.
    TrackReceived {
        generation: u64,
        media: Arc<dyn RemoteMedia>,
    },
    /// Transport connection-state change.
    TransportState {
        generation: u64,
        state: RTCPeerConnectionState,
    },
    /// No-media watchdog fired for the given session generation.
    MediaWatchdog { generation: u64 },
    /// Explicit local disconnect request.
    Disconnect,
}
