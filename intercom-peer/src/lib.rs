pub mod link;
pub mod output;
pub mod session;
pub mod transport;

pub use link::{RelayLink, WsRelayLink};
pub use output::{AudioSink, LinkStatus, NullAudioSink, StatusLog, TracingStatusLog};
pub use session::{ControllerEvent, NegotiationController, SessionState};
pub use transport::{
    PeerTransport, PeerTransportFactory, RemoteMedia, RtcRemoteMedia, RtcTransport,
    RtcTransportFactory, TransportConfig, TransportError,
};
