use crate::session::ControllerEvent;
use crate::transport::TransportConfig;
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build peer connection: {0}")]
    Setup(String),
    #[error("failed to apply remote description: {0}")]
    RemoteDescription(String),
    #[error("failed to create answer: {0}")]
    CreateAnswer(String),
    #[error("failed to add ice candidate: {0}")]
    AddCandidate(String),
    #[error("failed to close peer connection: {0}")]
    Close(String),
}

/// Opaque handle to a remote media stream produced by the transport.
///
/// Sinks that need the underlying track can downcast via `as_any`.
pub trait RemoteMedia: Send + Sync {
    fn id(&self) -> String;

    /// Media kind, e.g. "audio".
    fn kind(&self) -> String;

    fn as_any(&self) -> &dyn Any;
}

/// Peer-connection transport seam. One instance per negotiation session;
/// implementations register their candidate/track/state callbacks against
/// the controller's event queue at construction time.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn set_remote_offer(&self, sdp: String) -> Result<(), TransportError>;

    async fn set_remote_answer(&self, sdp: String) -> Result<(), TransportError>;

    /// Create the local answer and install it as the local description.
    async fn create_answer(&self) -> Result<String, TransportError>;

    async fn add_ice_candidate(&self, candidate: String) -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

/// Hands the controller a fresh transport for each renegotiation, wired to
/// its event queue and tagged with the session generation.
#[async_trait]
pub trait PeerTransportFactory: Send + Sync {
    async fn create(
        &self,
        config: &TransportConfig,
        generation: u64,
        events: mpsc::Sender<ControllerEvent>,
    ) -> Result<Arc<dyn PeerTransport>, TransportError>;
}
