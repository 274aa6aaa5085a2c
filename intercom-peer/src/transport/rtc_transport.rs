use crate::session::ControllerEvent;
use crate::transport::{
    PeerTransport, PeerTransportFactory, RemoteMedia, TransportConfig, TransportError,
};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::track::track_remote::TrackRemote;

/// Remote track handle backed by webrtc-rs. Sinks that want the raw RTP
/// stream can downcast and take the track.
pub struct RtcRemoteMedia {
    track: Arc<TrackRemote>,
}

impl RtcRemoteMedia {
    pub fn track(&self) -> Arc<TrackRemote> {
        self.track.clone()
    }
}

impl RemoteMedia for RtcRemoteMedia {
    fn id(&self) -> String {
        self.track.id()
    }

    fn kind(&self) -> String {
        self.track.kind().to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Receive-only audio peer connection on webrtc-rs.
pub struct RtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    /// Build the peer connection, declare the receive-only audio
    /// transceiver, and wire the callbacks into the controller's event
    /// queue.
    pub async fn new(
        config: &TransportConfig,
        generation: u64,
        events: mpsc::Sender<ControllerEvent>,
    ) -> Result<Self, TransportError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: config.ice_servers.clone(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(|e| TransportError::Setup(e.to_string()))?,
        );

        // Declared up front so on_track fires even when the offer's
        // direction handling is quirky.
        peer_connection
            .add_transceiver_from_kind(
                RTPCodecType::Audio,
                Some(RTCRtpTransceiverInit {
                    direction: RTCRtpTransceiverDirection::Recvonly,
                    send_encodings: vec![],
                }),
            )
            .await
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else { return };
                let _ = tx
                    .send(ControllerEvent::CandidateDiscovered {
                        generation,
                        candidate: init.candidate,
                    })
                    .await;
            })
        }));

        let track_tx = events.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            Box::pin(async move {
                debug!("Remote track received: {}", track.id());
                let media: Arc<dyn RemoteMedia> = Arc::new(RtcRemoteMedia { track });
                let _ = tx
                    .send(ControllerEvent::TrackReceived { generation, media })
                    .await;
            })
        }));

        peer_connection.on_peer_connection_state_change(Box::new(move |state| {
            let tx = events.clone();
            Box::pin(async move {
                let _ = tx
                    .send(ControllerEvent::TransportState { generation, state })
                    .await;
            })
        }));

        Ok(Self { peer_connection })
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn set_remote_offer(&self, sdp: String) -> Result<(), TransportError> {
        let desc = RTCSessionDescription::offer(sdp)
            .map_err(|e| TransportError::RemoteDescription(e.to_string()))?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| TransportError::RemoteDescription(e.to_string()))
    }

    async fn set_remote_answer(&self, sdp: String) -> Result<(), TransportError> {
        let desc = RTCSessionDescription::answer(sdp)
            .map_err(|e| TransportError::RemoteDescription(e.to_string()))?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(|e| TransportError::RemoteDescription(e.to_string()))
    }

    async fn create_answer(&self) -> Result<String, TransportError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(|e| TransportError::CreateAnswer(e.to_string()))?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .map_err(|e| TransportError::CreateAnswer(e.to_string()))?;
        Ok(answer.sdp)
    }

    async fn add_ice_candidate(&self, candidate: String) -> Result<(), TransportError> {
        // The wire carries the bare candidate line; the audio m-line is the
        // only one in a receive-only session.
        let init = RTCIceCandidateInit {
            candidate,
            sdp_mid: Some("0".to_owned()),
            sdp_mline_index: Some(0),
            username_fragment: None,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(|e| TransportError::AddCandidate(e.to_string()))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.peer_connection
            .close()
            .await
            .map_err(|e| TransportError::Close(e.to_string()))
    }
}

pub struct RtcTransportFactory;

#[async_trait]
impl PeerTransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        config: &TransportConfig,
        generation: u64,
        events: mpsc::Sender<ControllerEvent>,
    ) -> Result<Arc<dyn PeerTransport>, TransportError> {
        Ok(Arc::new(RtcTransport::new(config, generation, events).await?))
    }
}
