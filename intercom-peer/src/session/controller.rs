use crate::link::RelayLink;
use crate::output::{AudioSink, LinkStatus, StatusLog};
use crate::session::{ControllerEvent, NegotiationSession, SessionState};
use crate::transport::{PeerTransport, PeerTransportFactory, RemoteMedia, TransportConfig};
use intercom_core::SignalMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// How long to wait for remote media before logging an advisory.
const NO_MEDIA_TIMEOUT: Duration = Duration::from_secs(8);

const EVENT_QUEUE_DEPTH: usize = 64;

/// Drives one [`NegotiationSession`] through the offer/answer/candidate
/// exchange.
///
/// All stimuli funnel through a single event queue and are handled one at a
/// time, so a transport callback can never interleave with inbound message
/// handling. Failures while negotiating are logged at the operation that
/// failed and leave the session in its current state; only closing the relay
/// link (or an explicit disconnect) ends the session.
pub struct NegotiationController {
    session: NegotiationSession,
    transport: Option<Arc<dyn PeerTransport>>,
    factory: Arc<dyn PeerTransportFactory>,
    link: Arc<dyn RelayLink>,
    audio: Arc<dyn AudioSink>,
    status: Arc<dyn StatusLog>,
    config: TransportConfig,
    event_tx: mpsc::Sender<ControllerEvent>,
    event_rx: mpsc::Receiver<ControllerEvent>,
    state_tx: watch::Sender<SessionState>,
    generation: u64,
}

impl NegotiationController {
    /// Event queue for one controller. Create this first so the relay link
    /// and transport callbacks have somewhere to send.
    pub fn channel() -> (mpsc::Sender<ControllerEvent>, mpsc::Receiver<ControllerEvent>) {
        mpsc::channel(EVENT_QUEUE_DEPTH)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_tx: mpsc::Sender<ControllerEvent>,
        event_rx: mpsc::Receiver<ControllerEvent>,
        factory: Arc<dyn PeerTransportFactory>,
        link: Arc<dyn RelayLink>,
        audio: Arc<dyn AudioSink>,
        status: Arc<dyn StatusLog>,
        config: TransportConfig,
    ) -> (Self, watch::Receiver<SessionState>) {
        let (state_tx, state_rx) = watch::channel(SessionState::Idle);

        let controller = Self {
            session: NegotiationSession::new(),
            transport: None,
            factory,
            link,
            audio,
            status,
            config,
            event_tx,
            event_rx,
            state_tx,
            generation: 0,
        };

        (controller, state_rx)
    }

    /// Consume events until the session closes or every sender is gone.
    pub async fn run(mut self) {
        info!("Negotiation controller started");

        while let Some(event) = self.event_rx.recv().await {
            self.handle_event(event).await;

            if self.session.is_closed() {
                break;
            }
        }

        info!("Negotiation controller finished");
    }

    async fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::LinkOpened => self.handle_link_opened().await,
            ControllerEvent::LinkMessage(text) => self.handle_link_message(text).await,
            ControllerEvent::CandidateDiscovered {
                generation,
                candidate,
            } => {
                if self.is_current(generation) {
                    self.send_signal(SignalMessage::IceCandidate { candidate });
                }
            }
            ControllerEvent::TrackReceived { generation, media } => {
                if self.is_current(generation) {
                    self.handle_track(media).await;
                }
            }
            ControllerEvent::TransportState { generation, state } => {
                if self.is_current(generation) {
                    self.handle_transport_state(state).await;
                }
            }
            ControllerEvent::MediaWatchdog { generation } => self.handle_watchdog(generation),
            ControllerEvent::LinkClosed => {
                self.status.append("relay connection closed");
                self.status.set_status(LinkStatus::Disconnected);
                self.close_session().await;
            }
            ControllerEvent::Disconnect => {
                self.status.append("disconnect requested");
                self.status.set_status(LinkStatus::Disconnected);
                self.link.close();
                self.close_session().await;
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        if generation != self.generation {
            debug!("Ignoring event from torn-down transport");
            return false;
        }
        true
    }

    async fn handle_link_opened(&mut self) {
        self.status.set_status(LinkStatus::Connected);
        self.status.append("connected to signaling relay");
        self.begin_session().await;
    }

    /// Tear down whatever transport exists and start a fresh idle session
    /// awaiting the next offer.
    async fn begin_session(&mut self) {
        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("Failed to close previous transport: {}", e);
            }
        }

        self.session = NegotiationSession::new();
        self.set_state(SessionState::Idle);
        self.generation += 1;

        match self
            .factory
            .create(&self.config, self.generation, self.event_tx.clone())
            .await
        {
            Ok(transport) => {
                self.transport = Some(transport);
                self.arm_watchdog();
            }
            Err(e) => {
                warn!("Failed to create peer transport: {}", e);
                self.status.append("failed to prepare peer connection");
            }
        }
    }

    fn arm_watchdog(&self) {
        let tx = self.event_tx.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            tokio::time::sleep(NO_MEDIA_TIMEOUT).await;
            let _ = tx.send(ControllerEvent::MediaWatchdog { generation }).await;
        });
    }

    async fn handle_link_message(&mut self, text: String) {
        let msg: SignalMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to parse signaling message: {}", e);
                return;
            }
        };

        debug!("Signaling message received: {}", msg.kind());

        match msg {
            SignalMessage::Connection { client_id, message } => {
                self.status
                    .append(&format!("relay assigned client id {client_id}"));
                debug!("Relay greeting: {}", message);
            }
            SignalMessage::Offer { sdp } => self.handle_offer(sdp).await,
            SignalMessage::Answer { sdp } => self.handle_answer(sdp).await,
            SignalMessage::IceCandidate { candidate } => self.handle_candidate(candidate).await,
            SignalMessage::Unknown => warn!("Unknown signaling message type"),
        }
    }

    /// Inbound offer: set the remote description, produce and send an
    /// answer, then flush any candidates that were waiting for the
    /// description.
    async fn handle_offer(&mut self, sdp: String) {
        self.status.append("offer received, preparing answer");

        if self.transport.is_none() {
            self.begin_session().await;
        }

        let Some(transport) = self.transport.clone() else {
            warn!("No peer transport available to handle the offer");
            return;
        };

        if let Err(e) = transport.set_remote_offer(sdp).await {
            warn!("Failed to set remote offer: {}", e);
            return;
        }
        self.session.mark_remote_description();
        self.set_state(SessionState::OfferReceived);

        let answer_sdp = match transport.create_answer().await {
            Ok(sdp) => sdp,
            Err(e) => {
                warn!("Failed to create answer: {}", e);
                return;
            }
        };

        self.send_signal(SignalMessage::Answer { sdp: answer_sdp });
        self.status.append("answer sent");

        self.flush_pending_candidates(&transport).await;
        self.set_state(SessionState::AnswerSent);
    }

    /// Symmetry path: with fixed roles this side answers rather than offers,
    /// so an inbound answer is accepted but not normally exercised.
    async fn handle_answer(&mut self, sdp: String) {
        let Some(transport) = self.transport.clone() else {
            warn!("Answer received without a peer transport; ignoring");
            return;
        };

        if let Err(e) = transport.set_remote_answer(sdp).await {
            warn!("Failed to set remote answer: {}", e);
            return;
        }
        self.session.mark_remote_description();
        self.status.append("remote answer applied");

        self.flush_pending_candidates(&transport).await;
        self.set_state(SessionState::AnswerSent);
    }

    async fn handle_candidate(&mut self, candidate: String) {
        if self.session.remote_description_set() {
            if let Some(transport) = self.transport.clone() {
                if let Err(e) = transport.add_ice_candidate(candidate).await {
                    warn!("Failed to add remote candidate: {}", e);
                }
                return;
            }
        }

        debug!("Queueing candidate until the remote description is set");
        self.session.queue_candidate(candidate);
    }

    /// Apply queued candidates in their original arrival order. Individual
    /// rejections are logged and do not stop the rest of the queue.
    async fn flush_pending_candidates(&mut self, transport: &Arc<dyn PeerTransport>) {
        let pending = self.session.take_pending();
        if pending.is_empty() {
            return;
        }

        info!("Flushing {} queued candidate(s)", pending.len());
        for candidate in pending {
            if let Err(e) = transport.add_ice_candidate(candidate).await {
                warn!("Failed to add queued candidate: {}", e);
            }
        }
    }

    async fn handle_track(&mut self, media: Arc<dyn RemoteMedia>) {
        self.status.append("remote audio track received");
        self.audio.play(media).await;
        self.set_state(SessionState::Connected);
    }

    async fn handle_transport_state(&mut self, state: RTCPeerConnectionState) {
        debug!("Peer connection state: {}", state);

        match state {
            RTCPeerConnectionState::Failed
            | RTCPeerConnectionState::Disconnected
            | RTCPeerConnectionState::Closed => {
                self.status
                    .append("peer connection lost, awaiting renegotiation");
                self.begin_session().await;
            }
            _ => {}
        }
    }

    /// Advisory only: renegotiation is driven by the peer, not this timer.
    fn handle_watchdog(&self, generation: u64) {
        if generation != self.generation
            || self.session.state == SessionState::Connected
            || self.session.is_closed()
        {
            return;
        }

        warn!("No remote media within {:?}", NO_MEDIA_TIMEOUT);
        self.status
            .append("no remote media yet, check that the sender has started the call");
    }

    /// Close the transport and mark the session closed. Safe from any state,
    /// including when already closed.
    async fn close_session(&mut self) {
        if self.session.is_closed() {
            return;
        }

        if let Some(transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("Failed to close peer transport: {}", e);
            }
        }

        self.set_state(SessionState::Closed);
    }

    fn set_state(&mut self, state: SessionState) {
        self.session.state = state;
        let _ = self.state_tx.send(state);
    }

    /// Emit a message through the relay. Never queues: if the link is down
    /// the message is dropped with a diagnostic and negotiation must be
    /// re-triggered after reconnecting.
    fn send_signal(&self, msg: SignalMessage) {
        if !self.link.is_open() {
            warn!("Relay link is not open; dropping {}", msg.kind());
            self.status
                .append("signaling channel not open, message dropped");
            return;
        }

        self.link.send(&msg);
    }
}
