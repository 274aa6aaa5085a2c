use axum::extract::ws::Message;
use dashmap::DashMap;
use intercom_core::{ClientId, SignalMessage};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

struct HubInner {
    participants: DashMap<ClientId, mpsc::UnboundedSender<Message>>,
    next_id: AtomicU64,
}

/// Owned participant registry shared by all connection handlers.
///
/// Every inbound message fans out to all other participants; there is no
/// destination addressing. That keeps the hub O(participants) per message,
/// which is the intended shape for a two-party (or small-group) negotiation
/// relay rather than a general pub/sub router.
#[derive(Clone)]
pub struct RelayHub {
    inner: Arc<HubInner>,
}

impl RelayHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                participants: DashMap::new(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Allocate the next sequential id, register the participant, and greet
    /// it with a `connection` message carrying the assigned id.
    pub fn register(&self, tx: mpsc::UnboundedSender<Message>) -> ClientId {
        let id = ClientId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);

        let greeting = SignalMessage::Connection {
            client_id: id,
            message: "connected to signaling relay".to_owned(),
        };
        match serde_json::to_string(&greeting) {
            Ok(json) => {
                let _ = tx.send(Message::Text(json.into()));
            }
            Err(e) => error!("Failed to serialize greeting for client {}: {}", id, e),
        }

        self.inner.participants.insert(id, tx);
        info!(
            "Client {} connected ({} participants)",
            id,
            self.participant_count()
        );

        id
    }

    /// Remove a participant. Safe to call for an id that is already gone.
    pub fn unregister(&self, id: ClientId) {
        if self.inner.participants.remove(&id).is_some() {
            info!(
                "Client {} disconnected ({} participants)",
                id,
                self.participant_count()
            );
        }
    }

    pub fn participant_count(&self) -> usize {
        self.inner.participants.len()
    }

    /// Validate an inbound frame and fan it out to every other participant.
    ///
    /// The raw text is forwarded unchanged; parsing only rejects garbage. A
    /// malformed frame is dropped without any feedback to the sender, and a
    /// failed send to one recipient does not affect delivery to the rest.
    pub fn relay_from(&self, sender: ClientId, text: &str) {
        let msg: SignalMessage = match serde_json::from_str(text) {
            Ok(m) => m,
            Err(e) => {
                warn!("Discarding malformed message from client {}: {}", sender, e);
                return;
            }
        };

        debug!("Client {} sent: {}", sender, msg.kind());

        for entry in self.inner.participants.iter() {
            if *entry.key() == sender {
                continue;
            }
            if entry.value().send(Message::Text(text.into())).is_err() {
                warn!("Failed to forward {} to client {}", msg.kind(), entry.key());
            }
        }
    }

    /// Ordered shutdown: push a Close frame to everyone, then drop the
    /// registry.
    pub fn close_all(&self) {
        for entry in self.inner.participants.iter() {
            let _ = entry.value().send(Message::Close(None));
        }
        self.inner.participants.clear();
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new()
    }
}
