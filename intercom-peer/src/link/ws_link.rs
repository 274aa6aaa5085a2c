use crate::link::RelayLink;
use crate::session::ControllerEvent;
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use intercom_core::SignalMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info};

/// Relay link over a tokio-tungstenite WebSocket.
///
/// A writer task drains the outbound channel into the socket; a reader task
/// feeds inbound frames into the controller's event queue. `LinkOpened` is
/// emitted once the connection is up and `LinkClosed` when the socket dies,
/// whoever closed it.
pub struct WsRelayLink {
    outbound: mpsc::UnboundedSender<Message>,
    open: Arc<AtomicBool>,
}

impl WsRelayLink {
    pub async fn connect(url: &str, events: mpsc::Sender<ControllerEvent>) -> Result<Arc<Self>> {
        let (ws, _) = connect_async(url)
            .await
            .with_context(|| format!("failed to connect to relay at {url}"))?;

        info!("Connected to signaling relay at {}", url);

        let (mut sink, mut stream) = ws.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
        let open = Arc::new(AtomicBool::new(true));

        let writer_open = open.clone();
        tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if sink.send(msg).await.is_err() || closing {
                    break;
                }
            }
            writer_open.store(false, Ordering::Relaxed);
        });

        let reader_open = open.clone();
        let reader_events = events.clone();
        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        let _ = reader_events
                            .send(ControllerEvent::LinkMessage(text.to_string()))
                            .await;
                    }
                    Ok(Message::Close(_)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            reader_open.store(false, Ordering::Relaxed);
            let _ = reader_events.send(ControllerEvent::LinkClosed).await;
        });

        let _ = events.send(ControllerEvent::LinkOpened).await;

        Ok(Arc::new(Self { outbound, open }))
    }
}

impl RelayLink for WsRelayLink {
    fn send(&self, msg: &SignalMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                debug!("Sending signaling message: {}", msg.kind());
                if self.outbound.send(Message::Text(json.into())).is_err() {
                    error!("Relay writer task is gone; {} dropped", msg.kind());
                }
            }
            Err(e) => error!("Failed to serialize signaling message: {}", e),
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::Relaxed) {
            let _ = self.outbound.send(Message::Close(None));
        }
    }
}
