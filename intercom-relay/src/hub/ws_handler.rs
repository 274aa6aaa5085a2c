use crate::hub::RelayHub;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::info;

pub async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<RelayHub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// One task pair per participant: the send task drains the hub-facing
/// channel into the socket, the receive task feeds inbound frames to the
/// hub. Inbound frames are handled sequentially, so a sender's messages
/// reach every recipient in the order they arrived.
async fn handle_socket(socket: WebSocket, hub: RelayHub) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let id = hub.register(tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let hub = hub.clone();
        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => hub.relay_from(id, text.as_str()),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    // A transport error ends recv_task the same way a clean close does;
    // either way the participant is unregistered exactly once here.
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    hub.unregister(id);
    info!("WebSocket closed for client {}", id);
}
