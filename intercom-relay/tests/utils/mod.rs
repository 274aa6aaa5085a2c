
pub use test_client::*;

use axum::{Router, routing::get};
use intercom_relay::{RelayHub, ws_handler};
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Bind the relay on an ephemeral port and serve it in the background.
/// Returns the WebSocket URL plus the hub handle for registry assertions.
pub async fn spawn_relay() -> (String, RelayHub) {
    let hub = RelayHub::new();
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(hub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve relay");
    });

    (format!("ws://{addr}/ws"), hub)
}

/// Poll the registry until it reaches the expected size.
pub async fn wait_for_participants(hub: &RelayHub, expected: usize) {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    while hub.participant_count() != expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "registry never reached {expected} participants (now {})",
            hub.participant_count()
        );
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}
