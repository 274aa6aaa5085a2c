use anyhow::Result;
use clap::Parser;
use intercom_peer::{
    ControllerEvent, LinkStatus, NegotiationController, NullAudioSink, RtcTransportFactory,
    SessionState, StatusLog, TracingStatusLog, TransportConfig, WsRelayLink,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "headless-peer",
    about = "Receive-only intercom peer without an audio device"
)]
struct Args {
    /// WebSocket URL of the signaling relay.
    #[arg(long, default_value = "ws://127.0.0.1:8081/ws")]
    url: String,

    /// STUN server override; repeatable.
    #[arg(long = "stun")]
    stun: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intercom_peer=debug,headless_peer=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = TransportConfig::default();
    if !args.stun.is_empty() {
        config.ice_servers = args.stun;
    }

    let status = Arc::new(TracingStatusLog);
    status.set_status(LinkStatus::Connecting);

    let (event_tx, event_rx) = NegotiationController::channel();
    let link = WsRelayLink::connect(&args.url, event_tx.clone()).await?;

    let (controller, mut state_rx) = NegotiationController::new(
        event_tx.clone(),
        event_rx,
        Arc::new(RtcTransportFactory),
        link,
        Arc::new(NullAudioSink),
        status,
        config,
    );

    tokio::spawn(controller.run());

    tokio::signal::ctrl_c().await?;
    info!("Interrupted, disconnecting");

    let _ = event_tx.send(ControllerEvent::Disconnect).await;
    let _ = state_rx.wait_for(|s| *s == SessionState::Closed).await;

    Ok(())
}
