use anyhow::{Context, Result};
use axum::{Router, routing::get};
use clap::Parser;
use intercom_relay::{RelayHub, ws_handler};
use std::net::{IpAddr, SocketAddr};
use tracing::info;

#[derive(Parser)]
#[command(name = "intercom-relay", about = "Broadcast signaling relay for intercom peers")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, default_value_t = 8081)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intercom_relay=info".into()),
        )
        .init();

    let args = Args::parse();
    let hub = RelayHub::new();

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(hub.clone());

    // Failing to bind is the one startup error that aborts the process.
    let addr = SocketAddr::from((args.host, args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind relay listener on {addr}"))?;

    info!("Signaling relay listening on ws://{addr}/ws");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("relay server error")?;

    hub.close_all();
    info!("Relay stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
