mod client;
mod signaling;

pub use client::ClientId;
pub use signaling::SignalMessage;
