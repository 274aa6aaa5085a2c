use intercom_core::SignalMessage;

/// Seam to the signaling relay.
///
/// Implementations deliver inbound traffic as `ControllerEvent`s on the
/// controller's queue; outbound traffic goes through `send`. Nothing is ever
/// queued for a closed link.
pub trait RelayLink: Send + Sync {
    /// Fire-and-forget send. Implementations log their own failures.
    fn send(&self, msg: &SignalMessage);

    /// Whether the underlying connection is currently open.
    fn is_open(&self) -> bool;

    /// Close the connection. Idempotent.
    fn close(&self);
}
