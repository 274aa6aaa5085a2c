use std::fmt;
use tracing::info;

/// Connection indicator shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkStatus::Connecting => "connecting",
            LinkStatus::Connected => "connected",
            LinkStatus::Disconnected => "disconnected",
        };
        write!(f, "{s}")
    }
}

/// Log and status seam. The rendering side (log pane, status badge) is out
/// of scope; the controller appends lines and flips the indicator.
pub trait StatusLog: Send + Sync {
    fn append(&self, message: &str);

    fn set_status(&self, status: LinkStatus);
}

/// StatusLog that forwards everything to `tracing`, which supplies the
/// timestamps.
pub struct TracingStatusLog;

impl StatusLog for TracingStatusLog {
    fn append(&self, message: &str) {
        info!("{}", message);
    }

    fn set_status(&self, status: LinkStatus) {
        info!("Connection status: {}", status);
    }
}
