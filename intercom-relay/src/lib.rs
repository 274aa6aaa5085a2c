mod hub;

pub use hub::{RelayHub, ws_handler};
