mod hub_service;
mod ws_handler;

pub use hub_service::*;
pub use ws_handler::*;
