pub mod model;

pub use model::{ClientId, SignalMessage};
