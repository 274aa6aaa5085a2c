mod relay_link;
mod ws_link;

pub use relay_link::*;
pub use ws_link::*;
