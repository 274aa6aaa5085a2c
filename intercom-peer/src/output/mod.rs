mod audio_sink;
mod status_log;

pub use audio_sink::*;
pub use status_log::*;
