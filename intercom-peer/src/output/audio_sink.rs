use crate::transport::RemoteMedia;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Playback seam. The audio device and its UI live outside this crate; the
/// controller only hands over the remote media and forwards volume controls.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Accept the remote media reference and start playback.
    async fn play(&self, media: Arc<dyn RemoteMedia>);

    /// Volume in `0.0..=1.0`.
    fn set_volume(&self, volume: f32);

    fn set_muted(&self, muted: bool);
}

/// Sink for headless runs: acknowledges the track in the log and discards
/// the audio.
pub struct NullAudioSink;

#[async_trait]
impl AudioSink for NullAudioSink {
    async fn play(&self, media: Arc<dyn RemoteMedia>) {
        info!(
            "Remote {} track {} ready (headless, not played)",
            media.kind(),
            media.id()
        );
    }

    fn set_volume(&self, volume: f32) {
        info!("Volume set to {:.0}%", volume * 100.0);
    }

    fn set_muted(&self, muted: bool) {
        info!("{}", if muted { "Muted" } else { "Unmuted" });
    }
}
