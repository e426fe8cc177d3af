//! Now-playing indicator written to the tracing log.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::{NowPlaying, NowPlayingNotifier};
use tokio::sync::RwLock;
use tracing::info;

/// Desktop notifier with no system tray integration.
///
/// Logs each indicator change at `INFO` and remembers the indicator that is
/// currently shown.
#[derive(Debug, Default)]
pub struct LogNotifier {
    current: RwLock<Option<NowPlaying>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The indicator currently displayed, if any.
    pub async fn current(&self) -> Option<NowPlaying> {
        self.current.read().await.clone()
    }
}

#[async_trait]
impl NowPlayingNotifier for LogNotifier {
    async fn show(&self, now_playing: NowPlaying) -> Result<()> {
        info!(
            heading = %now_playing.title,
            track = %now_playing.text,
            ongoing = now_playing.ongoing,
            "Now playing"
        );
        *self.current.write().await = Some(now_playing);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.current.write().await.take().is_some() {
            info!("Now-playing indicator cleared");
        }
        Ok(())
    }
}
