//! Now-playing indicator bridge.
//!
//! Hosts render a persistent, user-visible indicator (a foreground-service
//! notification on mobile, a tray tooltip or media overlay on desktop) while a
//! track is playing. The core fires [`NowPlayingNotifier::show`] when a track
//! starts and [`NowPlayingNotifier::clear`] when the session is torn down.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Heading used by the indicator while a track plays.
pub const DEFAULT_NOW_PLAYING_HEADING: &str = "Playing";

/// Content of the now-playing indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    /// Short text flashed when the indicator first appears.
    pub ticker: String,
    /// Indicator heading.
    pub title: String,
    /// Indicator body, normally the track title.
    pub text: String,
    /// Whether the indicator should persist until explicitly cleared.
    pub ongoing: bool,
}

impl NowPlaying {
    /// Build an ongoing indicator for `track_title` under `heading`.
    pub fn for_track(heading: impl Into<String>, track_title: impl Into<String>) -> Self {
        let track_title = track_title.into();
        Self {
            ticker: track_title.clone(),
            title: heading.into(),
            text: track_title,
            ongoing: true,
        }
    }
}

/// Host hook that renders the now-playing indicator.
#[async_trait]
pub trait NowPlayingNotifier: Send + Sync {
    /// Show (or replace) the indicator.
    async fn show(&self, now_playing: NowPlaying) -> Result<()>;

    /// Remove the indicator.
    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}
