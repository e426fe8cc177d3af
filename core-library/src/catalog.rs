//! Read-only track catalog
//!
//! The catalog is the ordered list a playback session walks through. It is
//! sorted by title once, at construction, and never reordered afterwards;
//! sessions hold a cheap clone and address tracks by index.

use crate::models::{Track, TrackId};
use std::ops::Index;
use std::sync::Arc;

/// Ordered, immutable sequence of tracks indexed `0..len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCatalog {
    tracks: Arc<[Track]>,
}

impl TrackCatalog {
    /// Build a catalog sorted ascending by title.
    ///
    /// The sort is stable: tracks with equal titles keep their source order.
    pub fn from_tracks(mut tracks: Vec<Track>) -> Self {
        tracks.sort_by(|a, b| a.title().cmp(b.title()));
        Self {
            tracks: tracks.into(),
        }
    }

    pub fn empty() -> Self {
        Self {
            tracks: Arc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    /// Position of the first track with `id`.
    pub fn index_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|track| track.id() == id)
    }
}

impl Default for TrackCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

impl Index<usize> for TrackCatalog {
    type Output = Track;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tracks[index]
    }
}

impl<'a> IntoIterator for &'a TrackCatalog {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Track> for TrackCatalog {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        Self::from_tracks(iter.into_iter().collect())
    }
}
