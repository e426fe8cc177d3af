//! Domain models for the track catalog

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used when the source has no artist for a track.
pub const UNKNOWN_ARTIST: &str = "<unknown>";

/// Placeholder used when the source has no title for a track.
pub const UNTITLED: &str = "<untitled>";

// =============================================================================
// ID Types
// =============================================================================

/// Stable identifier assigned to a track by the catalog source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub i64);

impl TrackId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TrackId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Track
// =============================================================================

/// Immutable track record
///
/// Created once when the catalog is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    id: TrackId,
    title: String,
    artist: String,
}

impl Track {
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)
    }
}

/// Raw row handed over by a [`CatalogSource`](crate::source::CatalogSource)
///
/// Media stores may omit the title or artist column for some files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: i64,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl TrackRecord {
    pub fn new(id: i64, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            artist: Some(artist.into()),
        }
    }
}

impl From<TrackRecord> for Track {
    fn from(record: TrackRecord) -> Self {
        let title = record
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());
        let artist = record
            .artist
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        Track::new(record.id, title, artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_accessors() {
        let track = Track::new(7, "So What", "Miles Davis");
        assert_eq!(track.id(), TrackId(7));
        assert_eq!(track.title(), "So What");
        assert_eq!(track.artist(), "Miles Davis");
        assert_eq!(track.to_string(), "So What - Miles Davis");
    }

    #[test]
    fn test_record_conversion_fills_missing_columns() {
        let record = TrackRecord {
            id: 3,
            title: None,
            artist: Some("   ".to_string()),
        };

        let track = Track::from(record);
        assert_eq!(track.title(), UNTITLED);
        assert_eq!(track.artist(), UNKNOWN_ARTIST);
        assert_eq!(track.id().value(), 3);
    }

    #[test]
    fn test_track_id_serializes_as_number() {
        let json = serde_json::to_string(&TrackId(42)).unwrap();
        assert_eq!(json, "42");
    }
}
