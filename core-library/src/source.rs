//! Catalog sources
//!
//! A [`CatalogSource`] is the host's view of the device media store. The core
//! asks it for rows exactly once, before the first track is selected, and
//! never refreshes.

use crate::catalog::TrackCatalog;
use crate::error::Result;
use crate::models::{Track, TrackRecord};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Supplies the unordered rows the catalog is built from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_tracks(&self) -> Result<Vec<TrackRecord>>;
}

/// In-memory source, useful for hosts that already hold the rows and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogSource {
    records: Vec<TrackRecord>,
}

impl StaticCatalogSource {
    pub fn new(records: Vec<TrackRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalogSource {
    async fn fetch_tracks(&self) -> Result<Vec<TrackRecord>> {
        Ok(self.records.clone())
    }
}

/// Fetch every row from `source` and build a title-sorted catalog.
#[instrument(skip(source))]
pub async fn load_catalog(source: &dyn CatalogSource) -> Result<TrackCatalog> {
    let records = source.fetch_tracks().await?;
    debug!(rows = records.len(), "Fetched catalog rows");

    let catalog = TrackCatalog::from_tracks(records.into_iter().map(Track::from).collect());
    info!(track_count = catalog.len(), "Catalog loaded");

    Ok(catalog)
}
