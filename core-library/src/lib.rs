//! # Track Catalog Module
//!
//! Owns the track model and the ordered, read-only catalog a playback session
//! walks through.
//!
//! ## Overview
//!
//! This module provides:
//! - [`Track`] records (id, title, artist)
//! - [`TrackCatalog`], sorted by title at load time and never reordered
//! - [`CatalogSource`], the host's media-store query, plus [`load_catalog`]

pub mod catalog;
pub mod error;
pub mod models;
pub mod source;

pub use catalog::TrackCatalog;
pub use error::{LibraryError, Result};
pub use models::{Track, TrackId, TrackRecord};
pub use source::{load_catalog, CatalogSource, StaticCatalogSource};
