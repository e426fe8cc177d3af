//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media engine,
//! locator resolver, now-playing notifier, catalog source) into a running
//! playback session. Desktop apps typically enable the `desktop-shims`
//! feature (which depends on `bridge-desktop`) and can start everything with
//! [`bootstrap_desktop`]; mobile hosts build a [`CoreConfig`] with their own
//! bridges and call [`PlayerService::start`].
//!
//! ```ignore
//! let service = PlayerService::start(config, Box::new(engine), &source).await?;
//! let player = service.handle();
//! player.select_track(0).await?;
//! // ...
//! service.shutdown().await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use bridge_traits::MediaEngine;
use core_library::{load_catalog, CatalogSource, TrackCatalog};
use core_playback::{PlaybackSession, SessionActor, SessionHandle};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, EventStream, LibraryEvent};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Primary façade exposed to host applications.
///
/// Owns the session actor for its whole lifetime. Dropping the service
/// without calling [`shutdown`](Self::shutdown) still stops the actor, but
/// does not wait for the engine to be released.
pub struct PlayerService {
    config: CoreConfig,
    catalog: TrackCatalog,
    event_bus: EventBus,
    handle: SessionHandle,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PlayerService {
    /// Load the catalog, bind it to a new session and start the session actor.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Library`] if the catalog source fails. The
    /// failure is also published as [`LibraryEvent::LoadFailed`].
    pub async fn start(
        config: CoreConfig,
        engine: Box<dyn MediaEngine>,
        source: &dyn CatalogSource,
    ) -> Result<Self> {
        let event_bus = EventBus::new(config.event_buffer);
        Self::start_with_events(config, engine, source, event_bus).await
    }

    /// Like [`start`](Self::start), publishing on a bus the host has already
    /// subscribed to, so start-up events are observable.
    #[instrument(skip_all)]
    pub async fn start_with_events(
        config: CoreConfig,
        engine: Box<dyn MediaEngine>,
        source: &dyn CatalogSource,
        event_bus: EventBus,
    ) -> Result<Self> {
        config.validate()?;

        let catalog = match load_catalog(source).await {
            Ok(catalog) => catalog,
            Err(err) => {
                error!(error = %err, "Catalog could not be loaded");
                let _ = event_bus.emit(CoreEvent::Library(LibraryEvent::LoadFailed {
                    message: err.to_string(),
                }));
                return Err(err.into());
            }
        };
        let _ = event_bus.emit(CoreEvent::Library(LibraryEvent::CatalogLoaded {
            track_count: catalog.len(),
        }));

        let mut session = PlaybackSession::from_config(engine, &config, event_bus.clone());
        session.bind_catalog(catalog.clone()).await?;

        let shutdown = CancellationToken::new();
        let (handle, task) = SessionActor::spawn(session, config.command_buffer, shutdown.clone());
        info!(track_count = catalog.len(), "Player service started");

        Ok(Self {
            config,
            catalog,
            event_bus,
            handle,
            shutdown,
            task: Some(task),
        })
    }

    /// Command handle for the running session.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// The catalog most recently bound through this service.
    ///
    /// A catalog bound directly with [`SessionHandle::bind_catalog`] is not
    /// tracked here; use [`reload_catalog`](Self::reload_catalog) to keep the
    /// two in step.
    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    /// Fetch a fresh catalog from `source` and rebind the session to it.
    ///
    /// Playback from the previous catalog stops and the position returns to
    /// `0`. On failure the current catalog stays bound.
    #[instrument(skip_all)]
    pub async fn reload_catalog(&mut self, source: &dyn CatalogSource) -> Result<()> {
        let catalog = match load_catalog(source).await {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(error = %err, "Catalog reload failed; keeping current catalog");
                let _ = self.event_bus.emit(CoreEvent::Library(LibraryEvent::LoadFailed {
                    message: err.to_string(),
                }));
                return Err(err.into());
            }
        };
        let _ = self.event_bus.emit(CoreEvent::Library(LibraryEvent::CatalogLoaded {
            track_count: catalog.len(),
        }));

        self.handle.bind_catalog(catalog.clone()).await?;
        self.catalog = catalog;
        Ok(())
    }

    /// Subscribe to library and playback events.
    pub fn events(&self) -> EventStream {
        self.event_bus.stream()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Stop the session actor and wait until the engine has been released.
    pub async fn shutdown(mut self) -> Result<()> {
        self.shutdown.cancel();

        if let Some(task) = self.task.take() {
            task.await
                .map_err(|err| CoreError::SessionTask(err.to_string()))?;
        }

        info!("Player service stopped");
        Ok(())
    }
}

impl Drop for PlayerService {
    fn drop(&mut self) {
        if self.task.is_some() {
            warn!("Player service dropped without shutdown; cancelling session");
            self.shutdown.cancel();
        }
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Uses the simulated engine and the log-backed notifier from
/// `bridge-desktop` together with the default configuration.
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(source: &dyn CatalogSource) -> Result<PlayerService> {
    let config = CoreConfig::builder().build()?;
    let engine = bridge_desktop::SimulatedMediaEngine::new();
    PlayerService::start(config, Box::new(engine), source).await
}
