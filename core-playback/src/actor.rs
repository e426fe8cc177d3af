//! # Session Actor
//!
//! Runs a [`PlaybackSession`] on a single tokio task and exposes it through a
//! cloneable [`SessionHandle`].
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐  SessionCommand (mpsc)   ┌──────────────┐
//! │ SessionHandle ├─────────────────────────>│              │
//! └───────────────┘  <── oneshot replies ────│ SessionActor │──owns──> PlaybackSession ──> MediaEngine
//! ┌───────────────┐  EngineEvent (unbounded) │  (1 task)    │                                   │
//! │ ChannelSink   ├─────────────────────────>│              │                                   │
//! └───────┬───────┘                          └──────────────┘                                   │
//!         └───────────────────────────── callbacks ────────────────────────────────────────────┘
//! ```
//!
//! Commands and engine callbacks are both messages, so every state
//! transition happens on the actor task. The loop ends when the
//! cancellation token fires or the last handle is dropped; either way the
//! session is released before the task exits.

use crate::error::{PlaybackError, Result};
use crate::session::PlaybackSession;
use crate::state::SessionSnapshot;
use bridge_traits::{EngineEvent, EngineEventSink};
use core_library::TrackCatalog;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

// =============================================================================
// Messages
// =============================================================================

/// Requests carried from a [`SessionHandle`] to the actor.
#[derive(Debug)]
pub enum SessionCommand {
    BindCatalog {
        catalog: TrackCatalog,
        reply: oneshot::Sender<Result<()>>,
    },
    SelectTrack {
        index: usize,
        reply: oneshot::Sender<Result<()>>,
    },
    Next {
        reply: oneshot::Sender<Result<()>>,
    },
    Previous {
        reply: oneshot::Sender<Result<()>>,
    },
    Pause {
        reply: oneshot::Sender<Result<()>>,
    },
    Resume {
        reply: oneshot::Sender<Result<()>>,
    },
    Seek {
        position_ms: u64,
        reply: oneshot::Sender<Result<()>>,
    },
    ToggleShuffle {
        reply: oneshot::Sender<Result<bool>>,
    },
    CurrentPosition {
        reply: oneshot::Sender<u64>,
    },
    Duration {
        reply: oneshot::Sender<u64>,
    },
    IsPlaying {
        reply: oneshot::Sender<bool>,
    },
    CurrentTitle {
        reply: oneshot::Sender<String>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Engine sink that forwards callbacks into the actor's queue.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EngineEventSink for ChannelEventSink {
    fn deliver(&self, event: EngineEvent) {
        if self.tx.send(event).is_err() {
            debug!(?event, "Session stopped; dropping engine callback");
        }
    }
}

// =============================================================================
// Actor
// =============================================================================

/// Single consumer of session commands and engine callbacks.
pub struct SessionActor {
    session: PlaybackSession,
    commands: mpsc::Receiver<SessionCommand>,
    engine_events: mpsc::UnboundedReceiver<EngineEvent>,
    shutdown: CancellationToken,
}

impl SessionActor {
    /// Wire the session's engine to the actor and start the control task.
    ///
    /// `command_buffer` must be non-zero.
    pub fn spawn(
        mut session: PlaybackSession,
        command_buffer: usize,
        shutdown: CancellationToken,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(command_buffer);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        session.attach_engine_sink(Arc::new(ChannelEventSink::new(event_tx)));

        let span = tracing::info_span!("session_actor", session_id = %session.id());
        let actor = SessionActor {
            session,
            commands: command_rx,
            engine_events: event_rx,
            shutdown,
        };

        let task = tokio::spawn(actor.run().instrument(span));
        (SessionHandle { tx: command_tx }, task)
    }

    async fn run(mut self) {
        info!("Session actor started");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    debug!("Shutdown requested");
                    break;
                }
                Some(event) = self.engine_events.recv() => {
                    if let Err(err) = self.session.handle_engine_event(event).await {
                        warn!(error = %err, ?event, "Engine callback handling failed");
                    }
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.dispatch(command).await,
                    None => {
                        debug!("All session handles dropped");
                        break;
                    }
                },
            }
        }

        if let Err(err) = self.session.release().await {
            warn!(error = %err, "Session release reported an error");
        }
        info!("Session actor stopped");
    }

    async fn dispatch(&mut self, command: SessionCommand) {
        // A dropped reply receiver means the caller stopped waiting.
        match command {
            SessionCommand::BindCatalog { catalog, reply } => {
                let _ = reply.send(self.session.bind_catalog(catalog).await);
            }
            SessionCommand::SelectTrack { index, reply } => {
                let _ = reply.send(self.session.select_track(index).await);
            }
            SessionCommand::Next { reply } => {
                let _ = reply.send(self.session.next().await);
            }
            SessionCommand::Previous { reply } => {
                let _ = reply.send(self.session.previous().await);
            }
            SessionCommand::Pause { reply } => {
                let _ = reply.send(self.session.pause().await);
            }
            SessionCommand::Resume { reply } => {
                let _ = reply.send(self.session.resume().await);
            }
            SessionCommand::Seek { position_ms, reply } => {
                let _ = reply.send(self.session.seek(position_ms).await);
            }
            SessionCommand::ToggleShuffle { reply } => {
                let _ = reply.send(self.session.toggle_shuffle());
            }
            SessionCommand::CurrentPosition { reply } => {
                let _ = reply.send(self.session.current_position().await);
            }
            SessionCommand::Duration { reply } => {
                let _ = reply.send(self.session.duration().await);
            }
            SessionCommand::IsPlaying { reply } => {
                let _ = reply.send(self.session.is_playing().await);
            }
            SessionCommand::CurrentTitle { reply } => {
                let _ = reply.send(self.session.current_title().to_string());
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable command surface of a running session.
///
/// Commands on a stopped session return [`PlaybackError::SessionClosed`];
/// queries fall back to zero, `false` or an empty title.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| PlaybackError::SessionClosed)?;
        response.await.map_err(|_| PlaybackError::SessionClosed)
    }

    pub async fn bind_catalog(&self, catalog: TrackCatalog) -> Result<()> {
        self.request(|reply| SessionCommand::BindCatalog { catalog, reply })
            .await?
    }

    pub async fn select_track(&self, index: usize) -> Result<()> {
        self.request(|reply| SessionCommand::SelectTrack { index, reply })
            .await?
    }

    pub async fn next(&self) -> Result<()> {
        self.request(|reply| SessionCommand::Next { reply }).await?
    }

    pub async fn previous(&self) -> Result<()> {
        self.request(|reply| SessionCommand::Previous { reply })
            .await?
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| SessionCommand::Pause { reply }).await?
    }

    pub async fn resume(&self) -> Result<()> {
        self.request(|reply| SessionCommand::Resume { reply }).await?
    }

    pub async fn seek(&self, position_ms: u64) -> Result<()> {
        self.request(|reply| SessionCommand::Seek { position_ms, reply })
            .await?
    }

    /// Returns the new shuffle flag.
    pub async fn toggle_shuffle(&self) -> Result<bool> {
        self.request(|reply| SessionCommand::ToggleShuffle { reply })
            .await?
    }

    pub async fn current_position(&self) -> u64 {
        self.request(|reply| SessionCommand::CurrentPosition { reply })
            .await
            .unwrap_or(0)
    }

    pub async fn duration(&self) -> u64 {
        self.request(|reply| SessionCommand::Duration { reply })
            .await
            .unwrap_or(0)
    }

    pub async fn is_playing(&self) -> bool {
        self.request(|reply| SessionCommand::IsPlaying { reply })
            .await
            .unwrap_or(false)
    }

    pub async fn current_title(&self) -> String {
        self.request(|reply| SessionCommand::CurrentTitle { reply })
            .await
            .unwrap_or_default()
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| SessionCommand::Snapshot { reply })
            .await
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
