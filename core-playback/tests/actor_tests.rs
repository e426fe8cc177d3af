//! Session actor tests
//!
//! Engine callbacks are pushed through the sink the actor attaches, exactly
//! as a platform engine would deliver them.

mod common;

use bridge_desktop::{LogNotifier, SimulatedMediaEngine};
use bridge_traits::{EngineEvent, MediaStoreResolver};
use common::{abc_catalog, EngineCall, EngineProbe, Harness, RecordingNotifier};
use core_playback::{PlaybackError, PlaybackSession, ResourceState, SessionActor, SessionHandle};
use core_runtime::config::PlaybackSettings;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

struct Running {
    handle: SessionHandle,
    task: JoinHandle<()>,
    shutdown: CancellationToken,
    probe: EngineProbe,
    notifier: Arc<RecordingNotifier>,
    events: Receiver<CoreEvent>,
}

async fn spawn_bound() -> Running {
    let Harness {
        mut session,
        probe,
        notifier,
        events,
    } = Harness::new();
    session.bind_catalog(abc_catalog()).await.unwrap();

    let subscription = events.subscribe();
    let shutdown = CancellationToken::new();
    let (handle, task) = SessionActor::spawn(session, 8, shutdown.clone());

    Running {
        handle,
        task,
        shutdown,
        probe,
        notifier,
        events: subscription,
    }
}

/// Wait for the first playback event matching `predicate`.
async fn wait_for<F>(events: &mut Receiver<CoreEvent>, predicate: F) -> PlaybackEvent
where
    F: Fn(&PlaybackEvent) -> bool,
{
    timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(CoreEvent::Playback(event)) if predicate(&event) => return event,
                Ok(_) => continue,
                Err(err) => panic!("event stream failed: {}", err),
            }
        }
    })
    .await
    .expect("timed out waiting for playback event")
}

async fn start_playing(running: &mut Running, index: usize) {
    running.handle.select_track(index).await.unwrap();
    running.probe.deliver(EngineEvent::Prepared {
        token: running.probe.last_token(),
    });
    wait_for(&mut running.events, |e| {
        matches!(e, PlaybackEvent::Started { .. })
    })
    .await;
}

#[tokio::test]
async fn test_spawn_attaches_engine_sink() {
    let running = spawn_bound().await;
    assert!(running.probe.has_sink());
    assert!(!running.handle.is_closed());
}

#[tokio::test]
async fn test_handle_drives_transitions() {
    let mut running = spawn_bound().await;

    running.handle.select_track(1).await.unwrap();
    let snapshot = running.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ResourceState::Preparing);
    assert_eq!(snapshot.position, 1);

    running.probe.deliver(EngineEvent::Prepared {
        token: running.probe.last_token(),
    });
    let started = wait_for(&mut running.events, |e| {
        matches!(e, PlaybackEvent::Started { .. })
    })
    .await;
    assert!(matches!(
        started,
        PlaybackEvent::Started { track_id: 20, ref title, .. } if title == "Bravo"
    ));

    assert!(running.handle.is_playing().await);
    assert_eq!(running.handle.current_title().await, "Bravo");
    assert_eq!(running.notifier.shown_titles(), vec!["Bravo"]);

    running.handle.pause().await.unwrap();
    assert!(!running.handle.is_playing().await);
    assert_eq!(
        running.handle.snapshot().await.unwrap().state,
        ResourceState::Paused
    );
}

#[tokio::test]
async fn test_handle_reports_command_errors() {
    let running = spawn_bound().await;

    let result = running.handle.select_track(9).await;
    assert!(matches!(
        result,
        Err(PlaybackError::InvalidIndex { index: 9, len: 3 })
    ));

    assert!(running.handle.toggle_shuffle().await.unwrap());
    assert!(!running.handle.toggle_shuffle().await.unwrap());
}

#[tokio::test]
async fn test_completion_advances_through_actor() {
    let mut running = spawn_bound().await;
    start_playing(&mut running, 2).await;
    running.probe.set_position(90_000);

    running.probe.deliver(EngineEvent::Completed {
        token: running.probe.last_token(),
    });

    let preparing = wait_for(&mut running.events, |e| {
        matches!(e, PlaybackEvent::Preparing { .. })
    })
    .await;
    assert!(matches!(preparing, PlaybackEvent::Preparing { position: 0, .. }));
    assert_eq!(running.handle.current_title().await, "Alpha");
}

#[tokio::test]
async fn test_stale_callback_through_actor_is_ignored() {
    let running = spawn_bound().await;

    running.handle.select_track(0).await.unwrap();
    let stale = running.probe.last_token();
    running.handle.select_track(1).await.unwrap();

    running
        .probe
        .deliver(EngineEvent::Prepared { token: stale });

    let snapshot = running.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ResourceState::Preparing);
    assert_eq!(running.probe.count(&EngineCall::Start), 0);
}

#[tokio::test]
async fn test_engine_error_through_actor() {
    let mut running = spawn_bound().await;
    start_playing(&mut running, 0).await;

    running.probe.deliver(EngineEvent::Error {
        token: running.probe.last_token(),
        code: bridge_traits::EngineErrorCode::new(100, 0),
    });
    wait_for(&mut running.events, |e| {
        matches!(e, PlaybackEvent::Error { .. })
    })
    .await;

    let snapshot = running.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ResourceState::Idle);
    assert_eq!(snapshot.position, 0);
    assert!(snapshot.last_fault.is_some());
}

#[tokio::test]
async fn test_shutdown_releases_session() {
    let mut running = spawn_bound().await;
    start_playing(&mut running, 0).await;

    running.shutdown.cancel();
    timeout(Duration::from_secs(5), running.task)
        .await
        .expect("actor did not stop")
        .unwrap();

    assert_eq!(running.probe.count(&EngineCall::Release), 1);
    assert_eq!(running.notifier.clear_count(), 1);
    assert!(running.handle.is_closed());

    assert!(matches!(
        running.handle.next().await,
        Err(PlaybackError::SessionClosed)
    ));
    assert!(matches!(
        running.handle.toggle_shuffle().await,
        Err(PlaybackError::SessionClosed)
    ));
    assert_eq!(running.handle.current_position().await, 0);
    assert_eq!(running.handle.duration().await, 0);
    assert!(!running.handle.is_playing().await);
    assert_eq!(running.handle.current_title().await, "");
}

#[tokio::test]
async fn test_dropping_all_handles_stops_actor() {
    let running = spawn_bound().await;
    let extra = running.handle.clone();

    drop(running.handle);
    drop(extra);

    timeout(Duration::from_secs(5), running.task)
        .await
        .expect("actor did not stop")
        .unwrap();
    assert_eq!(running.probe.count(&EngineCall::Release), 1);
}

#[tokio::test]
async fn test_bind_catalog_through_handle() {
    let probe = EngineProbe::default();
    let session = PlaybackSession::new(
        probe.engine(),
        Arc::new(MediaStoreResolver::default()),
        Arc::new(RecordingNotifier::default()),
        PlaybackSettings::default(),
        EventBus::default(),
    );
    let (handle, _task) = SessionActor::spawn(session, 4, CancellationToken::new());

    assert!(matches!(
        handle.next().await,
        Err(PlaybackError::EmptyCatalog)
    ));

    handle.bind_catalog(abc_catalog()).await.unwrap();
    handle.select_track(2).await.unwrap();

    assert_eq!(handle.current_title().await, "Charlie");
}

#[tokio::test]
async fn test_end_to_end_with_simulated_engine() {
    let engine = SimulatedMediaEngine::new()
        .with_prepare_delay(Duration::from_millis(5))
        .with_track_duration(Duration::from_millis(60))
        .fail_locator("content://media/external/audio/media/30");
    let notifier = Arc::new(LogNotifier::new());
    let events = EventBus::new(128);
    let mut subscription = events.subscribe();

    let mut session = PlaybackSession::new(
        Box::new(engine),
        Arc::new(MediaStoreResolver::default()),
        notifier.clone(),
        PlaybackSettings::default(),
        events,
    );
    session.bind_catalog(abc_catalog()).await.unwrap();
    let shutdown = CancellationToken::new();
    let (handle, task) = SessionActor::spawn(session, 8, shutdown.clone());

    handle.select_track(0).await.unwrap();

    // Alpha plays to the end, then Bravo starts on its own.
    wait_for(&mut subscription, |e| {
        matches!(e, PlaybackEvent::Completed { track_id: 10, .. })
    })
    .await;
    wait_for(&mut subscription, |e| {
        matches!(e, PlaybackEvent::Started { track_id: 20, .. })
    })
    .await;
    assert_eq!(
        notifier.current().await.map(|n| n.text),
        Some("Bravo".to_string())
    );

    // Charlie fails to decode; the session stops instead of skipping.
    wait_for(&mut subscription, |e| {
        matches!(e, PlaybackEvent::Error { track_id: Some(30), .. })
    })
    .await;
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ResourceState::Idle);
    assert_eq!(snapshot.position, 2);

    shutdown.cancel();
    task.await.unwrap();
    assert!(notifier.current().await.is_none());
}
