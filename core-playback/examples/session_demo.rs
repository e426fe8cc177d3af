//! # Playback Session Example
//!
//! Plays a three-track catalog on the simulated desktop engine: the first
//! track runs to completion, the session advances on its own, then shuffle,
//! seek and pause are exercised through the actor handle.
//!
//! Run with: `cargo run --example session_demo --package core-playback`

use bridge_desktop::{LogNotifier, SimulatedMediaEngine};
use bridge_traits::LogLevel;
use core_library::{load_catalog, StaticCatalogSource, TrackRecord};
use core_playback::{PlaybackSession, SessionActor};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let config = CoreConfig::builder()
        .now_playing_notifier(Arc::new(LogNotifier::new()))
        .build()?;

    let source = StaticCatalogSource::new(vec![
        TrackRecord::new(3, "So What", "Miles Davis"),
        TrackRecord {
            id: 1,
            title: Some("Blue in Green".to_string()),
            artist: None,
        },
        TrackRecord::new(2, "All Blues", "Miles Davis"),
    ]);
    let catalog = load_catalog(&source).await?;

    let events = EventBus::new(config.event_buffer);
    let mut stream = events
        .stream()
        .filter(|event| matches!(event, CoreEvent::Playback(_)));
    tokio::spawn(async move {
        while let Ok(event) = stream.recv().await {
            println!("[event] {}", event.description());
        }
    });

    let engine = SimulatedMediaEngine::new()
        .with_prepare_delay(Duration::from_millis(100))
        .with_track_duration(Duration::from_millis(800));
    let session = PlaybackSession::from_config(Box::new(engine), &config, events.clone());

    let shutdown = CancellationToken::new();
    let (handle, task) = SessionActor::spawn(session, config.command_buffer, shutdown.clone());

    handle.bind_catalog(catalog).await?;
    handle.select_track(0).await?;
    println!("Selected: {}", handle.current_title().await);

    // Let the first track finish so the session advances by itself.
    tokio::time::sleep(Duration::from_millis(1_200)).await;
    println!("Now on: {}", handle.current_title().await);

    let shuffled = handle.toggle_shuffle().await?;
    println!("Shuffle enabled: {}", shuffled);
    handle.next().await?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    handle.seek(400).await?;
    println!(
        "Position {} / {} ms",
        handle.current_position().await,
        handle.duration().await
    );

    handle.pause().await?;
    let snapshot = handle.snapshot().await?;
    println!("Snapshot: {}", serde_json::to_string_pretty(&snapshot)?);

    shutdown.cancel();
    task.await?;
    Ok(())
}
