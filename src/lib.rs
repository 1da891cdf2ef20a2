// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod container;
pub mod dispatch;
pub mod duration;
pub mod errors;
pub mod launch;
pub mod logging;
pub mod schedule;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::client::{all_containers, DockerClient, EngineClient};
use crate::config::{load_optional, process_env, resolve, Settings};
use crate::container::{is_candidate, CandidateSelection, Container, Event};
use crate::dispatch::{pump_events, EventDispatcher, RESUBSCRIBE_DELAY};
use crate::launch::Launcher;
use crate::schedule::RecurringScheduler;

/// High-level entry point used by `main.rs`.
///
/// Resolves settings, connects to the engine, then either prints the
/// dry-run report or runs until Ctrl-C.
pub async fn run(args: CliArgs) -> Result<()> {
    let file = load_optional(args.config.as_deref())?;
    let settings = resolve(file, &args.overrides(), process_env)?;
    let selection = CandidateSelection::new(&args.names);

    info!(host = %settings.host, names = ?selection.names(), "connecting to engine");
    let client: Arc<dyn EngineClient> = Arc::new(DockerClient::connect(&settings.host)?);

    if args.dry_run {
        print_dry_run(client.as_ref(), &selection).await?;
        return Ok(());
    }

    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received; shutting down");
                    token.cancel();
                }
                Err(e) => error!(error = %e, "failed to listen for Ctrl-C"),
            }
        });
    }

    run_with_client(client, settings, selection, token).await
}

/// Run the scheduler, the event subscription and the dispatcher against
/// `client` until `token` is cancelled.
///
/// A failed or closed event subscription is retried and never stops the
/// recurring scheduler. Returns after the scheduler has drained and the
/// dispatcher has finished its current event.
pub async fn run_with_client(
    client: Arc<dyn EngineClient>,
    settings: Settings,
    selection: CandidateSelection,
    token: CancellationToken,
) -> Result<()> {
    let launcher = Launcher::new(client.clone(), settings.launch.clone());

    let scheduler = Arc::new(RecurringScheduler::new(
        launcher.clone(),
        selection.clone(),
        settings.tick_interval,
        token.child_token(),
    ));
    let dispatcher = EventDispatcher::new(launcher, selection);

    let (event_tx, event_rx) = mpsc::channel::<Event>(settings.event_queue_length);

    let pump = {
        let client = client.clone();
        let token = token.clone();
        tokio::spawn(async move {
            pump_events(client.as_ref(), event_tx, token, RESUBSCRIBE_DELAY).await
        })
    };

    let scheduler_handle = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    dispatcher.run(event_rx, token.clone()).await;

    scheduler_handle.await?;
    debug!(state = %scheduler.state(), "scheduler joined");

    pump.await?;
    info!("tugbot stopped");
    Ok(())
}

/// Print every container with the decisions tugbot would take for it.
async fn print_dry_run(client: &dyn EngineClient, selection: &CandidateSelection) -> Result<()> {
    let containers = client.list_containers(&all_containers).await?;

    println!("tugbot dry-run");
    if !selection.names().is_empty() {
        println!("  names: {:?}", selection.names());
    }
    println!();

    println!("containers ({}):", containers.len());
    for c in &containers {
        print_container(c, selection);
    }

    debug!("dry-run complete (nothing launched)");
    Ok(())
}

fn print_container(c: &Container, selection: &CandidateSelection) {
    let meta = c.metadata();
    println!("  - {} ({})", c.name(), c.id());
    println!("      state: {}", c.state());
    println!("      image: {}", c.image_name());
    println!("      candidate: {}", is_candidate(c));
    if !selection.admits(c) {
        println!("      selected: false");
    }
    if meta.is_service {
        println!("      service: true");
    }
    if let Some(ref from) = meta.created_from {
        println!("      created_from: {from}");
    }
    if let Some(interval) = meta.interval {
        println!("      every: {interval:?}");
    }
    if let Some(ref events) = meta.events {
        println!("      events:");
        if let Some(ref types) = events.types {
            println!("        type: {types:?}");
        }
        if let Some(ref actions) = events.actions {
            println!("        action: {actions:?}");
        }
        if let Some(ref names) = events.names {
            println!("        container: {names}");
        }
        if let Some(ref images) = events.images {
            println!("        image: {images}");
        }
        if let Some(ref labels) = events.labels {
            println!("        label: {labels:?}");
        }
    }
}
