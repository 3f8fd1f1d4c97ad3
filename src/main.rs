//! animstate - sample host
//!
//! Loads a state graph, binds one instance to it and drives it with a frame
//! pulse, firing the configured trigger script along the way.

use animstate_core::{create_runner, StateMachine, TransitionEvent};
use animstate_host::{load_graph, spawn_machine, Config, FramePulse};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration (from file if ANIMSTATE_CONFIG is set, then env overrides)
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        return Err(e.into());
    }

    tracing::info!("Starting animstate host");
    tracing::info!("  Graph: {} ({:?})", config.graph.path.display(), config.graph.dialect);
    tracing::info!("  Frame rate: {} Hz", config.frame.rate_hz);
    if config.frame.is_bounded() {
        tracing::info!("  Max frames: {}", config.frame.max_frames);
    }

    let graph = match load_graph(&config.graph) {
        Ok(graph) => Arc::new(graph),
        Err(e) => {
            tracing::error!("Failed to load graph: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("  States: {}", graph.state_count());

    let mut machine = spawn_machine(graph, &config.graph)?;
    machine.set_observer(Arc::new(|m: &StateMachine, e: &TransitionEvent| {
        tracing::info!(
            "instance {}: {} --{}--> {}",
            m.id(),
            e.from_state,
            e.trigger,
            e.to_state
        );
    }));
    tracing::info!("  Initial state: {}", machine.current_state_name());

    let machine = machine.into_shared();
    let runner = create_runner();
    runner.start(machine.clone());

    let pulse = Arc::new(FramePulse::new(runner.clone(), config.frame.clone()));
    pulse.schedule(&config.script, &machine);

    // Spawn shutdown signal handler
    let shutdown_pulse = pulse.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal, stopping...");
        shutdown_pulse.shutdown();
    });

    // Run frame loop (blocks until shutdown or max_frames)
    let frames = pulse.run().await;
    runner.stop(&machine);

    let machine = machine.lock();
    tracing::info!(
        "Stopped after {} frames in state '{}' ({:.2}s in state)",
        frames,
        machine.current_state_name(),
        machine.time_in_state()
    );
    Ok(())
}
