// SPDX-License-Identifier: MIT
//! Async Orchestrator (C9, spec §4.7): runs multiple independent Engines
//! concurrently under a capacity limiter, with a global idle watchdog and
//! signal-driven shutdown — grounded on the teacher's daemon event loop
//! (`groblegark-oddjobs/crates/daemon/src/main.rs`), generalized from one
//! WAL-driven loop to a `tokio::sync::Semaphore`-bounded fan-out over
//! independently spawned Engines.

use crate::engine::Engine;
use crate::error::RuntimeError;
use oneshot_core::Clock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    pub max_concurrent: usize,
    pub heartbeat_interval: Duration,
    pub global_idle_threshold: Duration,
    /// How long to wait after a shutdown signal before force-aborting
    /// Engines that have not yet reached a terminal state.
    pub shutdown_grace_period: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            heartbeat_interval: Duration::from_secs(5),
            global_idle_threshold: Duration::from_secs(600),
            shutdown_grace_period: Duration::from_secs(5),
        }
    }
}

/// Runs a batch of independent [`Engine`]s to completion (spec §4.7,
/// §5 "Multi-task concurrent"). Engines share no state with each other;
/// only the capacity limiter and the idle watchdog cut across them.
pub struct Orchestrator<C: Clock> {
    clock: C,
    config: OrchestratorConfig,
}

impl<C: Clock> Orchestrator<C> {
    pub fn new(clock: C, config: OrchestratorConfig) -> Self {
        Self { clock, config }
    }

    /// Drive every Engine in `engines` to a terminal state, respecting
    /// `max_concurrent`, and return each one's `run()` result in the same
    /// order the Engines were given.
    pub async fn run(&self, engines: Vec<Engine<C>>) -> Vec<Result<bool, RuntimeError>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let mut join_handles = Vec::with_capacity(engines.len());
        let mut interrupts = Vec::with_capacity(engines.len());
        let mut activities = Vec::with_capacity(engines.len());

        for mut engine in engines {
            interrupts.push(engine.interrupt_handle());
            activities.push(engine.activity_handle());
            let sem = semaphore.clone();
            join_handles.push(tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.expect("semaphore is never closed");
                engine.run().await
            }));
        }

        let abort_handles: Vec<_> = join_handles.iter().map(|h| h.abort_handle()).collect();

        let watchdog = tokio::spawn(Self::watchdog(
            self.clock.clone(),
            interrupts.clone(),
            activities,
            self.config.heartbeat_interval,
            self.config.global_idle_threshold,
        ));

        let signal_listener = tokio::spawn(Self::shutdown_listener(
            interrupts,
            abort_handles,
            self.config.shutdown_grace_period,
        ));

        let joined = futures::future::join_all(join_handles).await;
        watchdog.abort();
        signal_listener.abort();

        joined
            .into_iter()
            .map(|r| r.unwrap_or(Err(RuntimeError::Interrupted)))
            .collect()
    }

    /// Interrupt any task whose `last_activity` has exceeded
    /// `global_idle_threshold`, checked every `heartbeat_interval` (spec §4.7).
    async fn watchdog(
        clock: C,
        interrupts: Vec<Arc<AtomicBool>>,
        activities: Vec<Arc<AtomicU64>>,
        heartbeat_interval: Duration,
        global_idle_threshold: Duration,
    ) {
        let mut ticker = tokio::time::interval(heartbeat_interval);
        loop {
            ticker.tick().await;
            let now = clock.now();
            for (interrupt, activity) in interrupts.iter().zip(activities.iter()) {
                let last = f64::from_bits(activity.load(Ordering::Relaxed));
                if now - last > global_idle_threshold.as_secs_f64() {
                    interrupt.store(true, Ordering::Relaxed);
                }
            }
        }
    }

    /// On SIGTERM/SIGINT, interrupt every task; after `grace_period`, force
    /// terminate whatever Engines have not yet wound down (spec §4.7).
    async fn shutdown_listener(
        interrupts: Vec<Arc<AtomicBool>>,
        abort_handles: Vec<tokio::task::AbortHandle>,
        grace_period: Duration,
    ) {
        if let Err(e) = wait_for_shutdown_signal().await {
            tracing::warn!(error = %e, "failed to install signal handler, shutdown watchdog disabled");
            return;
        }
        tracing::info!("shutdown signal received, interrupting all tasks");
        for interrupt in &interrupts {
            interrupt.store(true, Ordering::Relaxed);
        }
        tokio::time::sleep(grace_period).await;
        for handle in &abort_handles {
            handle.abort();
        }
    }
}

async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
    Ok(())
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
