//! Block-arrival observation with adaptive polling.
//!
//! One observer runs per endpoint, started on the first listener
//! registration. Two background tasks share its state:
//!
//! - the **health loop** probes the node every
//!   `health_check_interval_secs` and emits an event on each verdict
//!   transition;
//! - the **block-wait loop** predicts when the next block is due from
//!   the forger hit times and polls the height just after each
//!   predicted hit, correcting for measured drift.
//!
//! Both loops stop at their next iteration boundary once the last
//! listener is removed.

pub mod schedule;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::api::Provider;
use crate::error::ClientResult;

/// Callbacks for block and health events.
///
/// Events are not buffered or replayed: a listener only receives
/// events emitted while it is registered, and none are emitted while
/// the node is unhealthy. Consumers that need gap-free height
/// tracking must remember the last height they saw and query the node
/// for the missing range whenever `on_block` reports a
/// non-consecutive pair.
pub trait BlockListener: Send + Sync {
    /// A new block was observed. `old_height` is the previous height
    /// known to the observer; the two are not guaranteed consecutive.
    fn on_block(&self, height: u64, old_height: u64);

    /// The node health verdict changed. While unhealthy, no block
    /// events are emitted.
    fn on_node_health_change(&self, healthy: bool);
}

/// Background block observer for one endpoint.
///
/// Created through [`Provider::add_block_listener`] or
/// [`Provider::observer`]; shared state is atomics plus a listener
/// list, so the two loops and any caller-side `wait_block` interleave
/// safely.
pub struct BlockObserver {
    provider: Provider,
    height: AtomicU64,
    healthy: AtomicBool,
    running: AtomicBool,
    // Bumped on every loop start. Loops from a stopped run compare
    // their captured epoch against this and exit even if `running`
    // flipped back to true in the meantime.
    epoch: AtomicU64,
    listeners: Mutex<Vec<Arc<dyn BlockListener>>>,
}

impl BlockObserver {
    /// Build an observer over the given provider. Loops do not start
    /// until the first listener registers.
    pub fn new(provider: Provider) -> Arc<Self> {
        Arc::new(Self {
            provider,
            height: AtomicU64::new(0),
            healthy: AtomicBool::new(false),
            running: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        })
    }

    /// Last height known to this observer.
    pub fn height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }

    /// Last health verdict.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    /// Whether the background loops are (or are about to be) running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Register a listener. The first registration starts both loops;
    /// registering again after the last listener was removed starts a
    /// fresh pair, and any loops still draining from the previous run
    /// exit at their next iteration boundary.
    pub fn add_listener(self: &Arc<Self>, listener: Arc<dyn BlockListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
        if !self.running.swap(true, Ordering::SeqCst) {
            let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            let health = Arc::clone(self);
            tokio::spawn(async move { health.health_loop(epoch).await });
            let waiter = Arc::clone(self);
            tokio::spawn(async move { waiter.block_wait_loop(epoch).await });
            tracing::info!(endpoint = %self.provider.config().base_url, "block observer started");
        }
    }

    /// Remove a listener, matched by `Arc` identity. Removing the
    /// last one signals both loops to stop at their next iteration.
    pub fn remove_listener(&self, listener: &Arc<dyn BlockListener>) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|l| !Arc::ptr_eq(l, listener));
        if listeners.is_empty() {
            self.stop();
        }
    }

    /// Remove every listener and stop both loops.
    pub fn remove_all_listeners(&self) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.stop();
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            tracing::info!(endpoint = %self.provider.config().base_url, "block observer stopping");
        }
    }

    fn emit_block(&self, height: u64, old_height: u64) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.on_block(height, old_height);
        }
    }

    fn emit_health(&self, healthy: bool) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.on_node_health_change(healthy);
        }
    }

    /// Probe the node once and emit an event if the verdict changed.
    pub async fn check_health(&self) {
        let verdict = self.provider.is_node_healthy().await;
        let previous = self.healthy.swap(verdict, Ordering::SeqCst);
        if previous != verdict {
            tracing::info!(healthy = verdict, "node health changed");
            self.emit_health(verdict);
        }
    }

    // True while the loops spawned at `epoch` should keep going.
    // A stop-then-restart bumps the epoch, so a stale pair that never
    // saw `running == false` still winds down.
    fn loop_active(&self, epoch: u64) -> bool {
        self.running.load(Ordering::SeqCst) && self.epoch.load(Ordering::SeqCst) == epoch
    }

    async fn health_loop(self: Arc<Self>, epoch: u64) {
        let interval = Duration::from_secs(self.provider.config().health_check_interval_secs);
        while self.loop_active(epoch) {
            self.check_health().await;
            sleep(interval).await;
        }
        tracing::debug!("health loop exited");
    }

    async fn block_wait_loop(self: Arc<Self>, epoch: u64) {
        let config = self.provider.config().clone();
        let health_interval = Duration::from_secs(config.health_check_interval_secs);
        let backoff = Duration::from_secs(config.retry_backoff_secs);

        // Prime the known height so the first wait compares against
        // reality instead of zero.
        match self.provider.block_height().await {
            Ok(height) => {
                self.height.fetch_max(height, Ordering::SeqCst);
            }
            Err(e) => tracing::warn!(error = %e, "could not prime block height"),
        }

        while self.loop_active(epoch) {
            if self.healthy.load(Ordering::SeqCst) {
                if let Err(e) = self.wait_block(config.block_wait_timeout_secs).await {
                    tracing::warn!(error = %e, "block wait failed, re-checking health");
                    self.check_health().await;
                    sleep(backoff).await;
                }
            } else {
                sleep(health_interval).await;
            }
        }
        tracing::debug!("block wait loop exited");
    }

    /// Wait for the next block within `timeout_secs` (0 disables the
    /// cap on how far ahead candidates are scheduled).
    ///
    /// Sleeps through the computed schedule, polling the height after
    /// each slot. Each sleep is the scheduled duration minus the drift
    /// measured on the previous iteration, plus a fixed 100 ms buffer.
    /// Returns the new height on a height increase, `None` if the
    /// schedule was exhausted without one.
    pub async fn wait_block(&self, timeout_secs: u64) -> ClientResult<Option<u64>> {
        let slots = self.provider.block_wait_schedule(timeout_secs).await?;
        let mut drift_ms: i64 = 0;

        for intended in slots {
            let started = Instant::now();
            let sleep_ms = intended.as_millis() as i64 - drift_ms
                + schedule::SLEEP_BUFFER.as_millis() as i64;
            if sleep_ms > 0 {
                sleep(Duration::from_millis(sleep_ms as u64)).await;
            }

            let polled = self.provider.block_height().await?;
            if self.healthy.load(Ordering::SeqCst) {
                let old = self.height.fetch_max(polled, Ordering::SeqCst);
                if polled > old {
                    tracing::debug!(height = polled, old_height = old, "new block observed");
                    self.emit_block(polled, old);
                    return Ok(Some(polled));
                }
            }
            // Loop overhead eats into the next slot; measure it and
            // subtract next time.
            drift_ms = started.elapsed().as_millis() as i64 - intended.as_millis() as i64;
        }

        Ok(None)
    }
}

impl std::fmt::Debug for BlockObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockObserver")
            .field("height", &self.height())
            .field("healthy", &self.is_healthy())
            .field("running", &self.is_running())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
