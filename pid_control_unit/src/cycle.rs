//! Background compute loop and its Enable / Disable / Reset lifecycle.
//!
//! ## States
//! - **Disabled** (initial): no compute thread, `handle == None`.
//! - **Enabled**: one compute thread owned through a [`LoopHandle`].
//!
//! Redundant `enable()` / `disable()` calls are no-ops. Dropping the
//! controller disables it.
//!
//! ## Tick
//! Sleep `period_ms(compute_hz)` (re-read from the current config every
//! tick), check the cancellation flag, pick up the latest config and error,
//! run one step and publish the snapshot. A faulting step is recorded in
//! [`LoopStatus`] and the loop carries on at its next tick.
//!
//! ## Cancellation
//! `disable()` raises the flag, unparks the thread and joins it. The flag is
//! only checked between steps, so a step is never cut short; once `disable()`
//! returns no further step happens.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pid_common::config::ConfigError;
use pid_common::consts::{LOOP_THREAD_NAME, MIN_PERIOD_MS};
use pid_common::pid::{PidConfig, PidVariant, StepSnapshot};
use tracing::{debug, info, trace, warn};

use crate::control::pid::PidEngine;
use crate::error::{LoopError, StepFault};
use crate::publish::{InputCell, LoopStatus, SnapshotCell, StatusReport};

/// Sleep period for `compute_hz`: `floor(1000 / compute_hz)` ms, never less
/// than [`MIN_PERIOD_MS`].
#[inline]
pub fn period_ms(compute_hz: f64) -> u64 {
    ((1000.0 / compute_hz).floor() as u64).max(MIN_PERIOD_MS)
}

// ─── Shared ─────────────────────────────────────────────────────────

/// State reachable from both the compute thread and the host.
#[derive(Debug)]
struct Shared {
    /// Locked for the duration of one step or reset; publication happens
    /// under the same lock so snapshots are published in `seq` order.
    engine: Mutex<PidEngine>,
    inputs: InputCell,
    snapshot: SnapshotCell,
    status: LoopStatus,
    enabled: AtomicBool,
}

impl Shared {
    fn tick(&self, now: Instant) -> Result<StepSnapshot, StepFault> {
        let config = self.inputs.config();
        let error = self.inputs.error();

        let mut engine = self.engine.lock();
        if engine.config() != &config {
            engine.configure(config)?;
            debug!(compute_hz = config.compute_hz, "picked up new configuration");
        }
        let snapshot = engine.step(error, now)?;
        self.snapshot.publish(snapshot);
        Ok(snapshot)
    }

    fn reset(&self, now: Instant) -> StepSnapshot {
        let config = self.inputs.config();
        let mut engine = self.engine.lock();
        // Reset uses the latest config (feed-forward / out_min for the
        // normalized default output); it was validated on store.
        if let Err(e) = engine.configure(config) {
            warn!("keeping previous configuration on reset: {e}");
        }
        let snapshot = engine.reset(now);
        self.snapshot.publish(snapshot);
        snapshot
    }
}

// ─── PidPort ────────────────────────────────────────────────────────

/// Cloneable host-side access to one engine: write config and error, read
/// snapshot and status, request a reset.
///
/// Safe to use from any thread while the loop runs.
#[derive(Debug, Clone)]
pub struct PidPort {
    shared: Arc<Shared>,
}

impl PidPort {
    /// Validate and store a new configuration, effective on the next tick.
    pub fn configure(&self, config: PidConfig) -> Result<(), ConfigError> {
        self.shared.inputs.store_config(config)
    }

    /// Store the error reading used by the next tick.
    #[inline]
    pub fn set_error(&self, error: f64) {
        self.shared.inputs.store_error(error);
    }

    #[inline]
    pub fn config(&self) -> PidConfig {
        self.shared.inputs.config()
    }

    /// Latest published step results.
    #[inline]
    pub fn snapshot(&self) -> StepSnapshot {
        self.shared.snapshot.load()
    }

    pub fn status(&self) -> StatusReport {
        self.shared
            .status
            .report(self.shared.enabled.load(Ordering::Acquire))
    }

    /// Zero accumulators, restart timing at now and forget the last fault
    /// (fault and step counters are kept). Does not change the Enabled /
    /// Disabled state.
    pub fn reset(&self) -> StepSnapshot {
        let snapshot = self.shared.reset(Instant::now());
        self.shared.status.clear_fault();
        debug!(output = snapshot.output, "engine reset");
        snapshot
    }

    /// Run one tick on the calling thread, exactly as the compute thread
    /// would, and record the outcome in the status.
    pub fn step_now(&self) -> Result<StepSnapshot, StepFault> {
        run_tick(&self.shared, Instant::now())
    }
}

// ─── LoopHandle ─────────────────────────────────────────────────────

/// A running compute thread. Existing ⇔ Enabled.
#[derive(Debug)]
pub struct LoopHandle {
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl LoopHandle {
    fn spawn(shared: Arc<Shared>) -> Result<Self, LoopError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let thread = thread::Builder::new()
            .name(LOOP_THREAD_NAME.to_string())
            .spawn(move || run_loop(&shared, &flag))?;
        Ok(Self { cancel, thread })
    }

    /// Signal, wake and join the compute thread.
    fn stop(self) -> Result<(), LoopError> {
        self.cancel.store(true, Ordering::Release);
        self.thread.thread().unpark();
        self.thread.join().map_err(|_| LoopError::Panicked)
    }
}

// ─── LoopController ─────────────────────────────────────────────────

/// Owns one engine and at most one compute thread for it.
#[derive(Debug)]
pub struct LoopController {
    port: PidPort,
    handle: Option<LoopHandle>,
}

impl LoopController {
    /// Build a Disabled controller. Fails fast on an invalid config.
    pub fn new(config: PidConfig, variant: PidVariant) -> Result<Self, ConfigError> {
        let engine = PidEngine::new(config, variant, Instant::now())?;
        let initial = engine.snapshot();
        let shared = Arc::new(Shared {
            engine: Mutex::new(engine),
            inputs: InputCell::new(config),
            snapshot: SnapshotCell::new(initial),
            status: LoopStatus::default(),
            enabled: AtomicBool::new(false),
        });
        debug!(variant = variant.name(), "controller created");
        Ok(Self {
            port: PidPort { shared },
            handle: None,
        })
    }

    /// Reset the engine and start the compute thread. No-op when Enabled.
    pub fn enable(&mut self) -> Result<(), LoopError> {
        if self.handle.is_some() {
            return Ok(());
        }

        self.port.reset();
        let handle = LoopHandle::spawn(Arc::clone(&self.port.shared))?;
        self.handle = Some(handle);
        self.port.shared.enabled.store(true, Ordering::Release);

        let config = self.port.config();
        info!(
            compute_hz = config.compute_hz,
            period_ms = period_ms(config.compute_hz),
            "PID loop enabled"
        );
        Ok(())
    }

    /// Stop the compute thread. No-op when Disabled.
    ///
    /// The handle is released even if the thread panicked, so a later
    /// `enable()` starts fresh.
    pub fn disable(&mut self) -> Result<(), LoopError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.port.shared.enabled.store(false, Ordering::Release);
        let result = handle.stop();
        info!(steps = self.port.shared.status.steps(), "PID loop disabled");
        result
    }

    /// Reset accumulators and timing; Enabled / Disabled is unchanged.
    pub fn reset(&self) -> StepSnapshot {
        self.port.reset()
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.handle.is_some()
    }

    /// Host-side handle for use from other threads.
    pub fn port(&self) -> PidPort {
        self.port.clone()
    }

    pub fn configure(&self, config: PidConfig) -> Result<(), ConfigError> {
        self.port.configure(config)
    }

    #[inline]
    pub fn set_error(&self, error: f64) {
        self.port.set_error(error);
    }

    #[inline]
    pub fn snapshot(&self) -> StepSnapshot {
        self.port.snapshot()
    }

    pub fn status(&self) -> StatusReport {
        self.port.status()
    }
}

impl Drop for LoopController {
    fn drop(&mut self) {
        if let Err(e) = self.disable() {
            warn!("PID loop did not stop cleanly: {e}");
        }
    }
}

// ─── Loop body ──────────────────────────────────────────────────────

fn run_loop(shared: &Shared, cancel: &AtomicBool) {
    debug!("compute thread started");

    loop {
        let period = Duration::from_millis(period_ms(shared.inputs.config().compute_hz));
        if !sleep_unless_cancelled(period, cancel) {
            break;
        }
        // A tick's outcome is recorded in the status; the loop never exits
        // on a fault.
        let _ = run_tick(shared, Instant::now());
    }

    debug!("compute thread exiting");
}

fn run_tick(shared: &Shared, now: Instant) -> Result<StepSnapshot, StepFault> {
    let result = shared.tick(now);
    match &result {
        Ok(snapshot) => {
            let steps = shared.status.record_step();
            trace!(
                steps,
                output = snapshot.output,
                p_out = snapshot.p_out,
                i_out = snapshot.i_out,
                d_out = snapshot.d_out,
                dt = snapshot.dt,
                "step"
            );
        }
        Err(fault) => {
            let faults = shared.status.record_fault(fault.clone());
            warn!(faults, "step skipped: {fault}");
        }
    }
    result
}

/// Park until `period` has elapsed. Returns `false` if cancelled first.
fn sleep_unless_cancelled(period: Duration, cancel: &AtomicBool) -> bool {
    let deadline = Instant::now() + period;
    loop {
        if cancel.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::park_timeout(deadline - now);
    }
}
