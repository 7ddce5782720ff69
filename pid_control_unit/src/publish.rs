//! Cross-thread cells between the compute thread and the host.
//!
//! - [`InputCell`]: host → engine. Validated config plus the latest error.
//! - [`SnapshotCell`]: engine → host. One [`StepSnapshot`] swapped as a
//!   whole per step, so a reader never sees `output` from one step next to
//!   `p_out`/`i_out`/`d_out` from another.
//! - [`LoopStatus`]: step/fault counters and the last fault.
//!
//! Config and error are independent cells: a tick may pair a new error with
//! the previous config (or the reverse). That is accepted; every tick still
//! sees a complete, validated config.
//!
//! Critical sections are plain copies of a few words, so the compute thread
//! is never held up longer than a reader's copy.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use pid_common::config::ConfigError;
use pid_common::pid::{PidConfig, StepSnapshot};

use crate::error::StepFault;

// ─── InputCell ──────────────────────────────────────────────────────

/// Host write surface.
#[derive(Debug)]
pub struct InputCell {
    config: RwLock<PidConfig>,
    /// `f64` bits of the error reading.
    error: AtomicU64,
}

impl InputCell {
    /// `config` must already be validated.
    pub(crate) fn new(config: PidConfig) -> Self {
        Self {
            config: RwLock::new(config),
            error: AtomicU64::new(0f64.to_bits()),
        }
    }

    /// Validate and store; an invalid config never replaces the current one.
    pub fn store_config(&self, config: PidConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.config.write() = config;
        Ok(())
    }

    #[inline]
    pub fn config(&self) -> PidConfig {
        *self.config.read()
    }

    #[inline]
    pub fn store_error(&self, error: f64) {
        self.error.store(error.to_bits(), Ordering::Release);
    }

    #[inline]
    pub fn error(&self) -> f64 {
        f64::from_bits(self.error.load(Ordering::Acquire))
    }
}

// ─── SnapshotCell ───────────────────────────────────────────────────

/// Latest published step results.
#[derive(Debug)]
pub struct SnapshotCell {
    current: RwLock<StepSnapshot>,
}

impl SnapshotCell {
    pub(crate) fn new(initial: StepSnapshot) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Replace the published snapshot as one unit.
    #[inline]
    pub(crate) fn publish(&self, snapshot: StepSnapshot) {
        *self.current.write() = snapshot;
    }

    #[inline]
    pub fn load(&self) -> StepSnapshot {
        *self.current.read()
    }
}

// ─── LoopStatus ─────────────────────────────────────────────────────

/// Step bookkeeping, polled by the host.
#[derive(Debug, Default)]
pub struct LoopStatus {
    steps: AtomicU64,
    faults: AtomicU64,
    last_fault: Mutex<Option<StepFault>>,
}

/// Point-in-time copy of [`LoopStatus`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusReport {
    /// Successful steps since construction.
    pub steps: u64,
    /// Faulted steps since construction.
    pub faults: u64,
    /// Most recent fault, if any.
    pub last_fault: Option<StepFault>,
    /// Whether a compute thread is currently running.
    pub enabled: bool,
}

impl LoopStatus {
    #[inline]
    pub(crate) fn record_step(&self) -> u64 {
        self.steps.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Store `fault` as the last fault and return the new fault count.
    pub(crate) fn record_fault(&self, fault: StepFault) -> u64 {
        *self.last_fault.lock() = Some(fault);
        self.faults.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::Acquire)
    }

    #[inline]
    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Acquire)
    }

    pub fn last_fault(&self) -> Option<StepFault> {
        self.last_fault.lock().clone()
    }

    /// Forget the last fault; counters are kept.
    pub(crate) fn clear_fault(&self) {
        *self.last_fault.lock() = None;
    }

    pub(crate) fn report(&self, enabled: bool) -> StatusReport {
        StatusReport {
            steps: self.steps(),
            faults: self.faults(),
            last_fault: self.last_fault(),
            enabled,
        }
    }
}
