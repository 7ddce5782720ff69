//! Error types for the control unit.
//!
//! Configuration errors are synchronous and come from `pid_common`.
//! Step faults are isolated per tick: the loop records them in
//! [`LoopStatus`](crate::publish::LoopStatus) and keeps running.

use pid_common::config::ConfigError;
use thiserror::Error;

/// A single step that could not produce a result.
///
/// The engine state and the published snapshot are left exactly as they
/// were before the faulting step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepFault {
    /// The error reading is NaN or infinite.
    #[error("error input is not finite: {value}")]
    NonFiniteError {
        /// Offending reading.
        value: f64,
    },

    /// The computation overflowed to a non-finite output or term.
    #[error("step produced a non-finite result")]
    NonFiniteOutput,

    /// The configuration picked up for this tick was rejected.
    #[error("configuration rejected at tick: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Background loop lifecycle failure.
#[derive(Debug, Error)]
pub enum LoopError {
    /// The compute thread could not be started.
    #[error("failed to spawn compute thread: {source}")]
    Spawn {
        #[from]
        source: std::io::Error,
    },

    /// The compute thread panicked before it could be joined.
    #[error("compute thread panicked")]
    Panicked,
}

/// Failure of one host solve cycle.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Loop(#[from] LoopError),
}
