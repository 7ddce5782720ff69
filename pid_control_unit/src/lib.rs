//! # PID Control Unit Library
//!
//! Closed-loop PID engine that runs on its own periodic compute thread,
//! decoupled from the host that writes its inputs and reads its outputs.
//!
//! ## Layers
//!
//! 1. **control**: clamp/remap helpers, [`control::pid::PidEngine`] with the
//!    normalized and raw-error variants, output word encoding.
//! 2. **publish**: lock-light cells shared by the compute thread and host.
//! 3. **cycle**: [`cycle::LoopController`]: Enable / Disable / Reset and
//!    the fixed-period tick.
//! 4. **host**: [`host::HostAdapter`]: one host solve cycle.
//!
//! ## Shared-state contract
//!
//! The host writes config and error; only the compute thread (or an explicit
//! Reset) mutates engine state. Each step's `(output, p_out, i_out, d_out,
//! dt)` is published as one snapshot. Config and error are separate cells,
//! so a tick may combine a fresh error with the previous config;
//! consistency between the two is eventual.

pub mod config;
pub mod control;
pub mod cycle;
pub mod error;
pub mod host;
pub mod publish;
pub mod sim;
