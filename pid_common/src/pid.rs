//! PID configuration, step snapshot and host field types.
//!
//! Field names and units are the contract with the external host /
//! visualization layer: seconds for time, engineering units for error and
//! output.

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::config::ConfigError;
use crate::consts::DEFAULT_COMPUTE_HZ;

// ─── PidConfig ──────────────────────────────────────────────────────

/// Per-cycle configuration snapshot written by the host.
///
/// May change between cycles; the loop picks up the latest validated copy on
/// its next tick without restarting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    /// Proportional gain.
    #[serde(default)]
    pub kp: f64,
    /// Integral gain.
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain.
    #[serde(default)]
    pub kd: f64,
    /// Constant bias added to the output.
    #[serde(default)]
    pub feedforward: f64,
    /// Lower error clamp.
    pub err_min: f64,
    /// Upper error clamp. Must be greater than `err_min`.
    pub err_max: f64,
    /// Lower output bound.
    pub out_min: f64,
    /// Upper output bound. Must be greater than `out_min`.
    pub out_max: f64,
    /// Compute frequency [Hz]. Must be positive.
    #[serde(default = "default_compute_hz")]
    pub compute_hz: f64,
}

fn default_compute_hz() -> f64 {
    DEFAULT_COMPUTE_HZ
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            feedforward: 0.0,
            err_min: -1.0,
            err_max: 1.0,
            out_min: 0.0,
            out_max: 100.0,
            compute_hz: DEFAULT_COMPUTE_HZ,
        }
    }
}

impl PidConfig {
    /// Reject configurations that would divide by zero in remap or produce
    /// a zero / infinite sleep period.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("kp", self.kp),
            ("ki", self.ki),
            ("kd", self.kd),
            ("feedforward", self.feedforward),
            ("err_min", self.err_min),
            ("err_max", self.err_max),
            ("out_min", self.out_min),
            ("out_max", self.out_max),
            ("compute_hz", self.compute_hz),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        if self.compute_hz <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "compute_hz must be > 0, got {}",
                self.compute_hz
            )));
        }
        if self.err_max <= self.err_min {
            return Err(ConfigError::ValidationError(format!(
                "err_max ({}) must be greater than err_min ({})",
                self.err_max, self.err_min
            )));
        }
        if self.out_max <= self.out_min {
            return Err(ConfigError::ValidationError(format!(
                "out_max ({}) must be greater than out_min ({})",
                self.out_max, self.out_min
            )));
        }
        Ok(())
    }

    /// Nominal tick period [s].
    #[inline]
    pub fn nominal_period(&self) -> f64 {
        1.0 / self.compute_hz
    }
}

// ─── PidVariant ─────────────────────────────────────────────────────

/// Computation strategy selected for an engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PidVariant {
    /// Variant A: error normalized to `[-1, 1]`, integral scaled by `dt`,
    /// derivative divided by `dt`, feed-forward added after the remap.
    Normalized,
    /// Variant B: raw clamped error, integral accumulated only on a
    /// near-nominal tick, undivided derivative, feed-forward inside the clamp.
    RawError {
        /// Output value restored by Reset.
        #[serde(default)]
        out_default: f64,
    },
}

impl Default for PidVariant {
    fn default() -> Self {
        Self::RawError { out_default: 0.0 }
    }
}

impl PidVariant {
    /// Short name for log lines.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Normalized => "normalized",
            Self::RawError { .. } => "raw_error",
        }
    }
}

// ─── StepSnapshot ───────────────────────────────────────────────────

/// Results of one step (or reset), published as a single unit.
///
/// Readers never observe `output` from one step mixed with `p_out`/`i_out`/
/// `d_out` from another.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct StepSnapshot {
    /// Control output [engineering units].
    pub output: f64,
    /// Proportional contribution (display only for variant A).
    pub p_out: f64,
    /// Integral contribution (display only for variant A).
    pub i_out: f64,
    /// Derivative contribution (display only for variant A).
    pub d_out: f64,
    /// Seconds since the previous step.
    pub dt: f64,
    /// Clamped (variant B) or normalized (variant A) error used by the step.
    pub error: f64,
    /// Publication sequence number; increments on every step or reset.
    pub seq: u64,
}

const_assert_eq!(core::mem::size_of::<StepSnapshot>(), 56);

impl StepSnapshot {
    /// Returns true if all numeric fields are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.output.is_finite()
            && self.p_out.is_finite()
            && self.i_out.is_finite()
            && self.d_out.is_finite()
            && self.dt.is_finite()
            && self.error.is_finite()
    }
}

// ─── Host Fields ────────────────────────────────────────────────────

/// Everything the host writes in one solve cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HostInputs {
    /// Current error reading.
    pub error: f64,
    /// Gains, limits and frequency.
    pub config: PidConfig,
    /// Maps to Enable (true) / Disable (false).
    pub enable: bool,
    /// Maps to Reset when true.
    pub reset: bool,
}

impl Default for HostInputs {
    fn default() -> Self {
        Self {
            error: 0.0,
            config: PidConfig::default(),
            enable: true,
            reset: false,
        }
    }
}

/// Everything the host reads back in one solve cycle.
///
/// The host displays integers; values are rounded half-to-even and
/// saturate at the `i32` range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HostOutputs {
    pub output: i32,
    pub p_out: i32,
    pub i_out: i32,
    pub d_out: i32,
    /// Seconds since the previous step.
    pub dt: f64,
}

impl HostOutputs {
    /// Build the host view of a published snapshot.
    pub fn from_snapshot(snapshot: &StepSnapshot) -> Self {
        Self {
            output: to_display_int(snapshot.output),
            p_out: to_display_int(snapshot.p_out),
            i_out: to_display_int(snapshot.i_out),
            d_out: to_display_int(snapshot.d_out),
            dt: snapshot.dt,
        }
    }
}

/// Round half-to-even and saturate into `i32`; NaN maps to 0.
#[inline]
pub fn to_display_int(value: f64) -> i32 {
    value.round_ties_even() as i32
}
