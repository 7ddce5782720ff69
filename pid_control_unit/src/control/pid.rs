//! PID engine with two interchangeable computation variants.
//!
//! - **Normalized** (variant A): the clamped error is remapped onto
//!   `[-1, 1]`, the integral is `ki * Σ(dt · error)`, the derivative is
//!   `kd · Δerror / dt`, the sum is clamped to `[-1, 1]`, remapped onto
//!   `[out_min, out_max]` and `feedforward` is added afterwards. The output
//!   may therefore leave `[out_min, out_max]` by up to `|feedforward|`.
//! - **RawError** (variant B): the clamped error is used as is, the integral
//!   `i_out += ki · error` only advances on a tick whose measured period is
//!   within [`INTEGRAL_PERIOD_TOLERANCE`] of `1 / compute_hz`, the
//!   derivative `kd · Δerror` is not divided by `dt`, and
//!   `p + i + d + feedforward` is clamped to `[out_min, out_max]`.
//!
//! Both variants skip the derivative when `|dt| <= DERIVATIVE_DT_EPSILON`.
//! Time is passed in explicitly so a step is a pure function of
//! `(state, config, error, now)`.

use std::time::Instant;

use pid_common::config::ConfigError;
use pid_common::consts::{
    DERIVATIVE_DT_EPSILON, INTEGRAL_PERIOD_TOLERANCE, NORMALIZED_MAX, NORMALIZED_MIN,
};
use pid_common::pid::{PidConfig, PidVariant, StepSnapshot};

use super::scale::{clamp_value, remap_value};
use crate::error::StepFault;

/// Running state, mutated only by [`PidEngine::step`] and zeroed by
/// [`PidEngine::reset`].
#[derive(Debug, Clone, Copy)]
pub struct PidState {
    /// Σ(dt · error), variant A only.
    err_sum: f64,
    /// Error used by the previous step.
    pre_error: f64,
    /// Instant of the previous step or reset.
    last_update: Instant,
    p_out: f64,
    /// Variant B keeps its integral accumulator here.
    i_out: f64,
    d_out: f64,
    output: f64,
    error: f64,
    dt: f64,
    /// Publications (steps + resets) since construction.
    seq: u64,
}

impl PidState {
    fn new(now: Instant) -> Self {
        Self {
            err_sum: 0.0,
            pre_error: 0.0,
            last_update: now,
            p_out: 0.0,
            i_out: 0.0,
            d_out: 0.0,
            output: 0.0,
            error: 0.0,
            dt: 0.0,
            seq: 0,
        }
    }

    /// Σ(dt · error) accumulated by variant A.
    #[inline]
    pub fn err_sum(&self) -> f64 {
        self.err_sum
    }

    /// Error used by the previous step.
    #[inline]
    pub fn pre_error(&self) -> f64 {
        self.pre_error
    }

    /// Instant of the previous step or reset.
    #[inline]
    pub fn last_update(&self) -> Instant {
        self.last_update
    }

    /// Every numeric field, accumulator included, is finite.
    fn is_finite(&self) -> bool {
        [
            self.err_sum,
            self.pre_error,
            self.p_out,
            self.i_out,
            self.d_out,
            self.output,
            self.error,
            self.dt,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    fn snapshot(&self) -> StepSnapshot {
        StepSnapshot {
            output: self.output,
            p_out: self.p_out,
            i_out: self.i_out,
            d_out: self.d_out,
            dt: self.dt,
            error: self.error,
            seq: self.seq,
        }
    }
}

/// One engine: validated config, selected variant, running state.
#[derive(Debug, Clone)]
pub struct PidEngine {
    config: PidConfig,
    variant: PidVariant,
    state: PidState,
}

impl PidEngine {
    /// Build an engine and put it in its reset state at `now`.
    pub fn new(config: PidConfig, variant: PidVariant, now: Instant) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            config,
            variant,
            state: PidState::new(now),
        };
        engine.reset(now);
        Ok(engine)
    }

    /// Replace the configuration. An invalid config is rejected and the
    /// previous one stays in effect. Running sums are kept.
    pub fn configure(&mut self, config: PidConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    #[inline]
    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    #[inline]
    pub fn variant(&self) -> PidVariant {
        self.variant
    }

    #[inline]
    pub fn state(&self) -> &PidState {
        &self.state
    }

    /// Current outputs as a publishable snapshot.
    #[inline]
    pub fn snapshot(&self) -> StepSnapshot {
        self.state.snapshot()
    }

    /// Zero accumulators and the previous error, restore the variant's
    /// default output and stamp `last_update = now`.
    ///
    /// The terms are published as zero terms in the variant's display
    /// scale: the output midpoint for Normalized, `0` for RawError.
    pub fn reset(&mut self, now: Instant) -> StepSnapshot {
        let (zero_term, output) = match self.variant {
            PidVariant::Normalized => (
                self.to_output_scale(0.0),
                self.config.feedforward + self.config.out_min,
            ),
            PidVariant::RawError { out_default } => (0.0, out_default),
        };

        let s = &mut self.state;
        s.err_sum = 0.0;
        s.pre_error = 0.0;
        s.p_out = zero_term;
        s.i_out = zero_term;
        s.d_out = zero_term;
        s.error = 0.0;
        s.dt = 0.0;
        s.last_update = now;
        s.output = output;
        s.seq += 1;
        s.snapshot()
    }

    /// Compute one control step for `error` at `now`.
    ///
    /// On `Err` nothing is committed.
    pub fn step(&mut self, error: f64, now: Instant) -> Result<StepSnapshot, StepFault> {
        if !error.is_finite() {
            return Err(StepFault::NonFiniteError { value: error });
        }

        let dt = now
            .saturating_duration_since(self.state.last_update)
            .as_secs_f64();

        let next = match self.variant {
            PidVariant::Normalized => self.compute_normalized(error, dt),
            PidVariant::RawError { .. } => self.compute_raw_error(error, dt),
        };

        if !next.is_finite() {
            return Err(StepFault::NonFiniteOutput);
        }

        self.state = PidState {
            last_update: now,
            pre_error: next.error,
            seq: self.state.seq + 1,
            ..next
        };
        Ok(self.state.snapshot())
    }

    fn compute_normalized(&self, error: f64, dt: f64) -> PidState {
        let c = &self.config;
        let prev = &self.state;

        let error = clamp_value(error, c.err_min, c.err_max);
        let error = remap_value(error, c.err_min, c.err_max, NORMALIZED_MIN, NORMALIZED_MAX);

        let p_term = error * c.kp;

        let err_sum = prev.err_sum + dt * error;
        let i_term = c.ki * err_sum;

        let d_term = if dt.abs() > DERIVATIVE_DT_EPSILON {
            c.kd * (error - prev.pre_error) / dt
        } else {
            0.0
        };

        let raw = clamp_value(p_term + i_term + d_term, NORMALIZED_MIN, NORMALIZED_MAX);
        let output = c.feedforward + self.to_output_scale(raw);

        PidState {
            err_sum,
            p_out: self.to_output_scale(p_term),
            i_out: self.to_output_scale(i_term),
            d_out: self.to_output_scale(d_term),
            output,
            error,
            dt,
            ..*prev
        }
    }

    fn compute_raw_error(&self, error: f64, dt: f64) -> PidState {
        let c = &self.config;
        let prev = &self.state;

        let error = clamp_value(error, c.err_min, c.err_max);

        let p_out = error * c.kp;

        // Off-nominal ticks (missed wakeup, long previous step) leave the
        // integral untouched.
        let i_out = if (dt - c.nominal_period()).abs() < INTEGRAL_PERIOD_TOLERANCE {
            prev.i_out + c.ki * error
        } else {
            prev.i_out
        };

        // Not divided by dt, unlike the normalized variant.
        let d_out = if dt.abs() > DERIVATIVE_DT_EPSILON {
            c.kd * (error - prev.pre_error)
        } else {
            prev.d_out
        };

        let output = clamp_value(p_out + i_out + d_out + c.feedforward, c.out_min, c.out_max);

        PidState {
            p_out,
            i_out,
            d_out,
            output,
            error,
            dt,
            ..*prev
        }
    }

    #[inline]
    fn to_output_scale(&self, normalized: f64) -> f64 {
        remap_value(
            normalized,
            NORMALIZED_MIN,
            NORMALIZED_MAX,
            self.config.out_min,
            self.config.out_max,
        )
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
