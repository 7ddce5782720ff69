//! Simulated motor axis for closing the loop without hardware.
//!
//! `velocity += (gain · (command − neutral) − velocity) · dt / τ`
//! `position += velocity · dt`

use std::time::Duration;

use pid_common::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Host / plant parameters for a simulated run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Target position; `error = setpoint − position`.
    #[serde(default = "default_setpoint")]
    pub setpoint: f64,
    /// Host solve rate [Hz], independent of `compute_hz`.
    #[serde(default = "default_host_hz")]
    pub host_hz: f64,
    /// Velocity per unit of command at steady state.
    #[serde(default = "default_plant_gain")]
    pub plant_gain: f64,
    /// Velocity time constant τ [s].
    #[serde(default = "default_time_constant")]
    pub time_constant: f64,
    /// Command at which the motor stands still.
    #[serde(default)]
    pub neutral_command: f64,
}

fn default_setpoint() -> f64 {
    10.0
}

fn default_host_hz() -> f64 {
    30.0
}

fn default_plant_gain() -> f64 {
    0.5
}

fn default_time_constant() -> f64 {
    0.2
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            setpoint: default_setpoint(),
            host_hz: default_host_hz(),
            plant_gain: default_plant_gain(),
            time_constant: default_time_constant(),
            neutral_command: 0.0,
        }
    }
}

impl SimulationConfig {
    /// Host solve period, `1 / host_hz`.
    ///
    /// Fails when `host_hz` is not positive or the period does not fit a
    /// [`Duration`].
    pub fn host_period(&self) -> Result<Duration, ConfigError> {
        if !(self.host_hz.is_finite() && self.host_hz > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "simulation.host_hz must be > 0, got {}",
                self.host_hz
            )));
        }
        Duration::try_from_secs_f64(1.0 / self.host_hz).map_err(|e| {
            ConfigError::ValidationError(format!(
                "simulation.host_hz = {} gives an unusable period: {e}",
                self.host_hz
            ))
        })
    }
}

/// First-order velocity response integrated to a position.
#[derive(Debug, Clone, Copy)]
pub struct MotorPlant {
    pub position: f64,
    pub velocity: f64,
    gain: f64,
    time_constant: f64,
    neutral: f64,
}

impl MotorPlant {
    pub fn new(sim: &SimulationConfig) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            gain: sim.plant_gain,
            time_constant: sim.time_constant,
            neutral: sim.neutral_command,
        }
    }

    /// Advance by `dt` seconds under `command`.
    pub fn advance(&mut self, command: f64, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let target_velocity = self.gain * (command - self.neutral);
        // Clamp α so large host steps cannot overshoot the target velocity.
        let alpha = (dt / self.time_constant).min(1.0);
        self.velocity += (target_velocity - self.velocity) * alpha;
        self.position += self.velocity * dt;
    }
}
