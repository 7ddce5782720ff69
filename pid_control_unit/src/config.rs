//! Unit configuration file: `[shared]`, `[pid]`, `[variant]`, `[simulation]`.
//!
//! ```toml
//! [shared]
//! service_name = "pid-motor-01"
//! log_level = "info"
//!
//! [pid]
//! kp = 2.0
//! err_min = -20.0
//! err_max = 20.0
//! out_min = 0.0
//! out_max = 100.0
//! compute_hz = 20.0
//!
//! [variant]
//! mode = "raw_error"
//! out_default = 0.0
//! ```

use std::path::Path;

use pid_common::config::{ConfigError, ConfigLoader, SharedConfig};
use pid_common::pid::{PidConfig, PidVariant};
use serde::{Deserialize, Serialize};

use crate::sim::SimulationConfig;

/// Everything one control unit process needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PidUnitConfig {
    pub shared: SharedConfig,
    pub pid: PidConfig,
    #[serde(default)]
    pub variant: PidVariant,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl PidUnitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.pid.validate()?;

        let sim = &self.simulation;
        sim.host_period()?;
        if !(sim.time_constant.is_finite() && sim.time_constant > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "simulation.time_constant must be > 0, got {}",
                sim.time_constant
            )));
        }
        if !(sim.setpoint.is_finite() && sim.plant_gain.is_finite() && sim.neutral_command.is_finite())
        {
            return Err(ConfigError::ValidationError(
                "simulation values must be finite".to_string(),
            ));
        }
        if let PidVariant::RawError { out_default } = self.variant
            && !out_default.is_finite()
        {
            return Err(ConfigError::ValidationError(
                "variant.out_default must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load and validate a unit config file.
pub fn load_config(path: &Path) -> Result<PidUnitConfig, ConfigError> {
    let config = PidUnitConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a unit config from a TOML string.
pub fn load_config_from_str(content: &str) -> Result<PidUnitConfig, ConfigError> {
    let config = PidUnitConfig::load_str(content)?;
    config.validate()?;
    Ok(config)
}
