//! Common re-exports: `use pid_common::prelude::*;`.

pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::consts::{DERIVATIVE_DT_EPSILON, INTEGRAL_PERIOD_TOLERANCE};
pub use crate::pid::{HostInputs, HostOutputs, PidConfig, PidVariant, StepSnapshot};
