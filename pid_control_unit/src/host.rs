//! Host adapter: one solve cycle of the host that drives a controller.
//!
//! Each cycle the host writes the whole config and the current error, maps
//! its `enable` flag onto Enable / Disable and its `reset` flag onto Reset,
//! then reads back whatever the compute thread last published. The host
//! cadence has no fixed relation to `compute_hz`.

use pid_common::pid::{HostInputs, HostOutputs, PidVariant, StepSnapshot};
use tracing::debug;

use crate::cycle::LoopController;
use crate::error::HostError;
use crate::publish::StatusReport;

/// Lazily creates its controller on the first solve.
#[derive(Debug)]
pub struct HostAdapter {
    variant: PidVariant,
    controller: Option<LoopController>,
}

impl HostAdapter {
    pub fn new(variant: PidVariant) -> Self {
        Self {
            variant,
            controller: None,
        }
    }

    /// Run one host cycle.
    ///
    /// An invalid config is reported and leaves the controller (and its
    /// running state) untouched.
    pub fn solve(&mut self, inputs: &HostInputs) -> Result<HostOutputs, HostError> {
        let controller = match self.controller.take() {
            Some(controller) => controller,
            None => {
                debug!(variant = self.variant.name(), "creating controller on first solve");
                LoopController::new(inputs.config, self.variant)?
            }
        };
        let controller = self.controller.insert(controller);

        controller.configure(inputs.config)?;
        controller.set_error(inputs.error);

        if inputs.enable {
            controller.enable()?;
        } else {
            controller.disable()?;
        }
        if inputs.reset {
            controller.reset();
        }

        Ok(HostOutputs::from_snapshot(&controller.snapshot()))
    }

    /// Full-precision snapshot, if a controller exists.
    pub fn snapshot(&self) -> Option<StepSnapshot> {
        self.controller.as_ref().map(LoopController::snapshot)
    }

    pub fn status(&self) -> Option<StatusReport> {
        self.controller.as_ref().map(LoopController::status)
    }

    pub fn is_enabled(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(LoopController::is_enabled)
    }

    /// Disable and drop the controller.
    pub fn shutdown(&mut self) -> Result<(), HostError> {
        if let Some(mut controller) = self.controller.take() {
            controller.disable()?;
        }
        Ok(())
    }
}
