//! Control engine root.
//!
//! Clamp/remap helpers, the PID step in both computation variants, and the
//! output word encoding used by serial actuator links.

pub mod output;
pub mod pid;
pub mod scale;
