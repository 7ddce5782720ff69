//! PID Common Library
//!
//! Shared types for the PID control unit workspace: the per-cycle
//! configuration snapshot written by the host, the per-step result snapshot
//! published by the engine, the host field contract and TOML config loading.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading trait, log level, config errors
//! - [`consts`] - Numeric constants shared by engine and host
//! - [`pid`] - `PidConfig`, `PidVariant`, `StepSnapshot`, host fields
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use pid_common::prelude::*;
//!
//! let cfg = PidConfig::default();
//! assert!(cfg.validate().is_ok());
//! ```

pub mod config;
pub mod consts;
pub mod pid;
pub mod prelude;
