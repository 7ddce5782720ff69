//! Numeric constants shared by the engine, the loop and the host adapter.

/// Smallest `|dt|` [s] for which the derivative term is computed.
///
/// Below it the derivative is skipped (treated as zero).
pub const DERIVATIVE_DT_EPSILON: f64 = 1e-4;

/// Maximum deviation [s] of the measured period from `1 / compute_hz` for
/// which the raw-error variant accumulates its integral term.
pub const INTEGRAL_PERIOD_TOLERANCE: f64 = 0.01;

/// Default compute frequency [Hz].
pub const DEFAULT_COMPUTE_HZ: f64 = 10.0;

/// Shortest background sleep period [ms].
///
/// `floor(1000 / compute_hz)` reaches zero above 1 kHz; the loop never
/// sleeps less than this.
pub const MIN_PERIOD_MS: u64 = 1;

/// Name given to the background compute thread.
pub const LOOP_THREAD_NAME: &str = "pid_processor";

/// Lower bound of the normalized error / output range (variant A).
pub const NORMALIZED_MIN: f64 = -1.0;

/// Upper bound of the normalized error / output range (variant A).
pub const NORMALIZED_MAX: f64 = 1.0;
