//! Clamp and linear remap helpers.
//!
//! Callers guarantee `min < max` / `old_min < old_max`; `PidConfig::validate`
//! enforces it for every configured range.

/// Limit `value` to `[min, max]`.
///
/// Unlike `f64::clamp` this never panics; a NaN `value` passes through.
#[inline]
pub fn clamp_value(value: f64, min: f64, max: f64) -> f64 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Linearly map `value` from `[old_min, old_max]` onto `[new_min, new_max]`.
///
/// Values outside the source range extrapolate.
#[inline]
pub fn remap_value(value: f64, old_min: f64, old_max: f64, new_min: f64, new_max: f64) -> f64 {
    let fraction = (value - old_min) / (old_max - old_min);
    new_min + fraction * (new_max - new_min)
}
