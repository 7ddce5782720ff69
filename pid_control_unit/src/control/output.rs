//! Two-byte output word for serial actuator links.
//!
//! The output is rounded half-to-even to an integer and its low 16 bits are
//! sent high byte first. Values outside `0..=65535` wrap.

use pid_common::pid::to_display_int;

/// Encode `output` as `[high, low]`.
#[inline]
pub fn encode_output_word(output: f64) -> [u8; 2] {
    let value = to_display_int(output);
    ((value & 0xffff) as u16).to_be_bytes()
}
