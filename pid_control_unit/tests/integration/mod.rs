mod lifecycle;
mod step_accuracy;
mod step_properties;

use std::time::{Duration, Instant};

use pid_control_unit::cycle::PidPort;

/// Poll until `cond` holds or five seconds pass.
pub fn wait_until(port: &PidPort, what: &str, cond: impl Fn(&PidPort) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond(port) {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        std::thread::sleep(Duration::from_millis(2));
    }
}
