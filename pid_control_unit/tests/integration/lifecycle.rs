//! Enable / Disable / Reset against a running compute thread.

use std::thread;
use std::time::Duration;

use pid_common::pid::{PidConfig, PidVariant};
use pid_control_unit::cycle::LoopController;
use pid_control_unit::error::StepFault;

use super::wait_until;

/// 100 Hz: 10 ms period, integral accumulates on every regular tick.
fn integrating_config() -> PidConfig {
    PidConfig {
        kp: 0.0,
        ki: 1.0,
        kd: 0.0,
        feedforward: 0.0,
        err_min: -10.0,
        err_max: 10.0,
        out_min: -1000.0,
        out_max: 1000.0,
        compute_hz: 100.0,
    }
}

#[test]
fn second_enable_neither_resets_nor_spawns() {
    let mut c = LoopController::new(integrating_config(), PidVariant::default()).unwrap();
    c.set_error(1.0);
    c.enable().unwrap();
    let port = c.port();
    wait_until(&port, "integral to build up", |p| p.snapshot().i_out >= 3.0);

    let before = c.snapshot();
    c.enable().unwrap();
    let after = c.snapshot();
    assert!(c.is_enabled());
    assert!(after.i_out >= before.i_out);
    assert!(after.seq >= before.seq);

    c.disable().unwrap();
}

#[test]
fn disable_right_after_enable_stops_stepping() {
    let mut c = LoopController::new(integrating_config(), PidVariant::default()).unwrap();
    c.enable().unwrap();
    c.disable().unwrap();

    let steps = c.status().steps;
    let seq = c.snapshot().seq;
    thread::sleep(Duration::from_millis(60));
    assert_eq!(c.status().steps, steps);
    assert_eq!(c.snapshot().seq, seq);
    assert!(!c.status().enabled);
}

#[test]
fn enable_after_disable_starts_fresh() {
    let mut c = LoopController::new(integrating_config(), PidVariant::default()).unwrap();
    c.set_error(2.0);
    c.enable().unwrap();
    let port = c.port();
    wait_until(&port, "integral to build up", |p| p.snapshot().i_out > 0.0);
    c.disable().unwrap();
    assert!(c.snapshot().i_out > 0.0);

    c.set_error(0.0);
    c.enable().unwrap();
    // Enable resets before the first tick; error 0 keeps the integral at 0.
    assert_eq!(c.snapshot().i_out, 0.0);
    wait_until(&port, "a step after re-enable", |p| p.status().steps > 0);
    c.disable().unwrap();
    assert_eq!(c.snapshot().i_out, 0.0);
}

#[test]
fn reset_while_enabled_zeroes_accumulators() {
    let mut c = LoopController::new(integrating_config(), PidVariant::default()).unwrap();
    c.set_error(1.0);
    c.enable().unwrap();
    let port = c.port();
    wait_until(&port, "integral to build up", |p| p.snapshot().i_out >= 2.0);

    let snap = c.reset();
    assert_eq!(snap.i_out, 0.0);
    assert_eq!(snap.output, 0.0);
    assert!(c.is_enabled());
    c.disable().unwrap();
}

#[test]
fn config_change_applies_without_restart() {
    let cfg = PidConfig {
        kp: 1.0,
        ki: 0.0,
        ..integrating_config()
    };
    let mut c = LoopController::new(cfg, PidVariant::default()).unwrap();
    c.set_error(2.0);
    c.enable().unwrap();
    let port = c.port();
    wait_until(&port, "output 2", |p| p.snapshot().output == 2.0);

    port.configure(PidConfig { kp: 3.0, ..cfg }).unwrap();
    wait_until(&port, "output 6", |p| p.snapshot().output == 6.0);
    assert!(c.is_enabled());
    c.disable().unwrap();
}

#[test]
fn invalid_config_is_rejected_before_the_loop_sees_it() {
    let mut c = LoopController::new(integrating_config(), PidVariant::default()).unwrap();
    c.enable().unwrap();
    let bad = PidConfig {
        compute_hz: 0.0,
        ..integrating_config()
    };
    assert!(c.configure(bad).is_err());
    assert_eq!(c.port().config(), integrating_config());
    c.disable().unwrap();
    assert_eq!(c.status().faults, 0);
}

#[test]
fn step_faults_are_surfaced_and_loop_survives() {
    let mut c = LoopController::new(integrating_config(), PidVariant::default()).unwrap();
    let port = c.port();
    c.set_error(f64::NAN);
    c.enable().unwrap();
    wait_until(&port, "a fault", |p| p.status().faults >= 2);

    let status = port.status();
    assert!(status.enabled);
    assert!(matches!(
        status.last_fault,
        Some(StepFault::NonFiniteError { .. })
    ));
    // Output stays at its last good value (the reset default).
    assert_eq!(port.snapshot().output, 0.0);

    c.set_error(1.0);
    wait_until(&port, "steps after recovery", |p| p.status().steps >= 2);
    c.disable().unwrap();
}

#[test]
fn independent_controllers_do_not_interact() {
    let cfg = PidConfig {
        kp: 1.0,
        ki: 0.0,
        ..integrating_config()
    };
    let mut a = LoopController::new(cfg, PidVariant::default()).unwrap();
    let mut b = LoopController::new(cfg, PidVariant::default()).unwrap();
    a.set_error(3.0);
    b.set_error(-4.0);
    a.enable().unwrap();
    b.enable().unwrap();

    wait_until(&a.port(), "a output", |p| p.snapshot().output == 3.0);
    wait_until(&b.port(), "b output", |p| p.snapshot().output == -4.0);

    a.disable().unwrap();
    assert!(b.is_enabled());
    b.disable().unwrap();
}
