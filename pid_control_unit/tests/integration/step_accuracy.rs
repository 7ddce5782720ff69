//! Deterministic multi-step runs with explicit timestamps.

use std::time::{Duration, Instant};

use pid_common::pid::{PidConfig, PidVariant};
use pid_control_unit::control::pid::PidEngine;
use pid_control_unit::sim::{MotorPlant, SimulationConfig};

fn pi_config() -> PidConfig {
    PidConfig {
        kp: 4.0,
        ki: 0.05,
        kd: 0.0,
        feedforward: 0.0,
        err_min: -20.0,
        err_max: 20.0,
        out_min: -50.0,
        out_max: 50.0,
        compute_hz: 20.0,
    }
}

/// Run the engine against the plant on the given tick schedule [ms].
fn run(engine: &mut PidEngine, plant: &mut MotorPlant, setpoint: f64, ticks_ms: &[u64], t0: Instant) {
    let mut last_ms = 0;
    for &ms in ticks_ms {
        let error = setpoint - plant.position;
        let snap = engine.step(error, t0 + Duration::from_millis(ms)).unwrap();
        plant.advance(snap.output, (ms - last_ms) as f64 / 1000.0);
        last_ms = ms;
    }
}

#[test]
fn raw_error_converges_on_nominal_schedule() {
    let t0 = Instant::now();
    let mut engine =
        PidEngine::new(pi_config(), PidVariant::RawError { out_default: 0.0 }, t0).unwrap();
    let mut plant = MotorPlant::new(&SimulationConfig::default());
    let ticks: Vec<u64> = (1..=400).map(|i| i * 50).collect();

    run(&mut engine, &mut plant, 10.0, &ticks, t0);
    assert!((plant.position - 10.0).abs() < 0.1, "position {}", plant.position);
}

#[test]
fn raw_error_integral_frozen_on_jittered_ticks() {
    let t0 = Instant::now();
    let cfg = PidConfig {
        kp: 0.0,
        ki: 1.0,
        ..pi_config()
    };
    let mut engine = PidEngine::new(cfg, PidVariant::RawError { out_default: 0.0 }, t0).unwrap();

    // Nominal period 50 ms; 45 and 58 are within 10 ms, 75 and 200 are not.
    let schedule = [(50, true), (95, true), (170, false), (228, true), (428, false)];
    let mut expected = 0.0;
    for (ms, accumulates) in schedule {
        let snap = engine.step(1.0, t0 + Duration::from_millis(ms)).unwrap();
        if accumulates {
            expected += 1.0;
        }
        assert_eq!(snap.i_out, expected, "tick at {ms} ms");
    }
}

#[test]
fn normalized_integral_accounts_for_jitter() {
    let t0 = Instant::now();
    let cfg = PidConfig {
        kp: 0.0,
        ki: 1.0,
        err_min: -1.0,
        err_max: 1.0,
        out_min: -100.0,
        out_max: 100.0,
        ..pi_config()
    };
    let mut engine = PidEngine::new(cfg, PidVariant::Normalized, t0).unwrap();

    // err_sum = Σ dt · 0.5 regardless of how regular the ticks were.
    for ms in [50, 95, 170, 228, 428] {
        engine.step(0.5, t0 + Duration::from_millis(ms)).unwrap();
    }
    assert!((engine.state().err_sum() - 0.214).abs() < 1e-12);
    // i_term 0.214 → [-100, 100] scale.
    assert!((engine.snapshot().output - 21.4).abs() < 1e-9);
}

#[test]
fn derivative_discrepancy_between_variants() {
    // Same Δerror over the same 0.5 s: the normalized variant divides by dt,
    // the raw-error variant does not.
    let t0 = Instant::now();
    let cfg = PidConfig {
        kp: 0.0,
        ki: 0.0,
        kd: 1.0,
        err_min: -1.0,
        err_max: 1.0,
        out_min: -1.0,
        out_max: 1.0,
        ..pi_config()
    };
    let mut a = PidEngine::new(cfg, PidVariant::Normalized, t0).unwrap();
    let mut b = PidEngine::new(cfg, PidVariant::RawError { out_default: 0.0 }, t0).unwrap();

    let t = t0 + Duration::from_millis(500);
    let sa = a.step(0.25, t).unwrap();
    let sb = b.step(0.25, t).unwrap();
    assert!((sa.d_out - 0.5).abs() < 1e-12);
    assert!((sb.d_out - 0.25).abs() < 1e-12);
}
