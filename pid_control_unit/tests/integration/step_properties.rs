//! Output bounds and input clamping over generated configs and errors.

use std::time::{Duration, Instant};

use pid_common::pid::{PidConfig, PidVariant};
use pid_control_unit::control::pid::PidEngine;
use proptest::prelude::*;

fn config_strategy() -> impl Strategy<Value = PidConfig> {
    (
        -50.0..50.0f64,
        -5.0..5.0f64,
        -5.0..5.0f64,
        -20.0..20.0f64,
        -100.0..0.0f64,
        0.1..100.0f64,
        -100.0..100.0f64,
        0.1..200.0f64,
        1.0..100.0f64,
    )
        .prop_map(
            |(kp, ki, kd, feedforward, err_min, err_span, out_min, out_span, compute_hz)| {
                PidConfig {
                    kp,
                    ki,
                    kd,
                    feedforward,
                    err_min,
                    err_max: err_min + err_span,
                    out_min,
                    out_max: out_min + out_span,
                    compute_hz,
                }
            },
        )
}

fn error_sequence() -> impl Strategy<Value = Vec<(f64, u64)>> {
    prop::collection::vec((-1e6..1e6f64, 0u64..500), 1..20)
}

/// Run `errors` (value, ms since previous step) and return every snapshot.
fn run(
    cfg: PidConfig,
    variant: PidVariant,
    errors: &[(f64, u64)],
) -> Vec<pid_common::pid::StepSnapshot> {
    let t0 = Instant::now();
    let mut engine = PidEngine::new(cfg, variant, t0).unwrap();
    let mut now = t0;
    errors
        .iter()
        .map(|&(error, gap_ms)| {
            now += Duration::from_millis(gap_ms);
            engine.step(error, now).unwrap()
        })
        .collect()
}

proptest! {
    #[test]
    fn raw_error_output_always_within_limits(cfg in config_strategy(), errors in error_sequence()) {
        for snap in run(cfg, PidVariant::RawError { out_default: 0.0 }, &errors) {
            prop_assert!(snap.output >= cfg.out_min && snap.output <= cfg.out_max,
                "output {} outside [{}, {}]", snap.output, cfg.out_min, cfg.out_max);
        }
    }

    #[test]
    fn normalized_output_within_feedforward_shifted_limits(cfg in config_strategy(), errors in error_sequence()) {
        let tol = 1e-9 * (cfg.out_max - cfg.out_min).abs().max(1.0);
        let lo = cfg.feedforward + cfg.out_min - tol;
        let hi = cfg.feedforward + cfg.out_max + tol;
        for snap in run(cfg, PidVariant::Normalized, &errors) {
            prop_assert!(snap.output >= lo && snap.output <= hi,
                "output {} outside [{}, {}]", snap.output, lo, hi);
        }
    }

    #[test]
    fn error_beyond_range_behaves_like_the_bound(cfg in config_strategy(), excess in 0.0..1e6f64, gap in 0u64..500) {
        for variant in [PidVariant::Normalized, PidVariant::RawError { out_default: 0.0 }] {
            let high = run(cfg, variant, &[(cfg.err_max + excess, gap)]);
            let at_max = run(cfg, variant, &[(cfg.err_max, gap)]);
            prop_assert_eq!(high[0].output, at_max[0].output);

            let low = run(cfg, variant, &[(cfg.err_min - excess, gap)]);
            let at_min = run(cfg, variant, &[(cfg.err_min, gap)]);
            prop_assert_eq!(low[0].output, at_min[0].output);
        }
    }
}
