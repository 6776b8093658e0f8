//! Time-to-recovery model.

/// Probability that a recovery needing `recovery_duration` seconds completes
/// within `ttg` seconds.
///
/// Zero when there is no margin (`ttg <= recovery_duration`), otherwise
/// `exp(-recovery_duration / ttg)`: rises towards 1 as TTG grows relative to
/// the duration. An exponential proxy, not a fitted completion-time curve.
#[must_use]
pub fn recovery_probability(ttg: f64, recovery_duration: f64) -> f64 {
    if ttg <= recovery_duration {
        return 0.0;
    }
    (-recovery_duration / ttg).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_margin_means_no_recovery() {
        assert_eq!(recovery_probability(50.0, 50.0), 0.0);
        assert_eq!(recovery_probability(10.0, 50.0), 0.0);
        assert_eq!(recovery_probability(0.0, 0.0), 0.0);
    }

    #[test]
    fn half_margin_value() {
        let p = recovery_probability(100.0, 50.0);
        assert!((p - (-0.5f64).exp()).abs() < 1e-15);
        assert!((p - 0.6065).abs() < 1e-4);
    }

    #[test]
    fn instantaneous_recovery_is_certain_once_time_remains() {
        assert_eq!(recovery_probability(1e-9, 0.0), 1.0);
    }

    proptest! {
        #[test]
        fn zero_whenever_ttg_within_duration(d in 0.0f64..1e5, frac in 0.0f64..=1.0) {
            prop_assert_eq!(recovery_probability(d * frac, d), 0.0);
        }

        #[test]
        fn stays_in_unit_interval(ttg in 0.0f64..1e7, d in 0.0f64..1e5) {
            let p = recovery_probability(ttg, d);
            prop_assert!((0.0..=1.0).contains(&p));
        }

        #[test]
        fn non_decreasing_in_ttg(a in 0.0f64..1e5, b in 0.0f64..1e5, d in 0.0f64..1e4) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(recovery_probability(lo, d) <= recovery_probability(hi, d));
        }

        #[test]
        fn approaches_one_for_large_ttg(d in 0.0f64..1e3) {
            prop_assert!(recovery_probability(d * 1e9 + 1.0, d) > 1.0 - 1e-6);
        }
    }
}
