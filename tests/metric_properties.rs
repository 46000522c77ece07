//! Property-based tests for the error metrics and differencing.
//!
//! Run with: cargo test --test metric_properties

use element_verify::fd::{directional_derivative, max_error, max_rel_error};
use element_verify::{VerificationConfig, VerifyResult};
use num_complex::Complex64;
use proptest::prelude::*;

/// Two arrays of equal, nonzero length
fn arb_pair() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1usize..40).prop_flat_map(|n| {
        (
            prop::collection::vec(-1e3..1e3f64, n),
            prop::collection::vec(-1e3..1e3f64, n),
        )
    })
}

proptest! {
    #[test]
    fn self_comparison_is_exact(a in prop::collection::vec(-1e6..1e6f64, 1..50)) {
        prop_assert_eq!(max_error(&a, &a).unwrap().value, 0.0);
        prop_assert_eq!(max_rel_error(&a, &a).unwrap().value, 0.0);
    }

    #[test]
    fn max_error_is_symmetric((a, b) in arb_pair()) {
        let ab = max_error(&a, &b).unwrap();
        let ba = max_error(&b, &a).unwrap();
        prop_assert_eq!(ab.value, ba.value);
        prop_assert_eq!(ab.index, ba.index);
    }

    #[test]
    fn index_is_valid_and_achieves_max((a, b) in arb_pair()) {
        let e = max_error(&a, &b).unwrap();
        prop_assert!(e.index < a.len());
        prop_assert_eq!((a[e.index] - b[e.index]).abs(), e.value);
        for (x, y) in a.iter().zip(&b) {
            prop_assert!((x - y).abs() <= e.value);
        }

        let r = max_rel_error(&a, &b).unwrap();
        prop_assert!(r.index < a.len());
        prop_assert!(r.value.is_finite());
    }

    #[test]
    fn quadratic_gradient_is_reproduced(v in prop::collection::vec(-2.0..2.0f64, 1..12), seed in any::<u64>()) {
        use element_verify::fd::{generate_random_vec, RandomSource};

        let mut rng = RandomSource::seeded(seed);
        let p: Vec<f64> = generate_random_vec(&mut rng, v.len());
        let exact: f64 = 2.0 * v.iter().zip(&p).map(|(x, y)| x * y).sum::<f64>();
        let f = |x: &[f64]| -> VerifyResult<Vec<f64>> { Ok(vec![x.iter().map(|xi| xi * xi).sum::<f64>()]) };

        let real = directional_derivative(&v, &p, 1e-6, f).unwrap();
        prop_assert!((real[0] - exact).abs() < 1e-7);

        let cv: Vec<Complex64> = v.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        let cp: Vec<Complex64> = p.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        let g = |x: &[Complex64]| -> VerifyResult<Vec<Complex64>> {
            Ok(vec![x.iter().map(|xi| xi * xi).sum::<Complex64>()])
        };
        let complex = directional_derivative(&cv, &cp, 1e-30, g).unwrap();
        prop_assert!((complex[0].re - exact).abs() < 1e-12);
    }

    #[test]
    fn config_round_trips_through_toml(dh in 1e-30..1e-2f64, tol in 0.0..1.0f64, seed in 0u64..1_000_000, level in 0u8..3) {
        let mut config = VerificationConfig::quiet().with_step(dh).with_tolerances(tol, tol).with_seed(seed);
        config.print_level = level.try_into().unwrap();

        let text = toml::to_string(&config).unwrap();
        let parsed = VerificationConfig::from_toml_str(&text).unwrap();
        prop_assert_eq!(parsed, config);
    }
}
