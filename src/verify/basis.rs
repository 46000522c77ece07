/// Basis-function derivative self-check
///
/// Parametric derivatives ∂N_j/∂ξ_i are compared with central differences
/// of the shape functions at a random interior point and at every
/// quadrature point of the basis. Basis values are real, so this check is
/// always a real central difference.

use tracing::debug;

use super::{VerificationReport, Verifier};
use crate::element::ElementBasis;
use crate::error::{ensure_len, VerifyError, VerifyResult};
use crate::fd::{approximate_derivative, generate_random_vec, perturb, ErrorSummary};
use crate::scalar::Scalar;
use std::io::Write;

/// Analytic and differenced parametric derivatives at one point
fn basis_derivatives<B: ElementBasis + ?Sized>(
    basis: &B,
    pt: &[f64],
    dh: f64,
) -> VerifyResult<(Vec<f64>, Vec<f64>)> {
    let num_params = basis.num_params();
    let num_nodes = basis.num_nodes();

    let mut n = vec![0.0; num_nodes];
    let mut nxi = vec![0.0; num_params * num_nodes];
    basis.compute_basis_gradient(pt, &mut n, &mut nxi);

    let mut fd = vec![0.0; num_params * num_nodes];
    let mut unit = vec![0.0; num_params];
    let mut shifted = vec![0.0; num_params];
    for i in 0..num_params {
        unit[i] = 1.0;
        let dn = approximate_derivative(dh, |side| {
            perturb(side, &mut shifted, pt, &unit, dh)?;
            let mut values = vec![0.0; num_nodes];
            basis.compute_basis(&shifted, &mut values);
            Ok(values)
        })?;
        unit[i] = 0.0;

        for (j, d) in dn.into_iter().enumerate() {
            fd[num_params * j + i] = d;
        }
    }

    Ok((nxi, fd))
}

impl<W: Write> Verifier<W> {
    /// Check the basis parametric derivatives at every evaluation point
    ///
    /// Each point is gated on its own. The first failing point is reported
    /// and dumped; when every point passes, the worst one is reported.
    pub fn element_basis<B: ElementBasis + ?Sized>(
        &mut self,
        basis: &B,
    ) -> VerifyResult<VerificationReport> {
        let num_params = basis.num_params();
        if num_params == 0 || basis.num_nodes() == 0 {
            return Err(VerifyError::EmptyInput("basis"));
        }
        let dh = self.config.dh;

        let mut random_pt: Vec<f64> = generate_random_vec(&mut self.rng, num_params);
        basis.clamp_point(&mut random_pt);
        let mut points = vec![random_pt];
        points.extend(basis.quadrature_points());
        debug!(basis = basis.name(), dh, points = points.len(), "checking basis derivatives");

        let mut worst: Option<(ErrorSummary, Vec<f64>, Vec<f64>)> = None;
        let mut failure: Option<(ErrorSummary, Vec<f64>, Vec<f64>)> = None;
        for pt in &points {
            ensure_len("parametric point", num_params, pt.len())?;
            let (analytic, fd) = basis_derivatives(basis, pt, dh)?;
            let summary = ErrorSummary::compare(&analytic, &fd)?;
            if summary.fails(&self.config) {
                debug!(basis = basis.name(), point = ?pt, "basis point failed");
                failure = Some((summary, analytic, fd));
                break;
            }
            let replace = match &worst {
                Some((w, _, _)) => summary.is_worse_than(w),
                None => true,
            };
            if replace {
                worst = Some((summary, analytic, fd));
            }
        }

        let (summary, analytic, fd) = match failure.or(worst) {
            Some(point) => point,
            None => return Err(VerifyError::EmptyInput("basis evaluation points")),
        };
        let report = self.finish("dN/dp", basis.name(), f64::MODE, summary, None);
        self.write_report(&report, &analytic, &fd)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VerificationConfig;
    use crate::config::{FailurePolicy, PrintLevel};
    use crate::fem::{LagrangeLineBasis, Tet10Basis};

    /// One shape function N = a ξ + b ξ² on [-1, 1] with slope 1e3 at
    /// ξ = 0.5 and 1e-2 at ξ = -0.5. The reported derivative is off by
    /// 1e-3 for ξ > 0 and by 1e-4 for ξ < 0.
    struct SkewedSlopeBasis;

    const A: f64 = 500.005;
    const B: f64 = 499.995;

    impl ElementBasis for SkewedSlopeBasis {
        fn name(&self) -> &str {
            "SkewedSlopeBasis"
        }

        fn num_params(&self) -> usize {
            1
        }

        fn num_nodes(&self) -> usize {
            1
        }

        fn compute_basis(&self, pt: &[f64], n: &mut [f64]) {
            n[0] = A * pt[0] + B * pt[0] * pt[0];
        }

        fn compute_basis_gradient(&self, pt: &[f64], n: &mut [f64], nxi: &mut [f64]) {
            self.compute_basis(pt, n);
            let offset = if pt[0] > 0.0 { 1e-3 } else { 1e-4 };
            nxi[0] = A + 2.0 * B * pt[0] + offset;
        }

        fn quadrature_points(&self) -> Vec<Vec<f64>> {
            vec![vec![-0.5]]
        }

        // Every random point lands on ξ = 0.5
        fn clamp_point(&self, pt: &mut [f64]) {
            pt[0] = 0.5;
        }
    }

    fn skewed_config() -> VerificationConfig {
        VerificationConfig::quiet().with_step(1e-4).with_tolerances(1e-5, 1e-5)
    }

    #[test]
    fn test_failing_point_not_hidden_by_larger_error() {
        // ξ = 0.5 exceeds only the absolute gate; ξ = -0.5 exceeds both
        let config = skewed_config().with_print_level(PrintLevel::Full);
        let mut verifier = Verifier::with_sink(config, Vec::new()).unwrap();
        let report = verifier.element_basis(&SkewedSlopeBasis).unwrap();

        assert!(!report.passed(), "{}", report);
        assert!((report.summary.abs.value - 1e-4).abs() < 1e-7);
        assert!(report.summary.rel.value > 1e-3);

        // The dump shows the failing point (analytic slope 1.01e-2)
        let text = String::from_utf8(verifier.into_sink()).unwrap();
        assert!(text.contains("1.010000e-2"), "{}", text);
    }

    #[test]
    fn test_either_policy_fails_on_first_point() {
        let config = skewed_config().with_failure_policy(FailurePolicy::Either);
        let mut verifier = Verifier::with_sink(config, Vec::new()).unwrap();
        let report = verifier.element_basis(&SkewedSlopeBasis).unwrap();

        assert!(!report.passed());
        assert!((report.summary.abs.value - 1e-3).abs() < 1e-6);
    }

    #[test]
    fn test_worst_point_reported_when_all_pass() {
        let config = VerificationConfig::quiet().with_step(1e-4).with_tolerances(1e-2, 1.0);
        let mut verifier = Verifier::with_sink(config, Vec::new()).unwrap();
        let report = verifier.element_basis(&SkewedSlopeBasis).unwrap();

        assert!(report.passed(), "{}", report);
        assert!((report.summary.abs.value - 1e-3).abs() < 1e-6);
    }

    #[test]
    fn test_tet10_passes() {
        let mut verifier = Verifier::with_sink(VerificationConfig::quiet(), Vec::new()).unwrap();
        let report = verifier.element_basis(&Tet10Basis).unwrap();
        assert!(report.passed(), "{}", report);
        assert_eq!(report.check, "dN/dp");
    }

    #[test]
    fn test_lagrange_passes() {
        let mut verifier = Verifier::with_sink(VerificationConfig::quiet(), Vec::new()).unwrap();
        for order in 1..=4 {
            let report = verifier.element_basis(&LagrangeLineBasis::new(order)).unwrap();
            assert!(report.passed(), "order {}: {}", order, report);
        }
    }
}
