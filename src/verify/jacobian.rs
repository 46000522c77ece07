/// Jacobian check against differences of the residual
///
/// ```text
/// J p = α ∂R/∂q p + β ∂R/∂q̇ p + γ ∂R/∂q̈ p
///     ≈ d/dh R(q + α h p, q̇ + β h p, q̈ + γ h p)
/// ```
///
/// A single column k is isolated with p = e_k. The column sweep repeats this
/// for every column in parallel and reports the first one that fails.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use tracing::debug;

use super::{VerificationReport, Verifier};
use crate::element::{Element, ElementState, JacobianCoefficients};
use crate::error::{VerifyError, VerifyResult};
use crate::fd::{approximate_derivative, generate_random_vec, perturb, ErrorSummary, RandomSource};
use crate::scalar::{zeros, Scalar};
use std::io::Write;

/// Blending coefficients declared by the element, else random in [0, 1)
fn blending_coefficients<S, E>(element: &E, rng: &mut RandomSource) -> JacobianCoefficients
where
    S: Scalar,
    E: Element<S> + ?Sized,
{
    element.jacobian_coefficients().unwrap_or_else(|| {
        let alpha = rng.uniform(0.0, 1.0);
        let beta = rng.uniform(0.0, 1.0);
        let gamma = rng.uniform(0.0, 1.0);
        JacobianCoefficients::new(alpha, beta, gamma)
    })
}

fn unit_vector<S: Scalar>(n: usize, k: usize) -> Vec<S> {
    let mut e = zeros(n);
    e[k] = S::one();
    e
}

/// Analytic Jacobian blended with `coeffs`
fn analytic_jacobian<S, E>(
    element: &E,
    elem_index: usize,
    time: f64,
    coeffs: JacobianCoefficients,
    state: &ElementState<'_, S>,
) -> DMatrix<S>
where
    S: Scalar,
    E: Element<S> + ?Sized,
{
    let n = element.num_variables();
    let mut res = zeros(n);
    let mut mat = DMatrix::zeros(n, n);
    element.compute_jacobian(elem_index, time, coeffs, state, &mut res, &mut mat);
    mat
}

/// Finite-difference approximation of J p
fn jacobian_product<S, E>(
    element: &E,
    elem_index: usize,
    time: f64,
    coeffs: JacobianCoefficients,
    state: &ElementState<'_, S>,
    p: &[S],
    dh: f64,
) -> VerifyResult<Vec<S>>
where
    S: Scalar,
    E: Element<S> + ?Sized,
{
    let n = element.num_variables();
    let scaled = |c: f64| -> Vec<S> { p.iter().map(|&pi| pi * S::from_real(c)).collect() };
    let (p_alpha, p_beta, p_gamma) = (scaled(coeffs.alpha), scaled(coeffs.beta), scaled(coeffs.gamma));

    let mut q = zeros(n);
    let mut qdot = zeros(n);
    let mut qddot = zeros(n);
    approximate_derivative(dh, |side| {
        perturb(side, &mut q, state.vars, &p_alpha, dh)?;
        perturb(side, &mut qdot, state.dvars, &p_beta, dh)?;
        perturb(side, &mut qddot, state.ddvars, &p_gamma, dh)?;

        let mut res = zeros(n);
        element.compute_residual(elem_index, time, &state.with_vars(&q, &qdot, &qddot), &mut res);
        Ok(res)
    })
}

impl<W: Write> Verifier<W> {
    /// Check the Jacobian along a random direction, or column `col` when given
    pub fn element_jacobian<S, E>(
        &mut self,
        element: &E,
        elem_index: usize,
        time: f64,
        state: &ElementState<'_, S>,
        col: Option<usize>,
    ) -> VerifyResult<VerificationReport>
    where
        S: Scalar,
        E: Element<S> + ?Sized,
    {
        state.check(element)?;
        let n = element.num_variables();
        if let Some(k) = col.filter(|&k| k >= n) {
            return Err(VerifyError::ColumnOutOfRange { col: k, num_vars: n });
        }

        let dh = self.config.dh;
        let coeffs = blending_coefficients(element, &mut self.rng);
        debug!(
            element = element.name(),
            mode = S::MODE,
            dh,
            col = ?col,
            alpha = coeffs.alpha,
            beta = coeffs.beta,
            gamma = coeffs.gamma,
            "checking jacobian"
        );

        let p: Vec<S> = match col {
            Some(k) => unit_vector(n, k),
            None => generate_random_vec(&mut self.rng, n),
        };

        let mat = analytic_jacobian(element, elem_index, time, coeffs, state);
        let analytic = &mat * DVector::from_column_slice(&p);
        let fd = jacobian_product(element, elem_index, time, coeffs, state, &p, dh)?;

        self.conclude("K*u", element.name(), analytic.as_slice(), &fd)
    }

    /// Check every Jacobian column
    ///
    /// Columns are differenced in parallel with the same blending
    /// coefficients. The reported summary is the worst column; the first
    /// failing column, if any, is recorded in the report.
    pub fn element_jacobian_columns<S, E>(
        &mut self,
        element: &E,
        elem_index: usize,
        time: f64,
        state: &ElementState<'_, S>,
    ) -> VerifyResult<VerificationReport>
    where
        S: Scalar + Send + Sync,
        E: Element<S> + Sync + ?Sized,
    {
        state.check(element)?;
        let n = element.num_variables();
        if n == 0 {
            return Err(VerifyError::EmptyInput("element variables"));
        }

        let dh = self.config.dh;
        let coeffs = blending_coefficients(element, &mut self.rng);
        debug!(
            element = element.name(),
            mode = S::MODE,
            dh,
            columns = n,
            "checking jacobian columns"
        );

        let mat = analytic_jacobian(element, elem_index, time, coeffs, state);
        let columns: Vec<Vec<S>> = (0..n)
            .into_par_iter()
            .map(|k| {
                let p = unit_vector(n, k);
                jacobian_product(element, elem_index, time, coeffs, state, &p, dh)
            })
            .collect::<VerifyResult<_>>()?;

        let mut worst: Option<(usize, ErrorSummary)> = None;
        let mut first_failure: Option<usize> = None;
        for (k, fd) in columns.iter().enumerate() {
            let analytic: Vec<S> = mat.column(k).iter().copied().collect();
            let summary = ErrorSummary::compare(&analytic, fd)?;
            if first_failure.is_none() && summary.fails(&self.config) {
                first_failure = Some(k);
            }
            worst = Some(match worst {
                Some((w, ws)) if !summary.is_worse_than(&ws) => (w, ws),
                _ => (k, summary),
            });
        }

        let (worst_col, summary) = match worst {
            Some(w) => w,
            None => return Err(VerifyError::EmptyInput("element variables")),
        };
        let report = self.finish("K*u", element.name(), S::MODE, summary, first_failure);

        // Dump the first failing column, else the worst one
        let shown = first_failure.unwrap_or(worst_col);
        let analytic: Vec<S> = mat.column(shown).iter().copied().collect();
        self.write_report(&report, &analytic, &columns[shown])?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VerificationConfig;
    use crate::fem::OscillatorElement;
    use num_complex::Complex64;

    fn oscillator() -> OscillatorElement<f64> {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 0.1, 0.1, 1.0]);
        let c = DMatrix::from_row_slice(2, 2, &[0.3, 0.0, -0.2, 0.4]);
        let k = DMatrix::from_row_slice(2, 2, &[5.0, -2.0, -2.0, 3.0]);
        OscillatorElement::new(&m, &c, &k)
    }

    #[test]
    fn test_linear_element_passes() {
        let elem = oscillator();
        let xpts = [0.0; 3];
        let state = ElementState::new(&xpts, &[0.3, -0.1], &[1.0, 2.0], &[0.0, -0.5]);

        let mut verifier = Verifier::with_sink(VerificationConfig::quiet(), Vec::new()).unwrap();
        let report = verifier.element_jacobian(&elem, 0, 0.0, &state, None).unwrap();
        assert!(report.passed(), "{}", report);
        assert_eq!(report.check, "K*u");
    }

    #[test]
    fn test_complex_column_matches_matrix_column() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 0.1, 0.1, 1.0]);
        let k = DMatrix::from_row_slice(2, 2, &[5.0, -2.0, -2.0, 3.0]);
        let coeffs = JacobianCoefficients::new(1.0, 0.0, 4.0);
        let elem = OscillatorElement::<Complex64>::new(&m, &DMatrix::zeros(2, 2), &k).with_coefficients(coeffs);

        let xpts = [Complex64::new(0.0, 0.0); 3];
        let z = [Complex64::new(0.0, 0.0); 2];
        let state = ElementState::new(&xpts, &z, &z, &z);

        let config = VerificationConfig::quiet().with_step(1e-30);
        let mut verifier = Verifier::with_sink(config, Vec::new()).unwrap();
        let report = verifier.element_jacobian(&elem, 0, 0.0, &state, Some(1)).unwrap();
        assert!(report.passed());
        assert!(report.summary.abs.value < 1e-14);
    }

    #[test]
    fn test_column_out_of_range() {
        let elem = oscillator();
        let xpts = [0.0; 3];
        let z = [0.0; 2];
        let state = ElementState::new(&xpts, &z, &z, &z);

        let mut verifier = Verifier::with_sink(VerificationConfig::quiet(), Vec::new()).unwrap();
        let err = verifier.element_jacobian(&elem, 0, 0.0, &state, Some(2)).unwrap_err();
        assert!(matches!(err, VerifyError::ColumnOutOfRange { col: 2, num_vars: 2 }));
    }

    #[test]
    fn test_state_length_checked() {
        let elem = oscillator();
        let xpts = [0.0; 3];
        let z = [0.0; 2];
        let state = ElementState::new(&xpts, &[0.0; 3], &z, &z);

        let mut verifier = Verifier::with_sink(VerificationConfig::quiet(), Vec::new()).unwrap();
        let err = verifier.element_jacobian(&elem, 0, 0.0, &state, None).unwrap_err();
        assert!(matches!(err, VerifyError::LengthMismatch { what: "vars", .. }));
    }

    #[test]
    fn test_column_sweep_passes() {
        let elem = oscillator();
        let xpts = [0.0; 3];
        let state = ElementState::new(&xpts, &[0.3, -0.1], &[1.0, 2.0], &[0.0, -0.5]);

        let mut verifier = Verifier::with_sink(VerificationConfig::quiet(), Vec::new()).unwrap();
        let report = verifier.element_jacobian_columns(&elem, 0, 0.0, &state).unwrap();
        assert!(report.passed());
        assert_eq!(report.failing_column, None);
    }
}
