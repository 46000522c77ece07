/// Adjoint-residual product checks
///
/// For a random adjoint ψ, scale s and direction p the element's analytic
/// derivative of s ψᵀR is projected onto p and compared with
///
/// ```text
/// d/dh [ s ψᵀ R(x + h p) ]          design variables
/// d/dh [ s ψᵀ R(Xpts + h p) ]       nodal coordinates
/// ```

use tracing::debug;

use super::{VerificationReport, Verifier};
use crate::element::{Element, ElementState};
use crate::error::VerifyResult;
use crate::fd::{approximate_derivative, generate_random_vec, perturb};
use crate::scalar::{dot, zeros, Scalar};
use std::io::Write;

impl<W: Write> Verifier<W> {
    /// Check the design-variable derivative of ψᵀR
    ///
    /// The element's design variables are set from perturbed copies of `x`
    /// and restored to `x` before returning.
    pub fn adj_res_product<S, E>(
        &mut self,
        element: &mut E,
        elem_index: usize,
        x: &[S],
        time: f64,
        state: &ElementState<'_, S>,
    ) -> VerifyResult<VerificationReport>
    where
        S: Scalar,
        E: Element<S> + ?Sized,
    {
        state.check(&*element)?;
        let dh = self.config.dh;
        let n = element.num_variables();
        debug!(
            element = element.name(),
            mode = S::MODE,
            dh,
            num_design_vars = x.len(),
            "checking adjoint-residual product"
        );

        let scale = S::from_real(self.rng.uniform(0.0, 1.0));
        let psi: Vec<S> = generate_random_vec(&mut self.rng, n);
        let p: Vec<S> = generate_random_vec(&mut self.rng, x.len());

        element.set_design_vars(elem_index, x);
        let mut dfdx = zeros(x.len());
        element.add_adj_res_product(elem_index, time, scale, &psi, state, &mut dfdx);
        let analytic = [dot(&p, &dfdx)];

        let mut xp = zeros(x.len());
        let mut res = zeros(n);
        let fd = approximate_derivative(dh, |side| {
            perturb(side, &mut xp, x, &p, dh)?;
            element.set_design_vars(elem_index, &xp);
            element.compute_residual(elem_index, time, state, &mut res);
            Ok(vec![scale * dot(&psi, &res)])
        });
        element.set_design_vars(elem_index, x);

        self.conclude("Adj-Res product", element.name(), &analytic, &fd?)
    }

    /// Check the nodal-coordinate derivative of ψᵀR
    pub fn adj_res_xpt_product<S, E>(
        &mut self,
        element: &E,
        elem_index: usize,
        time: f64,
        state: &ElementState<'_, S>,
    ) -> VerifyResult<VerificationReport>
    where
        S: Scalar,
        E: Element<S> + ?Sized,
    {
        state.check(element)?;
        let dh = self.config.dh;
        let n = element.num_variables();
        let num_xpts = state.xpts.len();
        debug!(
            element = element.name(),
            mode = S::MODE,
            dh,
            "checking adjoint-residual xpt product"
        );

        let scale = S::from_real(self.rng.uniform(0.0, 1.0));
        let psi: Vec<S> = generate_random_vec(&mut self.rng, n);
        let p: Vec<S> = generate_random_vec(&mut self.rng, num_xpts);

        let mut dfdxpts = zeros(num_xpts);
        element.add_adj_res_xpt_product(elem_index, time, scale, &psi, state, &mut dfdxpts);
        let analytic = [dot(&p, &dfdxpts)];

        let mut xp = zeros(num_xpts);
        let mut res = zeros(n);
        let fd = approximate_derivative(dh, |side| {
            perturb(side, &mut xp, state.xpts, &p, dh)?;
            element.compute_residual(elem_index, time, &state.with_xpts(&xp), &mut res);
            Ok(vec![scale * dot(&psi, &res)])
        })?;

        self.conclude("Adj-Res Xpt product", element.name(), &analytic, &fd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VerificationConfig;
    use crate::fem::OscillatorElement;
    use nalgebra::DMatrix;
    use num_complex::Complex64;

    fn oscillator() -> OscillatorElement<Complex64> {
        let m = DMatrix::identity(2, 2);
        let c = DMatrix::zeros(2, 2);
        let k = DMatrix::from_row_slice(2, 2, &[4.0, -1.0, -1.0, 2.0]);
        OscillatorElement::new(&m, &c, &k)
    }

    fn complex(v: &[f64]) -> Vec<Complex64> {
        v.iter().map(|&x| Complex64::new(x, 0.0)).collect()
    }

    #[test]
    fn test_design_derivative_passes() {
        let mut elem = oscillator();
        let xpts = complex(&[0.0; 3]);
        let (q, dq, ddq) = (complex(&[0.5, -1.0]), complex(&[0.1, 0.2]), complex(&[0.0, 1.0]));
        let state = ElementState::new(&xpts, &q, &dq, &ddq);
        let x = complex(&[1.5]);

        let mut verifier = Verifier::with_sink(VerificationConfig::quiet(), Vec::new()).unwrap();
        let report = verifier.adj_res_product(&mut elem, 0, &x, 0.0, &state).unwrap();
        assert!(report.passed(), "{}", report);
        assert_eq!(report.check, "Adj-Res product");
    }

    #[test]
    fn test_design_vars_restored() {
        let mut elem = oscillator();
        let xpts = complex(&[0.0; 3]);
        let q = complex(&[1.0, 1.0]);
        let z = complex(&[0.0, 0.0]);
        let state = ElementState::new(&xpts, &q, &z, &z);
        let x = complex(&[3.0]);

        let mut verifier = Verifier::with_sink(VerificationConfig::quiet(), Vec::new()).unwrap();
        verifier.adj_res_product(&mut elem, 0, &x, 0.0, &state).unwrap();

        // R = 3 K q
        let mut res = complex(&[0.0, 0.0]);
        elem.compute_residual(0, 0.0, &state, &mut res);
        assert_eq!(res[0], Complex64::new(9.0, 0.0));
        assert_eq!(res[1], Complex64::new(3.0, 0.0));
    }

    #[test]
    fn test_xpt_independent_element_passes() {
        let elem = oscillator();
        let xpts = complex(&[0.1, 0.2, 0.3]);
        let (q, z) = (complex(&[0.5, -1.0]), complex(&[0.0, 0.0]));
        let state = ElementState::new(&xpts, &q, &z, &z);

        let mut verifier = Verifier::with_sink(VerificationConfig::quiet(), Vec::new()).unwrap();
        let report = verifier.adj_res_xpt_product(&elem, 0, 0.0, &state).unwrap();
        assert!(report.passed());
        assert_eq!(report.summary.abs.value, 0.0);
    }
}
