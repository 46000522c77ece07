/// Linear mass-spring-damper element
///
/// ```text
/// R = M q̈ + C q̇ + s K q
/// ```
///
/// with constant matrices and a single design variable `s` scaling the
/// stiffness. The residual is exactly linear in (q, q̇, q̈), so finite
/// differences of it reproduce the Jacobian for any step. Nodal coordinates
/// do not enter the residual.

use nalgebra::{DMatrix, DVector};

use crate::element::{Element, ElementState, Energies, JacobianCoefficients, SPATIAL_DIM};
use crate::scalar::Scalar;

#[derive(Debug, Clone)]
pub struct OscillatorElement<S: Scalar> {
    mass: DMatrix<S>,
    damping: DMatrix<S>,
    stiffness: DMatrix<S>,
    stiffness_scale: S,
    num_nodes: usize,
    coefficients: Option<JacobianCoefficients>,
}

impl<S: Scalar> OscillatorElement<S> {
    /// # Panics
    /// Panics if the matrices are not square and of equal size.
    pub fn new(mass: &DMatrix<f64>, damping: &DMatrix<f64>, stiffness: &DMatrix<f64>) -> Self {
        let n = mass.nrows();
        assert!(
            mass.shape() == (n, n) && damping.shape() == (n, n) && stiffness.shape() == (n, n),
            "Oscillator matrices must be square and of equal size"
        );

        Self {
            mass: mass.map(S::from_real),
            damping: damping.map(S::from_real),
            stiffness: stiffness.map(S::from_real),
            stiffness_scale: S::one(),
            num_nodes: n.div_ceil(SPATIAL_DIM),
            coefficients: None,
        }
    }

    /// Declare fixed Jacobian blending coefficients
    pub fn with_coefficients(mut self, coefficients: JacobianCoefficients) -> Self {
        self.coefficients = Some(coefficients);
        self
    }

    fn product(mat: &DMatrix<S>, v: &[S]) -> DVector<S> {
        mat * DVector::from_column_slice(v)
    }
}

impl<S: Scalar> Element<S> for OscillatorElement<S> {
    fn name(&self) -> &str {
        "OscillatorElement"
    }

    fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    fn num_variables(&self) -> usize {
        self.mass.nrows()
    }

    fn jacobian_coefficients(&self) -> Option<JacobianCoefficients> {
        self.coefficients
    }

    fn set_design_vars(&mut self, _elem_index: usize, x: &[S]) {
        if let Some(&s) = x.first() {
            self.stiffness_scale = s;
        }
    }

    fn compute_residual(&self, _elem_index: usize, _time: f64, state: &ElementState<'_, S>, res: &mut [S]) {
        let r = Self::product(&self.mass, state.ddvars)
            + Self::product(&self.damping, state.dvars)
            + Self::product(&self.stiffness, state.vars) * self.stiffness_scale;
        res.copy_from_slice(r.as_slice());
    }

    fn compute_jacobian(
        &self,
        elem_index: usize,
        time: f64,
        coeffs: JacobianCoefficients,
        state: &ElementState<'_, S>,
        res: &mut [S],
        mat: &mut DMatrix<S>,
    ) {
        self.compute_residual(elem_index, time, state, res);
        *mat = &self.stiffness * (self.stiffness_scale * S::from_real(coeffs.alpha))
            + &self.damping * S::from_real(coeffs.beta)
            + &self.mass * S::from_real(coeffs.gamma);
    }

    fn compute_energies(&self, _elem_index: usize, _time: f64, state: &ElementState<'_, S>) -> Energies<S> {
        let half = S::from_real(0.5);
        let q = DVector::from_column_slice(state.vars);
        let qdot = DVector::from_column_slice(state.dvars);

        Energies {
            kinetic: half * qdot.dot(&(&self.mass * &qdot)),
            potential: half * self.stiffness_scale * q.dot(&(&self.stiffness * &q)),
        }
    }

    fn add_adj_res_product(
        &self,
        _elem_index: usize,
        _time: f64,
        scale: S,
        psi: &[S],
        state: &ElementState<'_, S>,
        dfdx: &mut [S],
    ) {
        if let Some(ds) = dfdx.first_mut() {
            let kq = Self::product(&self.stiffness, state.vars);
            *ds += scale * DVector::from_column_slice(psi).dot(&kq);
        }
    }

    fn add_adj_res_xpt_product(
        &self,
        _elem_index: usize,
        _time: f64,
        _scale: S,
        _psi: &[S],
        _state: &ElementState<'_, S>,
        _dfdxpts: &mut [S],
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_dof() -> OscillatorElement<f64> {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 1.0]);
        let c = DMatrix::from_row_slice(2, 2, &[0.1, 0.0, 0.0, 0.1]);
        let k = DMatrix::from_row_slice(2, 2, &[3.0, -1.0, -1.0, 1.0]);
        OscillatorElement::new(&m, &c, &k)
    }

    #[test]
    fn test_residual() {
        let elem = two_dof();
        let xpts = [0.0; 3];
        let state = ElementState::new(&xpts, &[1.0, 2.0], &[1.0, 0.0], &[0.5, 0.5]);

        let mut res = [0.0; 2];
        elem.compute_residual(0, 0.0, &state, &mut res);
        // M a = [1, 0.5], C v = [0.1, 0], K q = [1, 1]
        assert_relative_eq!(res[0], 2.1);
        assert_relative_eq!(res[1], 1.5);
    }

    #[test]
    fn test_jacobian_blend() {
        let elem = two_dof();
        let xpts = [0.0; 3];
        let zeros = [0.0; 2];
        let state = ElementState::new(&xpts, &zeros, &zeros, &zeros);

        let mut res = [0.0; 2];
        let mut mat = DMatrix::zeros(2, 2);
        elem.compute_jacobian(0, 0.0, JacobianCoefficients::new(1.0, 10.0, 100.0), &state, &mut res, &mut mat);
        assert_relative_eq!(mat[(0, 0)], 3.0 + 1.0 + 200.0);
        assert_relative_eq!(mat[(0, 1)], -1.0);
        assert_relative_eq!(mat[(1, 1)], 1.0 + 1.0 + 100.0);
    }

    #[test]
    fn test_num_nodes() {
        assert_eq!(two_dof().num_nodes(), 1);
        let eye = DMatrix::<f64>::identity(7, 7);
        let elem = OscillatorElement::<f64>::new(&eye, &eye, &eye);
        assert_eq!(elem.num_nodes(), 3);
    }

    #[test]
    #[should_panic(expected = "must be square")]
    fn test_mismatched_matrices() {
        let a = DMatrix::<f64>::identity(2, 2);
        let b = DMatrix::<f64>::identity(3, 3);
        OscillatorElement::<f64>::new(&a, &a, &b);
    }
}
