//! Capability sets consumed by the verifiers
//!
//! The verifiers never look inside an element: they only call the operations
//! on [`Element`] (residual, Jacobian, energies, adjoint-residual products)
//! and [`ElementBasis`] (shape functions and their parametric derivatives).
//! Any element implementation, or a deliberately wrong test double, can be
//! checked this way.

use nalgebra::DMatrix;

use crate::error::{ensure_len, VerifyResult};
use crate::scalar::Scalar;

/// Spatial dimension of nodal coordinates
pub const SPATIAL_DIM: usize = 3;

/// Borrowed element inputs: nodal coordinates and state with its time derivatives
#[derive(Debug, Clone, Copy)]
pub struct ElementState<'a, S> {
    /// Nodal coordinates, `SPATIAL_DIM * num_nodes`
    pub xpts: &'a [S],
    /// State variables q
    pub vars: &'a [S],
    /// First time derivative of the state
    pub dvars: &'a [S],
    /// Second time derivative of the state
    pub ddvars: &'a [S],
}

impl<'a, S: Scalar> ElementState<'a, S> {
    pub fn new(xpts: &'a [S], vars: &'a [S], dvars: &'a [S], ddvars: &'a [S]) -> Self {
        Self {
            xpts,
            vars,
            dvars,
            ddvars,
        }
    }

    /// Same coordinates, different state
    pub fn with_vars(&self, vars: &'a [S], dvars: &'a [S], ddvars: &'a [S]) -> Self {
        Self {
            xpts: self.xpts,
            vars,
            dvars,
            ddvars,
        }
    }

    /// Same state, different coordinates
    pub fn with_xpts(&self, xpts: &'a [S]) -> Self {
        Self { xpts, ..*self }
    }

    /// Check array lengths against an element
    pub fn check<E: Element<S> + ?Sized>(&self, element: &E) -> VerifyResult<()> {
        let nvars = element.num_variables();
        ensure_len("xpts", SPATIAL_DIM * element.num_nodes(), self.xpts.len())?;
        ensure_len("vars", nvars, self.vars.len())?;
        ensure_len("dvars", nvars, self.dvars.len())?;
        ensure_len("ddvars", nvars, self.ddvars.len())?;
        Ok(())
    }
}

/// Coefficients blending the state derivatives of the residual into a Jacobian
///
/// ```text
/// J = alpha ∂R/∂q + beta ∂R/∂q̇ + gamma ∂R/∂q̈
/// ```
///
/// For Newmark-type integrators beta and gamma are the factors that map a
/// change of q into changes of q̇ and q̈.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobianCoefficients {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl JacobianCoefficients {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Newmark coefficients for step `dt` and parameters (β, γ):
    /// α = 1, β_J = γ / (β dt), γ_J = 1 / (β dt²)
    pub fn newmark(dt: f64, beta: f64, gamma: f64) -> Self {
        Self {
            alpha: 1.0,
            beta: gamma / (beta * dt),
            gamma: 1.0 / (beta * dt * dt),
        }
    }
}

/// Kinetic and potential energy of an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Energies<S> {
    pub kinetic: S,
    pub potential: S,
}

impl<S: Scalar> Energies<S> {
    /// L = T - U
    pub fn lagrangian(&self) -> S {
        self.kinetic - self.potential
    }
}

/// Element operations checked by the verifiers
///
/// Residual convention (Lagrange's equations with L = T - U):
///
/// ```text
/// R = d/dt(∂L/∂q̇) - ∂L/∂q  (+ any non-conservative terms)
/// ```
pub trait Element<S: Scalar> {
    /// Name used in reports
    fn name(&self) -> &str;

    /// Number of nodes
    fn num_nodes(&self) -> usize;

    /// Number of degrees of freedom
    fn num_variables(&self) -> usize;

    /// Blending coefficients declared by the element, if any
    ///
    /// When `None` the Jacobian verifier draws random coefficients.
    fn jacobian_coefficients(&self) -> Option<JacobianCoefficients> {
        None
    }

    /// Set the design variables used by subsequent evaluations
    fn set_design_vars(&mut self, _elem_index: usize, _x: &[S]) {}

    /// Write the residual into `res` (overwriting it)
    fn compute_residual(&self, elem_index: usize, time: f64, state: &ElementState<'_, S>, res: &mut [S]);

    /// Write the residual into `res` and the blended Jacobian into `mat`
    fn compute_jacobian(
        &self,
        elem_index: usize,
        time: f64,
        coeffs: JacobianCoefficients,
        state: &ElementState<'_, S>,
        res: &mut [S],
        mat: &mut DMatrix<S>,
    );

    /// Kinetic and potential energy (the second derivatives in `state` are unused)
    fn compute_energies(&self, elem_index: usize, time: f64, state: &ElementState<'_, S>) -> Energies<S>;

    /// Add `scale * d(ψᵀR)/dx` to `dfdx`
    fn add_adj_res_product(
        &self,
        elem_index: usize,
        time: f64,
        scale: S,
        psi: &[S],
        state: &ElementState<'_, S>,
        dfdx: &mut [S],
    );

    /// Add `scale * d(ψᵀR)/dXpts` to `dfdxpts`
    fn add_adj_res_xpt_product(
        &self,
        elem_index: usize,
        time: f64,
        scale: S,
        psi: &[S],
        state: &ElementState<'_, S>,
        dfdxpts: &mut [S],
    );
}

/// Shape functions of a reference element
///
/// Values are real: parametric coordinates are never complex-perturbed.
pub trait ElementBasis {
    /// Name used in reports
    fn name(&self) -> &str;

    /// Number of parametric coordinates
    fn num_params(&self) -> usize;

    /// Number of shape functions
    fn num_nodes(&self) -> usize;

    /// Shape function values at `pt`
    fn compute_basis(&self, pt: &[f64], n: &mut [f64]);

    /// Shape functions and parametric derivatives at `pt`
    ///
    /// `nxi[num_params * j + i] = ∂N_j/∂ξ_i`
    fn compute_basis_gradient(&self, pt: &[f64], n: &mut [f64], nxi: &mut [f64]);

    /// Points at which the basis is used (typically its quadrature rule)
    fn quadrature_points(&self) -> Vec<Vec<f64>> {
        Vec::new()
    }

    /// Map an arbitrary point in `[-1, 1]^d` into the reference domain
    fn clamp_point(&self, _pt: &mut [f64]) {}
}
