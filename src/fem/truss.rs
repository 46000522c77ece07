/// Two-node axial bar (truss) element in 3D
///
/// Six displacement DOFs [u1x, u1y, u1z, u2x, u2y, u2z]. With Δ = X2 - X1,
/// L = |Δ| and d = u2 - u1:
///
/// ```text
/// U = ½ E A (Δ·d)² / L³                      (small-strain axial energy)
/// T = ½ q̇ᵀ M q̇,   M = ρ A L / 6 [2I  I; I  2I]  (consistent mass)
/// R = M q̈ + c M q̇ + K q
/// ```
///
/// Design variables are x = [A, ρ]. The mass-proportional damping term c M q̇
/// is not conservative, so the residual-energy check only holds for c = 0.

use nalgebra::{DMatrix, Matrix3, Vector3};

use crate::element::{Element, ElementState, Energies, JacobianCoefficients};
use crate::scalar::Scalar;

/// Axial bar with consistent mass
#[derive(Debug, Clone)]
pub struct TrussElement<S> {
    /// Young's modulus E
    pub modulus: f64,
    /// Mass-proportional damping coefficient c
    pub damping: f64,
    area: S,
    density: S,
    coefficients: Option<JacobianCoefficients>,
}

/// Geometry derived from the nodal coordinates
struct BarGeometry<S: Scalar> {
    delta: Vector3<S>,
    length: S,
}

impl<S: Scalar> BarGeometry<S> {
    fn new(xpts: &[S]) -> Self {
        let delta = Vector3::from_column_slice(&xpts[3..6]) - Vector3::from_column_slice(&xpts[0..3]);
        let length = delta.dot(&delta).sqrt();
        Self { delta, length }
    }
}

fn node_vector<S: Scalar>(v: &[S], node: usize) -> Vector3<S> {
    Vector3::from_column_slice(&v[3 * node..3 * node + 3])
}

impl<S: Scalar> TrussElement<S> {
    pub fn new(modulus: f64, area: f64, density: f64) -> Self {
        Self {
            modulus,
            damping: 0.0,
            area: S::from_real(area),
            density: S::from_real(density),
            coefficients: None,
        }
    }

    /// Add mass-proportional damping
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Declare fixed Jacobian blending coefficients
    pub fn with_coefficients(mut self, coefficients: JacobianCoefficients) -> Self {
        self.coefficients = Some(coefficients);
        self
    }

    /// Current design variables [A, ρ]
    pub fn design_vars(&self) -> [S; 2] {
        [self.area, self.density]
    }

    fn axial_stiffness(&self, geo: &BarGeometry<S>) -> S {
        // E A / L³
        S::from_real(self.modulus) * self.area / (geo.length * geo.length * geo.length)
    }

    fn mass_factor(&self, geo: &BarGeometry<S>) -> S {
        // ρ A L / 6
        self.density * self.area * geo.length / S::from_real(6.0)
    }

    /// Stiffness action K q: node 1 gets -f, node 2 gets +f
    fn stiffness_force(&self, geo: &BarGeometry<S>, vars: &[S]) -> Vector3<S> {
        let d = node_vector(vars, 1) - node_vector(vars, 0);
        geo.delta * (self.axial_stiffness(geo) * geo.delta.dot(&d))
    }

    /// Add M v scaled by `factor` into `res`
    fn add_mass_action(&self, geo: &BarGeometry<S>, v: &[S], factor: S, res: &mut [S]) {
        let m = self.mass_factor(geo) * factor;
        let two = S::from_real(2.0);
        for k in 0..3 {
            res[k] += m * (two * v[k] + v[3 + k]);
            res[3 + k] += m * (v[k] + two * v[3 + k]);
        }
    }

    /// ψᵀ M̂ a with M̂ = [2I I; I 2I]
    fn mass_form(psi: &[S], a: &[S]) -> S {
        let two = S::from_real(2.0);
        let mut sum = S::zero();
        for k in 0..3 {
            sum += psi[k] * (two * a[k] + a[3 + k]) + psi[3 + k] * (a[k] + two * a[3 + k]);
        }
        sum
    }

    /// Accelerations plus damping velocities, q̈ + c q̇
    fn inertial_rates(&self, state: &ElementState<'_, S>) -> Vec<S> {
        let c = S::from_real(self.damping);
        state
            .ddvars
            .iter()
            .zip(state.dvars)
            .map(|(&a, &v)| a + c * v)
            .collect()
    }
}

impl<S: Scalar> Element<S> for TrussElement<S> {
    fn name(&self) -> &str {
        "TrussElement"
    }

    fn num_nodes(&self) -> usize {
        2
    }

    fn num_variables(&self) -> usize {
        6
    }

    fn jacobian_coefficients(&self) -> Option<JacobianCoefficients> {
        self.coefficients
    }

    fn set_design_vars(&mut self, _elem_index: usize, x: &[S]) {
        if let Some(&area) = x.first() {
            self.area = area;
        }
        if let Some(&density) = x.get(1) {
            self.density = density;
        }
    }

    fn compute_residual(&self, _elem_index: usize, _time: f64, state: &ElementState<'_, S>, res: &mut [S]) {
        let geo = BarGeometry::new(state.xpts);
        res.iter_mut().for_each(|r| *r = S::zero());

        let f = self.stiffness_force(&geo, state.vars);
        for k in 0..3 {
            res[k] -= f[k];
            res[3 + k] += f[k];
        }

        let rates = self.inertial_rates(state);
        self.add_mass_action(&geo, &rates, S::one(), res);
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

        let geo = BarGeometry::new(state.xpts);
        let k: Matrix3<S> = geo.delta * geo.delta.transpose() * self.axial_stiffness(&geo);
        let alpha = S::from_real(coeffs.alpha);

        // Mass blocks carry both the damping (beta) and inertia (gamma) terms
        let m = self.mass_factor(&geo) * S::from_real(coeffs.gamma + coeffs.beta * self.damping);
        let two = S::from_real(2.0);

        mat.fill(S::zero());
        for i in 0..3 {
            for j in 0..3 {
                let kij = alpha * k[(i, j)];
                mat[(i, j)] += kij;
                mat[(i, 3 + j)] -= kij;
                mat[(3 + i, j)] -= kij;
                mat[(3 + i, 3 + j)] += kij;
            }
            mat[(i, i)] += two * m;
            mat[(i, 3 + i)] += m;
            mat[(3 + i, i)] += m;
            mat[(3 + i, 3 + i)] += two * m;
        }
    }

    fn compute_energies(&self, _elem_index: usize, _time: f64, state: &ElementState<'_, S>) -> Energies<S> {
        let geo = BarGeometry::new(state.xpts);

        let d = node_vector(state.vars, 1) - node_vector(state.vars, 0);
        let stretch = geo.delta.dot(&d);
        let potential = S::from_real(0.5) * self.axial_stiffness(&geo) * stretch * stretch;

        let v1 = node_vector(state.dvars, 0);
        let v2 = node_vector(state.dvars, 1);
        let kinetic = self.mass_factor(&geo) * (v1.dot(&v1) + v1.dot(&v2) + v2.dot(&v2));

        Energies { kinetic, potential }
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
        let geo = BarGeometry::new(state.xpts);
        let d = node_vector(state.vars, 1) - node_vector(state.vars, 0);
        let w = node_vector(psi, 1) - node_vector(psi, 0);
        let l3 = geo.length * geo.length * geo.length;

        // ψᵀR = E A (Δ·d)(Δ·w)/L³ + ρ A L/6 ψᵀM̂(q̈ + c q̇)
        let stiffness_term = S::from_real(self.modulus) * geo.delta.dot(&d) * geo.delta.dot(&w) / l3;
        let mass_term = geo.length / S::from_real(6.0) * Self::mass_form(psi, &self.inertial_rates(state));

        if let Some(da) = dfdx.get_mut(0) {
            *da += scale * (stiffness_term + self.density * mass_term);
        }
        if let Some(drho) = dfdx.get_mut(1) {
            *drho += scale * self.area * mass_term;
        }
    }

    fn add_adj_res_xpt_product(
        &self,
        _elem_index: usize,
        _time: f64,
        scale: S,
        psi: &[S],
        state: &ElementState<'_, S>,
        dfdxpts: &mut [S],
    ) {
        let geo = BarGeometry::new(state.xpts);
        let d = node_vector(state.vars, 1) - node_vector(state.vars, 0);
        let w = node_vector(psi, 1) - node_vector(psi, 0);

        let l = geo.length;
        let l3 = l * l * l;
        let l5 = l3 * l * l;
        let a = geo.delta.dot(&d);
        let b = geo.delta.dot(&w);
        let ea = S::from_real(self.modulus) * self.area;
        let mhat = Self::mass_form(psi, &self.inertial_rates(state));

        // ∂(ψᵀR)/∂Δ
        let grad = (d * b + w * a) * (ea / l3)
            - geo.delta * (S::from_real(3.0) * ea * a * b / l5)
            + geo.delta * (self.density * self.area * mhat / (S::from_real(6.0) * l));

        for k in 0..3 {
            dfdxpts[k] -= scale * grad[k];
            dfdxpts[3 + k] += scale * grad[k];
        }
    }
}
