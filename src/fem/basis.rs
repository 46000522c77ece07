use crate::element::ElementBasis;
use crate::fem::GaussQuadrature;

/// Tet10 (10-node quadratic tetrahedral) basis
///
/// Node numbering:
///   Vertices: 0, 1, 2, 3
///   Edge midpoints:
///     4: edge 0-1
///     5: edge 1-2
///     6: edge 2-0
///     7: edge 0-3
///     8: edge 1-3
///     9: edge 2-3
///
/// Parametric coordinates are (ξ1, ξ2, ξ3) = (L1, L2, L3) with the implied
/// barycentric coordinate L0 = 1 - ξ1 - ξ2 - ξ3.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tet10Basis;

impl Tet10Basis {
    /// Barycentric coordinates [L0, L1, L2, L3] of a parametric point
    pub fn barycentric(pt: &[f64]) -> [f64; 4] {
        [1.0 - pt[0] - pt[1] - pt[2], pt[0], pt[1], pt[2]]
    }

    /// Shape functions in barycentric coordinates
    ///
    /// ```text
    /// N_i = L_i (2 L_i - 1)        vertices i = 0..3
    /// N_k = 4 L_a L_b              edge (a, b)
    /// ```
    #[allow(non_snake_case)]
    pub fn shape_functions(L: &[f64; 4]) -> [f64; 10] {
        let [L0, L1, L2, L3] = *L;

        [
            L0 * (2.0 * L0 - 1.0),
            L1 * (2.0 * L1 - 1.0),
            L2 * (2.0 * L2 - 1.0),
            L3 * (2.0 * L3 - 1.0),
            4.0 * L0 * L1,
            4.0 * L1 * L2,
            4.0 * L2 * L0,
            4.0 * L0 * L3,
            4.0 * L1 * L3,
            4.0 * L2 * L3,
        ]
    }

    /// ∂N/∂L_i treating all four barycentric coordinates as independent
    #[allow(non_snake_case)]
    pub fn shape_derivatives_barycentric(L: &[f64; 4]) -> [[f64; 4]; 10] {
        let [L0, L1, L2, L3] = *L;

        [
            [4.0 * L0 - 1.0, 0.0, 0.0, 0.0],
            [0.0, 4.0 * L1 - 1.0, 0.0, 0.0],
            [0.0, 0.0, 4.0 * L2 - 1.0, 0.0],
            [0.0, 0.0, 0.0, 4.0 * L3 - 1.0],
            [4.0 * L1, 4.0 * L0, 0.0, 0.0],
            [0.0, 4.0 * L2, 4.0 * L1, 0.0],
            [4.0 * L2, 0.0, 4.0 * L0, 0.0],
            [4.0 * L3, 0.0, 0.0, 4.0 * L0],
            [0.0, 4.0 * L3, 0.0, 4.0 * L1],
            [0.0, 0.0, 4.0 * L3, 4.0 * L2],
        ]
    }
}

impl ElementBasis for Tet10Basis {
    fn name(&self) -> &str {
        "Tet10Basis"
    }

    fn num_params(&self) -> usize {
        3
    }

    fn num_nodes(&self) -> usize {
        10
    }

    fn compute_basis(&self, pt: &[f64], n: &mut [f64]) {
        n.copy_from_slice(&Self::shape_functions(&Self::barycentric(pt)));
    }

    #[allow(non_snake_case)]
    fn compute_basis_gradient(&self, pt: &[f64], n: &mut [f64], nxi: &mut [f64]) {
        let L = Self::barycentric(pt);
        n.copy_from_slice(&Self::shape_functions(&L));

        // ∂N/∂ξ_k = ∂N/∂L_k - ∂N/∂L0 since ∂L0/∂ξ_k = -1
        let dN_dL = Self::shape_derivatives_barycentric(&L);
        for (j, d) in dN_dL.iter().enumerate() {
            for k in 0..3 {
                nxi[3 * j + k] = d[k + 1] - d[0];
            }
        }
    }

    fn quadrature_points(&self) -> Vec<Vec<f64>> {
        GaussQuadrature::tet_4point().points
    }

    fn clamp_point(&self, pt: &mut [f64]) {
        // [-1, 1]^3 -> interior of the reference tet
        let u: Vec<f64> = pt.iter().map(|&x| 0.5 * (x + 1.0)).collect();
        let scale = 1.0 + u.iter().sum::<f64>();
        for (p, ui) in pt.iter_mut().zip(u) {
            *p = ui / scale;
        }
    }
}

/// Lagrange basis of a given order on the line [-1, 1] with equally spaced nodes
#[derive(Debug, Clone)]
pub struct LagrangeLineBasis {
    nodes: Vec<f64>,
}

impl LagrangeLineBasis {
    /// # Panics
    /// Panics if `order` is zero.
    pub fn new(order: usize) -> Self {
        assert!(order > 0, "Lagrange basis order must be positive, got {}", order);
        let nodes = (0..=order)
            .map(|i| -1.0 + 2.0 * i as f64 / order as f64)
            .collect();
        Self { nodes }
    }

    /// Polynomial order
    pub fn order(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Node locations
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    fn value(&self, j: usize, xi: f64) -> f64 {
        let xj = self.nodes[j];
        self.nodes
            .iter()
            .enumerate()
            .filter(|&(k, _)| k != j)
            .map(|(_, &xk)| (xi - xk) / (xj - xk))
            .product()
    }

    fn derivative(&self, j: usize, xi: f64) -> f64 {
        let xj = self.nodes[j];
        let mut sum = 0.0;
        for (m, &xm) in self.nodes.iter().enumerate() {
            if m == j {
                continue;
            }
            let mut term = 1.0 / (xj - xm);
            for (k, &xk) in self.nodes.iter().enumerate() {
                if k != j && k != m {
                    term *= (xi - xk) / (xj - xk);
                }
            }
            sum += term;
        }
        sum
    }
}

impl ElementBasis for LagrangeLineBasis {
    fn name(&self) -> &str {
        "LagrangeLineBasis"
    }

    fn num_params(&self) -> usize {
        1
    }

    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn compute_basis(&self, pt: &[f64], n: &mut [f64]) {
        for (j, nj) in n.iter_mut().enumerate() {
            *nj = self.value(j, pt[0]);
        }
    }

    fn compute_basis_gradient(&self, pt: &[f64], n: &mut [f64], nxi: &mut [f64]) {
        self.compute_basis(pt, n);
        for (j, d) in nxi.iter_mut().enumerate() {
            *d = self.derivative(j, pt[0]);
        }
    }

    fn quadrature_points(&self) -> Vec<Vec<f64>> {
        GaussQuadrature::line(self.order().min(3)).points
    }
}
