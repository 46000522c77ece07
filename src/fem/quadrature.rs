/// Quadrature rules in parametric coordinates
///
/// Tetrahedral rules are stored as (ξ1, ξ2, ξ3) = (L1, L2, L3); the first
/// barycentric coordinate is implied, L0 = 1 - ξ1 - ξ2 - ξ3. Line rules are
/// Gauss-Legendre on [-1, 1].
pub struct GaussQuadrature {
    /// Integration points, one coordinate vector per point
    pub points: Vec<Vec<f64>>,
    /// Integration weights
    pub weights: Vec<f64>,
}

impl GaussQuadrature {
    /// Build a tetrahedral rule from barycentric points [L0, L1, L2, L3]
    fn from_barycentric(points: &[[f64; 4]], weights: Vec<f64>) -> Self {
        Self {
            points: points.iter().map(|l| vec![l[1], l[2], l[3]]).collect(),
            weights,
        }
    }

    /// Centroid rule, exact for linear polynomials
    pub fn tet_1point() -> Self {
        Self::from_barycentric(&[[0.25, 0.25, 0.25, 0.25]], vec![1.0 / 6.0])
    }

    /// 4-point rule, exact for quadratics
    pub fn tet_4point() -> Self {
        let a = 0.5854101966249685; // (5 + √5) / 20
        let b = 0.1381966011250105; // (5 - √5) / 20
        let w = 1.0 / 24.0;

        Self::from_barycentric(
            &[[a, b, b, b], [b, a, b, b], [b, b, a, b], [b, b, b, a]],
            vec![w; 4],
        )
    }

    /// 5-point rule, exact for cubics (one negative weight)
    pub fn tet_5point() -> Self {
        let a = 0.25;
        let b = 1.0 / 6.0;
        let c = 0.5;

        Self::from_barycentric(
            &[[a, a, a, a], [b, b, b, c], [b, b, c, b], [b, c, b, b], [c, b, b, b]],
            vec![-2.0 / 15.0, 3.0 / 40.0, 3.0 / 40.0, 3.0 / 40.0, 3.0 / 40.0],
        )
    }

    /// Gauss-Legendre rule with `n` points on [-1, 1] (n = 1, 2 or 3)
    ///
    /// # Panics
    /// Panics for other point counts.
    pub fn line(n: usize) -> Self {
        let (points, weights) = match n {
            1 => (vec![0.0], vec![2.0]),
            2 => {
                let p = 1.0 / 3.0f64.sqrt();
                (vec![-p, p], vec![1.0, 1.0])
            }
            3 => {
                let p = (3.0f64 / 5.0).sqrt();
                (vec![-p, 0.0, p], vec![5.0 / 9.0, 8.0 / 9.0, 5.0 / 9.0])
            }
            _ => panic!("Gauss-Legendre rule with {} points is not tabulated", n),
        };

        Self {
            points: points.into_iter().map(|p| vec![p]).collect(),
            weights,
        }
    }

    /// Get the number of integration points
    pub fn num_points(&self) -> usize {
        self.points.len()
    }
}
