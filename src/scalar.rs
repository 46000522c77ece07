/// Scalar kinds for finite-difference verification
///
/// Every verifier is written once against [`Scalar`]. The implementing type
/// decides how a derivative is extracted from perturbed evaluations:
///
/// ```text
/// f64        (real step):     f'·p ≈ [f(x + h p) - f(x - h p)] / 2h
/// Complex64  (complex step):  f'·p ≈ Im f(x + i h p) / h
/// ```
///
/// The complex step involves no subtraction of nearly equal numbers, so `h`
/// can be taken as small as 1e-30 and the estimate is accurate to machine
/// precision. The real step trades truncation error O(h²) against round-off
/// error O(ε/h).
///
/// # References
/// - Squire & Trapp (1998), "Using complex variables to estimate derivatives of real functions"
/// - Martins, Sturdza & Alonso (2003), "The complex-step derivative approximation"

use nalgebra::ComplexField;
use num_complex::Complex64;
use rand::Rng;

/// Numeric type used by elements and verifiers
///
/// `RealField = f64` means [`ComplexField::real`] and [`ComplexField::abs`]
/// return plain `f64` values, which is what error metrics are measured in.
pub trait Scalar: ComplexField<RealField = f64> + Copy + PartialEq {
    /// True when derivatives come from the imaginary part
    const COMPLEX_STEP: bool;

    /// Short label used in logs and reports
    const MODE: &'static str;

    /// Increment applied along a perturbation direction: `h` or `i·h`
    fn step(dh: f64) -> Self;

    /// Derivative estimate from a forward and a backward evaluation
    ///
    /// The backward value is ignored for complex-step scalars.
    fn difference(forward: Self, backward: Self, dh: f64) -> Self;

    /// Uniform sample in `[lower, upper]`
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R, lower: Self, upper: Self) -> Self;
}

impl Scalar for f64 {
    const COMPLEX_STEP: bool = false;
    const MODE: &'static str = "real central difference";

    fn step(dh: f64) -> Self {
        dh
    }

    fn difference(forward: Self, backward: Self, dh: f64) -> Self {
        0.5 * (forward - backward) / dh
    }

    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R, lower: Self, upper: Self) -> Self {
        lower + (upper - lower) * rng.gen::<f64>()
    }
}

impl Scalar for Complex64 {
    const COMPLEX_STEP: bool = true;
    const MODE: &'static str = "complex step";

    fn step(dh: f64) -> Self {
        Complex64::new(0.0, dh)
    }

    fn difference(forward: Self, _backward: Self, dh: f64) -> Self {
        Complex64::new(forward.im / dh, 0.0)
    }

    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R, lower: Self, upper: Self) -> Self {
        let re = lower.re + (upper.re - lower.re) * rng.gen::<f64>();
        // Only randomize the imaginary part when the caller asked for it
        let im = if lower.im != upper.im {
            lower.im + (upper.im - lower.im) * rng.gen::<f64>()
        } else {
            lower.im
        };
        Complex64::new(re, im)
    }
}

/// Zero-filled buffer of scalars
pub fn zeros<S: Scalar>(n: usize) -> Vec<S> {
    vec![S::zero(); n]
}

/// Inner product `Σ a_i b_i` (no conjugation; complex-step needs the analytic continuation)
pub fn dot<S: Scalar>(a: &[S], b: &[S]) -> S {
    a.iter()
        .zip(b.iter())
        .fold(S::zero(), |acc, (&x, &y)| acc + x * y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_real_central_difference() {
        // f(x) = x^3 at x = 2, f' = 12
        let h = 1e-5;
        let f = |x: f64| x * x * x;
        let d = f64::difference(f(2.0 + h), f(2.0 - h), h);
        assert_relative_eq!(d, 12.0, epsilon = 1e-8);
    }

    #[test]
    fn test_complex_step_is_exact() {
        // f(x) = exp(x) sin(x) at x = 1.5
        let h = 1e-30;
        let x = Complex64::new(1.5, 0.0) + Complex64::step(h);
        let fx = x.exp() * x.sin();
        let d = Complex64::difference(fx, Complex64::new(0.0, 0.0), h);

        let expected = 1.5f64.exp() * (1.5f64.sin() + 1.5f64.cos());
        assert_relative_eq!(d.re, expected, epsilon = 1e-14);
        assert_eq!(d.im, 0.0);
    }

    #[test]
    fn test_sample_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1000 {
            let v = f64::sample_uniform(&mut rng, -2.0, 5.0);
            assert!((-2.0..=5.0).contains(&v));
        }
    }

    #[test]
    fn test_complex_sample_keeps_imaginary_part() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let lower = Complex64::new(-1.0, 0.0);
        let upper = Complex64::new(1.0, 0.0);
        for _ in 0..100 {
            let v = Complex64::sample_uniform(&mut rng, lower, upper);
            assert_eq!(v.im, 0.0);
            assert!(v.re >= -1.0 && v.re <= 1.0);
        }

        let lower = Complex64::new(0.0, -3.0);
        let upper = Complex64::new(0.0, 3.0);
        let v = Complex64::sample_uniform(&mut rng, lower, upper);
        assert!(v.im >= -3.0 && v.im <= 3.0);
    }

    #[test]
    fn test_dot_has_no_conjugate() {
        let a = [Complex64::new(1.0, 1.0), Complex64::new(2.0, 0.0)];
        let b = [Complex64::new(1.0, 1.0), Complex64::new(3.0, 0.0)];
        // (1+i)^2 + 6 = 2i + 6
        let d = dot(&a, &b);
        assert_relative_eq!(d.re, 6.0);
        assert_relative_eq!(d.im, 2.0);
    }
}
