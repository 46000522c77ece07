/// Step-size study for real central differences vs. complex step
///
/// The nodal-coordinate derivative of the truss is nonlinear, so the real
/// central difference shows the classic V-shaped error curve: truncation
/// error O(h²) for large steps, round-off error O(ε/h) for small ones. The
/// complex step has no subtractive cancellation and stays at machine
/// precision down to h = 1e-30.

use element_verify::{ElementState, Scalar, TrussElement, VerificationConfig, Verifier};
use num_complex::Complex64;

const STEPS: [f64; 8] = [1e-1, 1e-2, 1e-4, 1e-6, 1e-8, 1e-10, 1e-12, 1e-30];

fn xpt_error<S: Scalar>(dh: f64) -> f64 {
    let to_s = |v: &[f64]| -> Vec<S> { v.iter().map(|&x| S::from_real(x)).collect() };
    let xpts = to_s(&[0.0, 0.0, 0.0, 0.9, 0.7, -0.4]);
    let vars = to_s(&[0.02, -0.01, 0.0, 0.05, 0.03, -0.02]);
    let dvars = to_s(&[0.5, 0.1, -0.2, 0.0, 0.3, 0.2]);
    let ddvars = to_s(&[0.0, -1.0, 0.4, 0.6, 0.0, 0.1]);
    let state = ElementState::new(&xpts, &vars, &dvars, &ddvars);

    let truss = TrussElement::<S>::new(50.0, 0.2, 1.0);
    let config = VerificationConfig::quiet().with_step(dh);
    let mut verifier = Verifier::with_sink(config, Vec::new()).unwrap();
    let report = verifier.adj_res_xpt_product(&truss, 0, 0.0, &state).unwrap();
    report.summary.abs.value
}

#[test]
fn benchmark_step_size_sweep() {
    println!("\n=== Benchmark: Step Size Sweep (Adj-Res Xpt product) ===");
    println!("{:>10} {:>15} {:>15}", "dh", "real error", "complex error");

    let mut real_errors = Vec::new();
    let mut complex_errors = Vec::new();
    for &dh in &STEPS {
        let real = xpt_error::<f64>(dh);
        let complex = xpt_error::<Complex64>(dh);
        println!("{:>10.0e} {:>15.4e} {:>15.4e}", dh, real, complex);
        real_errors.push(real);
        complex_errors.push(complex);
    }

    // Real: truncation dominates at h = 0.1, both are small near h = 1e-6
    assert!(real_errors[0] > real_errors[3]);
    assert!(real_errors[3] < 1e-7, "real error at 1e-6: {:e}", real_errors[3]);

    // Complex: no round-off floor
    for (dh, err) in STEPS.iter().zip(&complex_errors).skip(4) {
        assert!(*err < 1e-12, "complex error at {:e}: {:e}", dh, err);
    }

    println!("✓ Complex step stays at machine precision for small steps");
}

#[test]
fn benchmark_default_step_passes_both_modes() {
    println!("\n=== Benchmark: Default Step ===");
    let dh = VerificationConfig::default().dh;
    let real = xpt_error::<f64>(dh);
    let complex = xpt_error::<Complex64>(dh);
    println!("  dh = {:e}: real {:.3e}, complex {:.3e}", dh, real, complex);

    assert!(real < 1e-5);
    assert!(complex < 1e-10);
}
