/// Basis derivative self-check across bases and step sizes
///
/// Every shipped basis must pass the parametric-derivative check, and the
/// worst error should shrink with the step until round-off takes over.

use element_verify::{
    ElementBasis, LagrangeLineBasis, PrintLevel, Tet10Basis, VerificationConfig, Verifier,
};

fn basis_error<B: ElementBasis>(basis: &B, dh: f64) -> (f64, bool) {
    let config = VerificationConfig::quiet().with_step(dh);
    let mut verifier = Verifier::with_sink(config, Vec::new()).unwrap();
    let report = verifier.element_basis(basis).unwrap();
    (report.summary.abs.value, report.passed())
}

#[test]
fn benchmark_all_bases_pass() {
    println!("\n=== Benchmark: Basis Self-Check ===");

    let (err, passed) = basis_error(&Tet10Basis, 1e-7);
    println!("  {:<24} max err = {:.3e}", Tet10Basis.name(), err);
    assert!(passed);

    for order in 1..=6 {
        let basis = LagrangeLineBasis::new(order);
        let (err, passed) = basis_error(&basis, 1e-7);
        println!("  {:<18} p = {}  max err = {:.3e}", basis.name(), order, err);
        assert!(passed, "order {} failed with error {:e}", order, err);
    }
}

#[test]
fn benchmark_step_convergence() {
    println!("\n=== Benchmark: Step Convergence (Lagrange p = 5) ===");
    let basis = LagrangeLineBasis::new(5);

    let coarse = basis_error(&basis, 1e-1).0;
    let fine = basis_error(&basis, 1e-3).0;
    println!("  dh = 1e-1: {:.3e}", coarse);
    println!("  dh = 1e-3: {:.3e}", fine);

    // O(h²): two decades of h give roughly four decades of error
    assert!(fine < coarse * 1e-2);
}

#[test]
fn benchmark_report_output() {
    let config = VerificationConfig::default().with_print_level(PrintLevel::Summary);
    let mut verifier = Verifier::with_sink(config, Vec::new()).unwrap();
    verifier.element_basis(&Tet10Basis).unwrap();

    let text = String::from_utf8(verifier.into_sink()).unwrap();
    println!("{}", text);
    assert!(text.contains("Testing dN/dp for Tet10Basis"));
}
