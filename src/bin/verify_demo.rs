use std::env;
use std::process::ExitCode;

use element_verify::{
    ElementState, JacobianCoefficients, LagrangeLineBasis, OscillatorElement, Scalar, Tet10Basis,
    TrussElement, VerificationConfig, VerificationReport, Verifier, VerifyResult,
};
use nalgebra::DMatrix;
use num_complex::Complex64;

/// Real-mode residual checks nest two differences and need a larger step
const REAL_RESIDUAL_STEP: f64 = 1e-4;

fn to_scalars<S: Scalar>(values: &[f64]) -> Vec<S> {
    values.iter().map(|&v| S::from_real(v)).collect()
}

/// Run every element check in scalar mode `S`
fn verify_elements<S>(config: VerificationConfig, residual_step: f64) -> VerifyResult<Vec<VerificationReport>>
where
    S: Scalar + Send + Sync,
{
    let mut verifier = Verifier::new(config)?;
    let mut residual_verifier = Verifier::new(config.with_step(residual_step))?;
    let mut reports = Vec::new();

    // Inclined bar, nondimensional properties
    let xpts = to_scalars::<S>(&[0.0, 0.0, 0.0, 1.2, 0.5, -0.3]);
    let vars = to_scalars::<S>(&[0.01, -0.02, 0.005, 0.03, 0.01, -0.01]);
    let dvars = to_scalars::<S>(&[0.4, -0.1, 0.2, -0.3, 0.5, 0.1]);
    let ddvars = to_scalars::<S>(&[1.0, 0.3, -0.7, 0.2, -0.4, 0.9]);
    let state = ElementState::new(&xpts, &vars, &dvars, &ddvars);

    let mut truss = TrussElement::<S>::new(10.0, 0.3, 2.0);
    reports.push(residual_verifier.element_residual(&truss, 0, 0.0, &state)?);
    reports.push(verifier.element_jacobian(&truss, 0, 0.0, &state, None)?);
    reports.push(verifier.element_jacobian_columns(&truss, 0, 0.0, &state)?);
    let x = truss.design_vars();
    reports.push(verifier.adj_res_product(&mut truss, 0, &x, 0.0, &state)?);
    reports.push(verifier.adj_res_xpt_product(&truss, 0, 0.0, &state)?);

    // Damped bar with Newmark coefficients (average acceleration)
    let damped = TrussElement::<S>::new(10.0, 0.3, 2.0)
        .with_damping(0.05)
        .with_coefficients(JacobianCoefficients::newmark(0.01, 0.25, 0.5));
    reports.push(verifier.element_jacobian(&damped, 0, 0.0, &state, None)?);
    reports.push(verifier.adj_res_xpt_product(&damped, 0, 0.0, &state)?);

    // Three-mass spring chain
    let m = DMatrix::from_diagonal_element(3, 3, 1.5);
    let c = DMatrix::from_diagonal_element(3, 3, 0.2);
    let k = DMatrix::from_row_slice(3, 3, &[2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 1.0]);
    let chain_xpts = to_scalars::<S>(&[0.0; 3]);
    let (q, dq, ddq) = (
        to_scalars::<S>(&[0.2, -0.1, 0.4]),
        to_scalars::<S>(&[1.0, 0.0, -0.5]),
        to_scalars::<S>(&[0.3, 0.3, -0.2]),
    );
    let chain_state = ElementState::new(&chain_xpts, &q, &dq, &ddq);

    let undamped = OscillatorElement::<S>::new(&m, &DMatrix::zeros(3, 3), &k);
    reports.push(residual_verifier.element_residual(&undamped, 0, 0.0, &chain_state)?);
    let mut chain = OscillatorElement::<S>::new(&m, &c, &k);
    reports.push(verifier.element_jacobian_columns(&chain, 0, 0.0, &chain_state)?);
    let s = to_scalars::<S>(&[1.0]);
    reports.push(verifier.adj_res_product(&mut chain, 0, &s, 0.0, &chain_state)?);

    Ok(reports)
}

fn run(config: VerificationConfig) -> VerifyResult<Vec<VerificationReport>> {
    println!("\n--- Real central difference ---");
    let mut reports = verify_elements::<f64>(config, REAL_RESIDUAL_STEP)?;

    println!("\n--- Complex step ---");
    reports.extend(verify_elements::<Complex64>(config, config.dh)?);

    println!("\n--- Basis functions ---");
    let mut verifier = Verifier::new(config)?;
    reports.push(verifier.element_basis(&Tet10Basis)?);
    reports.push(verifier.element_basis(&LagrangeLineBasis::new(3))?);

    Ok(reports)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_target(false).init();

    println!("=== Element Verification Demo ===\n");

    // Optional TOML configuration as the first argument
    let config = match env::args().nth(1) {
        Some(path) => match VerificationConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => VerificationConfig::default(),
    };
    println!("Configuration: {}", config);

    let reports = match run(config) {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("Verification aborted: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("\n=== Summary ===");
    for report in &reports {
        println!("  {}", report);
    }

    let failures = reports.iter().filter(|r| !r.passed()).count();
    println!("\n{} / {} checks passed", reports.len() - failures, reports.len());

    if failures == 0 {
        println!("\n✓ All checks passed");
        ExitCode::SUCCESS
    } else {
        println!("\n✗ {} checks failed", failures);
        ExitCode::FAILURE
    }
}
