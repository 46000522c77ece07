//! Finite-difference verifiers
//!
//! A [`Verifier`] owns a configuration, a seeded random source and a report
//! sink. Each check compares an analytic quantity produced by an element (or
//! basis) against a numerical derivative of a lower-level quantity the same
//! element produces:
//!
//! | Check                   | Analytic                  | Differenced            |
//! |-------------------------|---------------------------|------------------------|
//! | `element_residual`      | residual R                | energies T, U          |
//! | `element_jacobian`      | J·p                       | residual R             |
//! | `adj_res_product`       | p·d(ψᵀR)/dx               | ψᵀR over design vars   |
//! | `adj_res_xpt_product`   | p·d(ψᵀR)/dXpts            | ψᵀR over coordinates   |
//! | `element_basis`         | ∂N/∂ξ                     | shape functions N      |
//!
//! Every numerical derivative goes through
//! [`approximate_derivative`](crate::fd::approximate_derivative), so the same
//! check runs as a real central difference for `f64` and as a complex step
//! for `Complex64`.
//!
//! Disagreement is a [`Verdict::Fail`] inside `Ok`; `Err` is reserved for
//! malformed input and report I/O.

mod adjoint;
mod basis;
mod jacobian;
mod residual;

use std::fmt;
use std::io::{self, Write};

use tracing::{info, warn};

use crate::config::VerificationConfig;
use crate::error::VerifyResult;
use crate::fd::{print_error_components, ErrorSummary, RandomSource};
use crate::scalar::Scalar;

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Integer code: 0 for pass, 1 for fail
    pub fn code(self) -> i32 {
        match self {
            Verdict::Pass => 0,
            Verdict::Fail => 1,
        }
    }

    pub fn passed(self) -> bool {
        self == Verdict::Pass
    }

    fn from_failed(failed: bool) -> Self {
        if failed {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Result of one verifier call
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    /// Quantity that was checked (e.g. "K*u")
    pub check: &'static str,
    /// Element or basis name
    pub subject: String,
    /// Scalar mode the check ran in
    pub mode: &'static str,
    /// Maximum absolute and relative error
    pub summary: ErrorSummary,
    pub verdict: Verdict,
    /// First failing column of a Jacobian column sweep
    pub failing_column: Option<usize>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }

    /// Integer verdict code (0 = pass)
    pub fn code(&self) -> i32 {
        self.verdict.code()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} for {} ({}): max abs {:.3e} @ {}, max rel {:.3e} @ {}",
            self.verdict,
            self.check,
            self.subject,
            self.mode,
            self.summary.abs.value,
            self.summary.abs.index,
            self.summary.rel.value,
            self.summary.rel.index,
        )?;
        if let Some(col) = self.failing_column {
            write!(f, ", first failing column {}", col)?;
        }
        Ok(())
    }
}

/// Runs verification checks with a fixed configuration
///
/// Reports are written to the sink according to the configured print level.
/// Random directions are drawn from the verifier's own stream, so two
/// verifiers built with the same seed reproduce each other exactly.
pub struct Verifier<W: Write = io::Stderr> {
    config: VerificationConfig,
    rng: RandomSource,
    sink: W,
}

impl Verifier<io::Stderr> {
    /// Verifier reporting to stderr
    pub fn new(config: VerificationConfig) -> VerifyResult<Self> {
        Self::with_sink(config, io::stderr())
    }
}

impl<W: Write> Verifier<W> {
    /// Verifier reporting to a caller-supplied sink
    pub fn with_sink(config: VerificationConfig, sink: W) -> VerifyResult<Self> {
        config.validate()?;
        Ok(Self {
            rng: RandomSource::seeded(config.seed),
            config,
            sink,
        })
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Restart the random stream
    pub fn reseed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Compare, decide, log and report
    fn conclude<S: Scalar>(
        &mut self,
        check: &'static str,
        subject: &str,
        analytic: &[S],
        approximate: &[S],
    ) -> VerifyResult<VerificationReport> {
        let summary = ErrorSummary::compare(analytic, approximate)?;
        let report = self.finish(check, subject, S::MODE, summary, None);
        self.write_report(&report, analytic, approximate)?;
        Ok(report)
    }

    fn finish(
        &self,
        check: &'static str,
        subject: &str,
        mode: &'static str,
        summary: ErrorSummary,
        failing_column: Option<usize>,
    ) -> VerificationReport {
        let verdict = if failing_column.is_some() {
            Verdict::Fail
        } else {
            Verdict::from_failed(summary.fails(&self.config))
        };

        if verdict.passed() {
            info!(
                check,
                subject,
                mode,
                max_abs = summary.abs.value,
                max_rel = summary.rel.value,
                "verification passed"
            );
        } else {
            warn!(
                check,
                subject,
                mode,
                max_abs = summary.abs.value,
                abs_index = summary.abs.index,
                max_rel = summary.rel.value,
                rel_index = summary.rel.index,
                failing_column = ?failing_column,
                "verification failed"
            );
        }

        VerificationReport {
            check,
            subject: subject.to_string(),
            mode,
            summary,
            verdict,
            failing_column,
        }
    }

    fn write_report<S: Scalar>(
        &mut self,
        report: &VerificationReport,
        analytic: &[S],
        approximate: &[S],
    ) -> VerifyResult<()> {
        let level = self.config.print_level;
        if !level.prints_summary() {
            return Ok(());
        }

        let out = &mut self.sink;
        writeln!(out, "Testing {} for {} ({})", report.check, report.subject, report.mode)?;
        if let Some(col) = report.failing_column {
            writeln!(out, "Column {} fails.", col)?;
        }
        writeln!(
            out,
            "Max Err: {:10.4e} in component {}.",
            report.summary.abs.value, report.summary.abs.index
        )?;
        writeln!(
            out,
            "Max REr: {:10.4e} in component {}.",
            report.summary.rel.value, report.summary.rel.index
        )?;

        if level.prints_components() && !report.passed() {
            print_error_components(out, report.check, analytic, approximate)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrintLevel;
    use crate::fd::ErrorLocation;

    fn summary(abs: f64, rel: f64) -> ErrorSummary {
        ErrorSummary {
            abs: ErrorLocation { value: abs, index: 2 },
            rel: ErrorLocation { value: rel, index: 3 },
        }
    }

    #[test]
    fn test_verdict_codes() {
        assert_eq!(Verdict::Pass.code(), 0);
        assert_eq!(Verdict::Fail.code(), 1);
        assert!(Verdict::Pass.passed());
        assert_eq!(Verdict::Fail.to_string(), "FAIL");
    }

    #[test]
    fn test_finish_applies_policy() {
        let verifier = Verifier::with_sink(VerificationConfig::quiet(), Vec::new()).unwrap();

        let report = verifier.finish("K*u", "elem", "real", summary(1e-3, 1e-9), None);
        assert!(report.passed());

        let report = verifier.finish("K*u", "elem", "real", summary(1e-3, 1e-3), None);
        assert_eq!(report.verdict, Verdict::Fail);

        // A failing column forces the verdict
        let report = verifier.finish("K*u", "elem", "real", summary(0.0, 0.0), Some(4));
        assert_eq!(report.code(), 1);
        assert!(report.to_string().contains("first failing column 4"));
    }

    #[test]
    fn test_report_levels() {
        let a = [1.0, 2.0];
        let b = [1.0, 2.5];

        let config = VerificationConfig::default().with_print_level(PrintLevel::Silent);
        let mut verifier = Verifier::with_sink(config, Vec::new()).unwrap();
        verifier.conclude("Res error", "elem", &a, &b).unwrap();
        assert!(verifier.sink().is_empty());

        let config = VerificationConfig::default().with_print_level(PrintLevel::Summary);
        let mut verifier = Verifier::with_sink(config, Vec::new()).unwrap();
        verifier.conclude("Res error", "elem", &a, &b).unwrap();
        let text = String::from_utf8(verifier.into_sink()).unwrap();
        assert!(text.contains("Max Err:  5.0000e-1 in component 1."));
        assert!(!text.contains("Analytic"));

        let mut verifier = Verifier::with_sink(VerificationConfig::default(), Vec::new()).unwrap();
        verifier.conclude("Res error", "elem", &a, &b).unwrap();
        let text = String::from_utf8(verifier.into_sink()).unwrap();
        assert!(text.contains("Analytic"));
        assert!(text.contains("Res error[  1]"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = VerificationConfig::default().with_step(0.0);
        assert!(Verifier::with_sink(config, Vec::new()).is_err());
    }
}
