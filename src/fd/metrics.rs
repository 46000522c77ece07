/// Error metrics between analytic and approximate results
///
/// Errors are measured on real parts. Relative errors are normalised by the
/// analytic value with a floor, so components that are exactly zero do not
/// divide by zero.

use std::io::{self, Write};

use crate::config::VerificationConfig;
use crate::error::{ensure_len, VerifyError, VerifyResult};
use crate::scalar::Scalar;

/// Floor for relative-error denominators
pub const REL_ERROR_FLOOR: f64 = 1e-30;

/// Largest error and the first index at which it occurs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorLocation {
    pub value: f64,
    pub index: usize,
}

/// Maximum absolute and relative error over a comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorSummary {
    pub abs: ErrorLocation,
    pub rel: ErrorLocation,
}

impl ErrorSummary {
    /// Compare analytic values `a` against approximations `b`
    pub fn compare<S: Scalar>(a: &[S], b: &[S]) -> VerifyResult<Self> {
        Ok(Self {
            abs: max_error(a, b)?,
            rel: max_rel_error(a, b)?,
        })
    }

    /// Whether the errors exceed the configured tolerances
    ///
    /// A non-finite error always fails, whatever the policy.
    pub fn fails(&self, config: &VerificationConfig) -> bool {
        if !self.is_finite() {
            return true;
        }
        config.failure_policy.fails(
            self.abs.value > config.fail_atol,
            self.rel.value > config.fail_rtol,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.abs.value.is_finite() && self.rel.value.is_finite()
    }

    /// Whether `self` has a strictly larger absolute error than `other`
    ///
    /// NaN ranks above every other error.
    pub fn is_worse_than(&self, other: &Self) -> bool {
        match (self.abs.value.is_nan(), other.abs.value.is_nan()) {
            (true, false) => true,
            (_, true) => false,
            (false, false) => self.abs.value > other.abs.value,
        }
    }
}

fn max_over<S, F>(a: &[S], b: &[S], mut error: F) -> VerifyResult<ErrorLocation>
where
    S: Scalar,
    F: FnMut(S, S) -> f64,
{
    ensure_len("compared arrays", a.len(), b.len())?;
    if a.is_empty() {
        return Err(VerifyError::EmptyInput("compared arrays"));
    }

    let mut max = ErrorLocation { value: 0.0, index: 0 };
    for (i, (&ai, &bi)) in a.iter().zip(b).enumerate() {
        let er = error(ai, bi);
        // NaN is never exceeded; report the first one
        if er.is_nan() {
            return Ok(ErrorLocation { value: f64::NAN, index: i });
        }
        if i == 0 || er > max.value {
            max = ErrorLocation { value: er, index: i };
        }
    }
    Ok(max)
}

/// Largest `|a_i - b_i|`
pub fn max_error<S: Scalar>(a: &[S], b: &[S]) -> VerifyResult<ErrorLocation> {
    max_over(a, b, |ai, bi| (ai - bi).real().abs())
}

/// Largest `|a_i - b_i| / max(|a_i|, REL_ERROR_FLOOR)`
pub fn max_rel_error<S: Scalar>(a: &[S], b: &[S]) -> VerifyResult<ErrorLocation> {
    max_over(a, b, |ai, bi| {
        (ai - bi).real().abs() / ai.real().abs().max(REL_ERROR_FLOOR)
    })
}

/// Write analytic values, approximations and relative errors, one line per component
///
/// The relative error column is left blank where the analytic value is zero.
pub fn print_error_components<S: Scalar, W: Write + ?Sized>(
    out: &mut W,
    descript: &str,
    a: &[S],
    b: &[S],
) -> io::Result<()> {
    writeln!(
        out,
        "{:>width$}[   ] {:>15} {:>15} {:>15}",
        "Val",
        "Analytic",
        "Approximate",
        "Rel. Error",
        width = descript.len()
    )?;
    for (i, (&ai, &bi)) in a.iter().zip(b).enumerate() {
        let (ar, br) = (ai.real(), bi.real());
        if ar != 0.0 {
            writeln!(
                out,
                "{}[{:3}] {:15.6e} {:15.6e} {:15.4e}",
                descript,
                i,
                ar,
                br,
                ((ar - br) / ar).abs()
            )?;
        } else {
            writeln!(out, "{}[{:3}] {:15.6e} {:15.6e}", descript, i, ar, br)?;
        }
    }
    Ok(())
}
