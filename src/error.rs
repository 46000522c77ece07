//! Error types for verification operations.
//!
//! A verification that finds a mismatch between analytic and numerical
//! derivatives is not an error: it is reported as [`Verdict::Fail`] inside
//! `Ok`. The variants below cover malformed input, configuration problems and
//! I/O on the report sink.
//!
//! [`Verdict::Fail`]: crate::verify::Verdict::Fail

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for verification operations.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Errors that can occur while setting up or running a verification.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The finite-difference step is zero or not finite.
    #[error("finite-difference step must be finite and nonzero, got {0}")]
    InvalidStep(f64),

    /// Two arrays that must have the same length do not.
    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An array that must be non-empty is empty.
    #[error("{0} is empty")]
    EmptyInput(&'static str),

    /// A Jacobian column index is out of range.
    #[error("column {col} out of range for element with {num_vars} variables")]
    ColumnOutOfRange { col: usize, num_vars: usize },

    /// Configuration values are invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to parse a configuration file.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Failed to write the diagnostic report.
    #[error("failed to write report: {0}")]
    Report(#[from] io::Error),
}

impl VerifyError {
    /// Create a length mismatch error.
    #[must_use]
    pub const fn length_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            what,
            expected,
            actual,
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }
}

/// Check that `actual` has the expected length.
pub(crate) fn ensure_len(what: &'static str, expected: usize, actual: usize) -> VerifyResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(VerifyError::length_mismatch(what, expected, actual))
    }
}

/// Check that a finite-difference step is usable.
pub(crate) fn ensure_step(dh: f64) -> VerifyResult<()> {
    if dh.is_finite() && dh != 0.0 {
        Ok(())
    } else {
        Err(VerifyError::InvalidStep(dh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VerifyError::InvalidStep(0.0);
        assert!(format!("{err}").contains("nonzero"));

        let err = VerifyError::length_mismatch("vars", 6, 5);
        let msg = format!("{err}");
        assert!(msg.contains("vars"));
        assert!(msg.contains('6'));
        assert!(msg.contains('5'));

        let err = VerifyError::ColumnOutOfRange { col: 7, num_vars: 6 };
        assert!(format!("{err}").contains("column 7"));

        let err = VerifyError::invalid_config("bad tolerance");
        assert!(format!("{err}").contains("bad tolerance"));
    }

    #[test]
    fn test_ensure_step() {
        assert!(ensure_step(1e-7).is_ok());
        assert!(ensure_step(-1e-7).is_ok());
        assert!(matches!(ensure_step(0.0), Err(VerifyError::InvalidStep(_))));
        assert!(matches!(ensure_step(f64::NAN), Err(VerifyError::InvalidStep(_))));
        assert!(matches!(ensure_step(f64::INFINITY), Err(VerifyError::InvalidStep(_))));
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("a", 3, 3).is_ok());
        assert!(matches!(
            ensure_len("a", 3, 2),
            Err(VerifyError::LengthMismatch { expected: 3, actual: 2, .. })
        ));
    }
}
