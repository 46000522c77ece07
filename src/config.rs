//! Configuration for element verification
//!
//! Step size, report verbosity, tolerances and the random seed are carried in
//! one explicit structure passed to every [`Verifier`](crate::Verifier).
//! Configurations can be read from TOML; every field has a default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{VerifyError, VerifyResult};

/// Default finite-difference step
pub const DEFAULT_STEP: f64 = 1e-7;

/// Default absolute and relative failure tolerance
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// How much diagnostic text a verifier writes to its report sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PrintLevel {
    /// Nothing is written
    Silent = 0,
    /// Maximum errors and their component index
    Summary = 1,
    /// Summary plus a component-by-component dump when a check fails
    Full = 2,
}

impl PrintLevel {
    /// Whether the summary lines are written
    pub fn prints_summary(self) -> bool {
        self >= PrintLevel::Summary
    }

    /// Whether the component dump is written
    pub fn prints_components(self) -> bool {
        self >= PrintLevel::Full
    }
}

impl Default for PrintLevel {
    fn default() -> Self {
        PrintLevel::Full
    }
}

impl TryFrom<u8> for PrintLevel {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(PrintLevel::Silent),
            1 => Ok(PrintLevel::Summary),
            2 => Ok(PrintLevel::Full),
            other => Err(format!("print level must be 0, 1 or 2, got {}", other)),
        }
    }
}

impl From<PrintLevel> for u8 {
    fn from(level: PrintLevel) -> Self {
        level as u8
    }
}

/// Rule combining the absolute and relative gates into a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail only when both the absolute and the relative error exceed their
    /// tolerances. Quantities near machine zero do not trip on relative
    /// error alone.
    #[default]
    Both,
    /// Fail when either tolerance is exceeded.
    Either,
}

impl FailurePolicy {
    /// Apply the policy to the two gate outcomes
    pub fn fails(self, abs_exceeded: bool, rel_exceeded: bool) -> bool {
        match self {
            FailurePolicy::Both => abs_exceeded && rel_exceeded,
            FailurePolicy::Either => abs_exceeded || rel_exceeded,
        }
    }
}

/// Verification parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Finite-difference step (real central difference or complex step)
    #[serde(default = "default_step")]
    pub dh: f64,

    /// Report verbosity (0, 1 or 2)
    #[serde(default)]
    pub print_level: PrintLevel,

    /// Absolute error tolerance
    #[serde(default = "default_tolerance")]
    pub fail_atol: f64,

    /// Relative error tolerance
    #[serde(default = "default_tolerance")]
    pub fail_rtol: f64,

    /// How the two tolerances combine
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Seed of the random source used for directions and coefficients
    #[serde(default)]
    pub seed: u64,
}

fn default_step() -> f64 { DEFAULT_STEP }
fn default_tolerance() -> f64 { DEFAULT_TOLERANCE }

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            dh: DEFAULT_STEP,
            print_level: PrintLevel::default(),
            fail_atol: DEFAULT_TOLERANCE,
            fail_rtol: DEFAULT_TOLERANCE,
            failure_policy: FailurePolicy::default(),
            seed: 0,
        }
    }
}

impl VerificationConfig {
    /// Silent configuration, handy in test harnesses
    pub fn quiet() -> Self {
        Self {
            print_level: PrintLevel::Silent,
            ..Self::default()
        }
    }

    /// Set the finite-difference step
    pub fn with_step(mut self, dh: f64) -> Self {
        self.dh = dh;
        self
    }

    /// Set both tolerances
    pub fn with_tolerances(mut self, fail_atol: f64, fail_rtol: f64) -> Self {
        self.fail_atol = fail_atol;
        self.fail_rtol = fail_rtol;
        self
    }

    /// Set the report verbosity
    pub fn with_print_level(mut self, print_level: PrintLevel) -> Self {
        self.print_level = print_level;
        self
    }

    /// Set the failure policy
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check that the step and tolerances are usable
    pub fn validate(&self) -> VerifyResult<()> {
        if !self.dh.is_finite() || self.dh == 0.0 {
            return Err(VerifyError::InvalidStep(self.dh));
        }
        if !self.fail_atol.is_finite() || self.fail_atol < 0.0 {
            return Err(VerifyError::invalid_config(format!(
                "fail_atol must be finite and non-negative, got {}",
                self.fail_atol
            )));
        }
        if !self.fail_rtol.is_finite() || self.fail_rtol < 0.0 {
            return Err(VerifyError::invalid_config(format!(
                "fail_rtol must be finite and non-negative, got {}",
                self.fail_rtol
            )));
        }
        Ok(())
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(contents: &str) -> VerifyResult<Self> {
        let config: VerificationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> VerifyResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| VerifyError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

impl fmt::Display for VerificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dh = {:.1e}, print level = {}, atol = {:.1e}, rtol = {:.1e}, policy = {:?}, seed = {}",
            self.dh,
            u8::from(self.print_level),
            self.fail_atol,
            self.fail_rtol,
            self.failure_policy,
            self.seed
        )
    }
}
