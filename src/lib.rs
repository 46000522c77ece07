pub mod config;
pub mod error;
pub mod scalar;
pub mod fd;
pub mod element;
pub mod fem;
pub mod verify;

pub use config::{FailurePolicy, PrintLevel, VerificationConfig};
pub use error::{VerifyError, VerifyResult};
pub use scalar::Scalar;
pub use fd::{ErrorLocation, ErrorSummary, RandomSource};
pub use element::{Element, ElementBasis, ElementState, Energies, JacobianCoefficients};
pub use fem::{GaussQuadrature, LagrangeLineBasis, OscillatorElement, Tet10Basis, TrussElement};
pub use verify::{VerificationReport, Verdict, Verifier};
