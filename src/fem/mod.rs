pub mod basis;
pub mod quadrature;
pub mod truss;
pub mod oscillator;

pub use basis::{LagrangeLineBasis, Tet10Basis};
pub use quadrature::GaussQuadrature;
pub use truss::TrussElement;
pub use oscillator::OscillatorElement;
