/// Finite-difference building blocks
///
/// - Reproducible random vectors and coefficients
/// - Forward/backward perturbation and derivative estimates
/// - Error metrics and component reports

pub mod random;
pub mod perturb;
pub mod metrics;

pub use random::{generate_random_array, generate_random_vec, RandomSource};
pub use perturb::{
    approximate_derivative, backward_perturb, directional_derivative, form_diff_approximate,
    forward_perturb, perturb, Direction,
};
pub use metrics::{
    max_error, max_rel_error, print_error_components, ErrorLocation, ErrorSummary,
    REL_ERROR_FLOOR,
};
