/// Residual check against Lagrange's equations
///
/// With L = T - U the residual of a conservative element must satisfy
///
/// ```text
/// R = d/dt(∂L/∂q̇) - ∂L/∂q
/// ```
///
/// The state is advanced to t ± h with a second-order Taylor expansion
///
/// ```text
/// q(t ± h) = q ± h q̇ + ½ h² q̈
/// q̇(t ± h) = q̇ ± h q̈
/// ```
///
/// ∂L/∂q̇ is differenced from the energies at both times and the time
/// derivative taken as a real central difference. In real mode this nests two
/// differences, so round-off grows like ε/h²; steps near 1e-4 work well there,
/// while complex step is accurate with the default step.

use tracing::debug;

use super::{VerificationReport, Verifier};
use crate::element::{Element, ElementState};
use crate::error::VerifyResult;
use crate::fd::{approximate_derivative, perturb};
use crate::scalar::{zeros, Scalar};
use std::io::Write;

/// Block of the state the energies are differenced against
#[derive(Clone, Copy)]
enum StateBlock {
    Vars,
    Dvars,
}

/// Gradient of L with respect to one state block, one component at a time
///
/// T and U are differenced separately and subtracted afterwards, so a large
/// potential energy does not swamp the kinetic contribution.
fn lagrangian_gradient<S, E>(
    element: &E,
    elem_index: usize,
    time: f64,
    state: &ElementState<'_, S>,
    block: StateBlock,
    dh: f64,
) -> VerifyResult<Vec<S>>
where
    S: Scalar,
    E: Element<S> + ?Sized,
{
    let n = element.num_variables();
    let orig = match block {
        StateBlock::Vars => state.vars,
        StateBlock::Dvars => state.dvars,
    };

    let mut grad = zeros(n);
    let mut unit = zeros::<S>(n);
    let mut perturbed = zeros::<S>(n);

    for k in 0..n {
        unit[k] = S::one();
        let d = approximate_derivative(dh, |side| {
            perturb(side, &mut perturbed, orig, &unit, dh)?;
            let st = match block {
                StateBlock::Vars => state.with_vars(&perturbed, state.dvars, state.ddvars),
                StateBlock::Dvars => state.with_vars(state.vars, &perturbed, state.ddvars),
            };
            let e = element.compute_energies(elem_index, time, &st);
            Ok(vec![e.kinetic, e.potential])
        })?;
        unit[k] = S::zero();

        grad[k] = d[0] - d[1];
    }

    Ok(grad)
}

impl<W: Write> Verifier<W> {
    /// Check the residual against finite differences of the element energies
    ///
    /// Only meaningful for elements whose residual is fully derived from
    /// T and U (no damping or external forcing).
    pub fn element_residual<S, E>(
        &mut self,
        element: &E,
        elem_index: usize,
        time: f64,
        state: &ElementState<'_, S>,
    ) -> VerifyResult<VerificationReport>
    where
        S: Scalar,
        E: Element<S> + ?Sized,
    {
        state.check(element)?;
        let dh = self.config.dh;
        debug!(element = element.name(), mode = S::MODE, dh, "checking residual");

        let n = element.num_variables();
        let h = S::from_real(dh);
        let half_h2 = S::from_real(0.5 * dh * dh);

        // State at t - h (index 0) and t + h (index 1)
        let mut q = [zeros::<S>(n), zeros::<S>(n)];
        let mut qdot = [zeros::<S>(n), zeros::<S>(n)];
        for i in 0..n {
            let (v, dv, ddv) = (state.vars[i], state.dvars[i], state.ddvars[i]);
            q[0][i] = v - h * dv + half_h2 * ddv;
            q[1][i] = v + h * dv + half_h2 * ddv;
            qdot[0][i] = dv - h * ddv;
            qdot[1][i] = dv + h * ddv;
        }

        let before = state.with_vars(&q[0], &qdot[0], state.ddvars);
        let after = state.with_vars(&q[1], &qdot[1], state.ddvars);
        let dl_dqdot_before =
            lagrangian_gradient(element, elem_index, time - dh, &before, StateBlock::Dvars, dh)?;
        let dl_dqdot_after =
            lagrangian_gradient(element, elem_index, time + dh, &after, StateBlock::Dvars, dh)?;
        let dl_dq = lagrangian_gradient(element, elem_index, time, state, StateBlock::Vars, dh)?;

        // d/dt(∂L/∂q̇) - ∂L/∂q
        let inv_2h = S::from_real(0.5 / dh);
        let fd: Vec<S> = (0..n)
            .map(|i| (dl_dqdot_after[i] - dl_dqdot_before[i]) * inv_2h - dl_dq[i])
            .collect();

        let mut res = zeros(n);
        element.compute_residual(elem_index, time, state, &mut res);

        self.conclude("Res error", element.name(), &res, &fd)
    }
}
