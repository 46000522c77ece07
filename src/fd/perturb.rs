/// Perturbation and differencing
///
/// Forward/backward perturbed copies of a state along a direction, and the
/// single routine that turns perturbed evaluations into a derivative
/// estimate for either scalar kind:
///
/// ```text
/// real:     out = orig ± h·pert          d ≈ (f₊ - f₋) / 2h
/// complex:  out = orig + i·h·pert        d ≈ Im(f₊) / h
/// ```

use crate::error::{ensure_len, ensure_step, VerifyResult};
use crate::scalar::{zeros, Scalar};

/// Side of a perturbation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Sides that must be evaluated for scalar kind `S`
    pub fn required<S: Scalar>() -> &'static [Direction] {
        if S::COMPLEX_STEP {
            &[Direction::Forward]
        } else {
            &[Direction::Forward, Direction::Backward]
        }
    }
}

/// Perturb in the forward sense: `out = orig + step(dh) * pert`
pub fn forward_perturb<S: Scalar>(out: &mut [S], orig: &[S], pert: &[S], dh: f64) -> VerifyResult<()> {
    ensure_len("perturbed output", orig.len(), out.len())?;
    ensure_len("perturbation direction", orig.len(), pert.len())?;

    let step = S::step(dh);
    for ((o, &x), &p) in out.iter_mut().zip(orig).zip(pert) {
        *o = x + step * p;
    }
    Ok(())
}

/// Perturb in the backward sense: `out = orig - step(dh) * pert`
pub fn backward_perturb<S: Scalar>(out: &mut [S], orig: &[S], pert: &[S], dh: f64) -> VerifyResult<()> {
    ensure_len("perturbed output", orig.len(), out.len())?;
    ensure_len("perturbation direction", orig.len(), pert.len())?;

    let step = S::step(dh);
    for ((o, &x), &p) in out.iter_mut().zip(orig).zip(pert) {
        *o = x - step * p;
    }
    Ok(())
}

/// Perturb on the requested side
pub fn perturb<S: Scalar>(
    direction: Direction,
    out: &mut [S],
    orig: &[S],
    pert: &[S],
    dh: f64,
) -> VerifyResult<()> {
    match direction {
        Direction::Forward => forward_perturb(out, orig, pert, dh),
        Direction::Backward => backward_perturb(out, orig, pert, dh),
    }
}

/// Overwrite `forward` with the finite-difference estimate
///
/// `backward` is only read for real scalars; complex-step callers may pass
/// an empty slice.
pub fn form_diff_approximate<S: Scalar>(forward: &mut [S], backward: &[S], dh: f64) -> VerifyResult<()> {
    ensure_step(dh)?;

    if S::COMPLEX_STEP {
        for f in forward.iter_mut() {
            *f = S::difference(*f, S::zero(), dh);
        }
    } else {
        ensure_len("backward evaluation", forward.len(), backward.len())?;
        for (f, &b) in forward.iter_mut().zip(backward) {
            *f = S::difference(*f, b, dh);
        }
    }
    Ok(())
}

/// Evaluate a function at the perturbed points and difference the results
///
/// `evaluate` is called once per required side (forward only for complex
/// step) and must return outputs of equal length.
pub fn approximate_derivative<S, F>(dh: f64, mut evaluate: F) -> VerifyResult<Vec<S>>
where
    S: Scalar,
    F: FnMut(Direction) -> VerifyResult<Vec<S>>,
{
    ensure_step(dh)?;

    let mut forward = evaluate(Direction::Forward)?;
    let backward = if S::COMPLEX_STEP {
        Vec::new()
    } else {
        evaluate(Direction::Backward)?
    };

    form_diff_approximate(&mut forward, &backward, dh)?;
    Ok(forward)
}

/// Directional derivative of a vector function of one vector argument
///
/// Convenience wrapper around [`approximate_derivative`] for the common case
/// `d/dh f(x + h p)`.
pub fn directional_derivative<S, F>(x: &[S], p: &[S], dh: f64, mut f: F) -> VerifyResult<Vec<S>>
where
    S: Scalar,
    F: FnMut(&[S]) -> VerifyResult<Vec<S>>,
{
    let mut xp = zeros(x.len());
    approximate_derivative(dh, |side| {
        perturb(side, &mut xp, x, p, dh)?;
        f(&xp)
    })
}
