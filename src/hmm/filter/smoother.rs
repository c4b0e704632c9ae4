//! Backward pass and forward–backward smoother.
//!
//! Purpose
//! -------
//! Produce the smoothed marginal `P(x_t | all observations)` for every step
//! by combining the forward trace with a second forward run over the
//! reversed sequence.
//!
//! Key behaviors
//! -------------
//! - [`backward`] is literally the forward filter applied to
//!   `emissions.reversed()` with `boundaries.swapped()`. Its trace is indexed
//!   in reversed time: index `s` corresponds to original step `N - 1 - s`.
//! - [`smooth`] forms `γ_t = normalize(filtered_t ⊙ b_t)` where `b_t` is the
//!   reversed run's prediction at index `N - 1 - t` for `t < N - 1`, and
//!   `b_{N-1} = 1`. With a symmetric kernel that prediction is proportional
//!   to the classical backward message `β_t`, so no division by the local
//!   evidence is needed.
//! - [`forward_backward`] builds the kernels once and runs both passes.
//!
//! Invariants & assumptions
//! ------------------------
//! - `γ_{N-1}` equals the last forward filtered map (terminal boundary
//!   included).
//! - `γ_0` equals the last filtered map of the backward pass up to rounding.
//! - A degenerate step in either pass turns the affected marginals into NaN;
//!   no error is raised.
use crate::hmm::{
    core::{
        data::{BoundaryConditions, EmissionSequence},
        grid::{Domain, Mask},
        kernel::KernelCache,
        normalize::normalize,
        options::FilterOptions,
        params::ModelParams,
        validation::validate_problem_shapes,
    },
    errors::HMMResult,
    filter::forward::{FilterTrace, forward, forward_with_cache},
};
use ndarray::{Array1, Array3, ArrayView2, Axis};

/// Posterior — smoothed marginals plus the forward constants of the same run.
#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    marginals: Array3<f64>,
    constants: Array1<f64>,
}

impl Posterior {
    /// `(n, rows, cols)` smoothed marginals.
    pub fn marginals(&self) -> &Array3<f64> {
        &self.marginals
    }

    /// Smoothed marginal at step `t`.
    pub fn marginal(&self, t: usize) -> ArrayView2<'_, f64> {
        self.marginals.index_axis(Axis(0), t)
    }

    /// Forward normalization constants.
    pub fn constants(&self) -> &Array1<f64> {
        &self.constants
    }

    pub fn into_marginals(self) -> Array3<f64> {
        self.marginals
    }
}

/// Backward pass: the forward filter on the reversed problem.
///
/// # Errors
/// - Same as [`forward`].
pub fn backward(
    domain: &Domain, emissions: &EmissionSequence, boundaries: &BoundaryConditions,
    params: &ModelParams, options: &FilterOptions,
) -> HMMResult<FilterTrace> {
    forward(domain, &emissions.reversed(), &boundaries.swapped(), params, options)
}

/// Combine a forward trace and a backward (reversed-time) trace.
///
/// Both traces must come from the same problem.
pub fn smooth(fwd: &FilterTrace, bwd: &FilterTrace, mask: &Mask) -> Array3<f64> {
    debug_assert_eq!(fwd.len(), bwd.len());
    let n = fwd.len();
    let mut marginals = fwd.filtered().clone();

    for t in 0..n.saturating_sub(1) {
        let mut gamma = marginals.index_axis(Axis(0), t).to_owned();
        gamma *= &bwd.prediction(n - 1 - t);
        normalize(&mut gamma, mask);
        marginals.index_axis_mut(Axis(0), t).assign(&gamma);
    }
    marginals
}

/// Full forward–backward smoothing for one problem.
///
/// # Errors
/// - `HMMError::ShapeMismatch` for maps that do not match the grid.
/// - Kernel errors for sequences with at least two steps.
pub fn forward_backward(
    domain: &Domain, emissions: &EmissionSequence, boundaries: &BoundaryConditions,
    params: &ModelParams, options: &FilterOptions,
) -> HMMResult<Posterior> {
    validate_problem_shapes(domain, emissions, boundaries)?;
    // Reversal permutes the intervals, so one cache serves both passes.
    let cache =
        KernelCache::for_sequence(params, domain.grid.spacing, emissions, options.time_scaling)?;

    let fwd = forward_with_cache(domain, emissions, boundaries, &cache)?;
    let bwd =
        forward_with_cache(domain, &emissions.reversed(), &boundaries.swapped(), &cache)?;

    let marginals = smooth(&fwd, &bwd, &domain.mask);
    let (_, _, constants) = fwd.into_parts();
    Ok(Posterior { marginals, constants })
}
