//! Forward filter — sequential predict/update over one emission sequence.
//!
//! Purpose
//! -------
//! Run the normalized forward recursion of the gridded random-walk HMM and
//! keep everything downstream consumers need: the predicted (prior) map of
//! every step, the filtered (posterior) map of every step, and the per-step
//! normalization constants.
//!
//! Key behaviors
//! -------------
//! - Step 0: the prior is the normalized initial boundary, or uniform over the
//!   valid cells when absent.
//! - Step t >= 1: the prior is the previous filtered map convolved with the
//!   kernel for the interval `Δt_t`.
//! - Every step: the local evidence (emission with NaN read as 0, times the
//!   normalized terminal boundary on the last step) multiplies the prior and
//!   [`normalize`] produces the filtered map and constant `c_t`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are shape-checked against the domain before any allocation.
//! - Constants are >= 0 or NaN. A degenerate step is kept as a value: its
//!   filtered map is NaN on valid cells and every later step inherits the
//!   NaN, so one bad individual never aborts a batch.
//!
//! Conventions
//! -----------
//! - All stacks are indexed `[t, row, col]` in the time order of the sequence
//!   given to the filter. The backward pass feeds a reversed sequence, so its
//!   trace is indexed in reversed time.
//! - `log_likelihood = Σ ln c_t`; the score is its negation.
use crate::hmm::{
    core::{
        data::{BoundaryConditions, EmissionSequence},
        grid::{Domain, Mask},
        kernel::KernelCache,
        normalize::{is_degenerate, normalize, normalized},
        options::FilterOptions,
        params::ModelParams,
        predict::predict_into,
        validation::validate_problem_shapes,
    },
    errors::{HMMError, HMMResult},
};
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};
use tracing::debug;

/// FilterTrace — output of one forward filter run.
///
/// Fields
/// ------
/// - `predictions`: `(n, rows, cols)` prior map of each step.
/// - `filtered`: `(n, rows, cols)` normalized posterior of each step.
/// - `constants`: length-`n` normalization constants `c_t`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTrace {
    predictions: Array3<f64>,
    filtered: Array3<f64>,
    constants: Array1<f64>,
}

impl FilterTrace {
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn predictions(&self) -> &Array3<f64> {
        &self.predictions
    }

    pub fn filtered(&self) -> &Array3<f64> {
        &self.filtered
    }

    pub fn constants(&self) -> &Array1<f64> {
        &self.constants
    }

    /// Prior map at step `t`.
    pub fn prediction(&self, t: usize) -> ArrayView2<'_, f64> {
        self.predictions.index_axis(Axis(0), t)
    }

    /// Filtered map at step `t`.
    pub fn filtered_at(&self, t: usize) -> ArrayView2<'_, f64> {
        self.filtered.index_axis(Axis(0), t)
    }

    /// Index of the first degenerate step, if any.
    pub fn first_degenerate(&self) -> Option<usize> {
        self.constants.iter().position(|&c| is_degenerate(c))
    }

    /// `Σ ln c_t` (`-∞` or NaN if a step is degenerate).
    pub fn log_likelihood(&self) -> f64 {
        self.constants.iter().map(|c| c.ln()).sum()
    }

    /// Strict check for callers that prefer an error over a non-finite value.
    ///
    /// # Errors
    /// - `HMMError::DegenerateStep` for the first degenerate step.
    pub fn ensure_finite(&self) -> HMMResult<()> {
        match self.first_degenerate() {
            Some(t) => Err(HMMError::DegenerateStep { t, total: self.constants[t] }),
            None => Ok(()),
        }
    }

    /// Split into `(predictions, filtered, constants)`.
    pub fn into_parts(self) -> (Array3<f64>, Array3<f64>, Array1<f64>) {
        (self.predictions, self.filtered, self.constants)
    }
}

/// Run the forward filter for one problem.
///
/// # Errors
/// - `HMMError::ShapeMismatch` if an emission or boundary map does not match
///   the grid.
/// - Kernel errors (`InvalidSigma`, `InvalidTruncate`, `InvalidInterval`) for
///   sequences with at least two steps.
pub fn forward(
    domain: &Domain, emissions: &EmissionSequence, boundaries: &BoundaryConditions,
    params: &ModelParams, options: &FilterOptions,
) -> HMMResult<FilterTrace> {
    validate_problem_shapes(domain, emissions, boundaries)?;
    let cache =
        KernelCache::for_sequence(params, domain.grid.spacing, emissions, options.time_scaling)?;
    forward_with_cache(domain, emissions, boundaries, &cache)
}

/// Forward filter with prebuilt kernels.
///
/// Shapes must already be validated; the cache must hold a kernel for every
/// interval of `emissions`.
///
/// # Errors
/// - `HMMError::InvalidInterval` if `cache` lacks a kernel for some interval.
pub fn forward_with_cache(
    domain: &Domain, emissions: &EmissionSequence, boundaries: &BoundaryConditions,
    cache: &KernelCache,
) -> HMMResult<FilterTrace> {
    let mask = &domain.mask;
    let n = emissions.len();
    let (rows, cols) = domain.grid.shape();

    let mut predictions = Array3::<f64>::zeros((n, rows, cols));
    let mut filtered = Array3::<f64>::zeros((n, rows, cols));
    let mut constants = Array1::<f64>::zeros(n);

    let terminal = boundaries.terminal_map().map(|map| normalized(map, mask).0);
    predictions.index_axis_mut(Axis(0), 0).assign(&initial_prior(boundaries, mask));

    for t in 0..n {
        if t > 0 {
            let kernel = cache.for_step(emissions, t)?;
            let prev = filtered.index_axis(Axis(0), t - 1);
            predict_into(prev, kernel, predictions.index_axis_mut(Axis(0), t));
        }

        let mut posterior = local_evidence(emissions.map(t));
        if t == n - 1 {
            if let Some(terminal) = &terminal {
                posterior *= terminal;
            }
        }
        posterior *= &predictions.index_axis(Axis(0), t);
        constants[t] = normalize(&mut posterior, mask);
        filtered.index_axis_mut(Axis(0), t).assign(&posterior);
    }

    let trace = FilterTrace { predictions, filtered, constants };
    if let Some(t) = trace.first_degenerate() {
        debug!(t, total = trace.constants[t], n_steps = n, "forward filter hit a degenerate step");
    }
    Ok(trace)
}

/// Step-0 prior: the normalized initial boundary, or uniform over valid cells.
fn initial_prior(boundaries: &BoundaryConditions, mask: &Mask) -> Array2<f64> {
    match boundaries.initial_map() {
        Some(map) => normalized(map, mask).0,
        None => mask.uniform(),
    }
}

/// Emission likelihood with undefined (NaN) cells read as zero.
fn local_evidence(emission: ArrayView2<f64>) -> Array2<f64> {
    emission.mapv(|v| if v.is_nan() { 0.0 } else { v })
}
