//! Residuals → emission likelihood maps.
//!
//! A residual `r` at a cell is scored by the Normal(0, std) density, so a
//! perfect match is the most likely and large misfits fade to 0. Undefined
//! residuals are handled at two levels:
//! - a single NaN cell gets likelihood 0 (that cell cannot explain the
//!   observation);
//! - a step where every cell is NaN carries no information and becomes a map
//!   of ones, so it neither moves nor kills the filter.
use crate::{
    emission::errors::{EmissionError, EmissionResult},
    hmm::core::data::EmissionSequence,
};
use ndarray::{Array1, Array2, Array3, ArrayView2, ArrayView3, Axis};
use num_traits::Float;
use statrs::distribution::{Continuous, Normal};
use tracing::debug;

fn normal(std: f64) -> EmissionResult<Normal> {
    if !(std.is_finite() && std > 0.0) {
        return Err(EmissionError::InvalidStd { value: std });
    }
    Normal::new(0.0, std).map_err(|_| EmissionError::InvalidStd { value: std })
}

fn likelihood_map<F: Float>(residuals: ArrayView2<F>, dist: &Normal) -> Array2<f64> {
    if residuals.iter().all(|r| r.is_nan()) {
        return Array2::ones(residuals.dim());
    }
    residuals.mapv(|r| match r.to_f64() {
        Some(r) if !r.is_nan() => dist.pdf(r),
        _ => 0.0,
    })
}

/// Likelihood map of one step of residuals.
///
/// # Errors
/// - `EmissionError::InvalidStd` unless `std` is finite and > 0.
pub fn residual_likelihood<F: Float>(residuals: ArrayView2<F>, std: f64) -> EmissionResult<Array2<f64>> {
    let dist = normal(std)?;
    Ok(likelihood_map(residuals, &dist))
}

/// Emission sequence from a `(n, rows, cols)` residual stack.
///
/// # Errors
/// - `EmissionError::InvalidStd` for a bad `std`.
/// - `EmissionError::Sequence` when the resulting sequence is invalid
///   (no steps, or bad intervals).
pub fn emission_sequence<F: Float>(
    residuals: ArrayView3<F>, std: f64, intervals: Option<Array1<f64>>,
) -> EmissionResult<EmissionSequence> {
    let dist = normal(std)?;
    let mut maps = Array3::<f64>::zeros(residuals.dim());
    let mut n_uninformative = 0usize;
    for (mut slot, step) in maps.outer_iter_mut().zip(residuals.axis_iter(Axis(0))) {
        if step.iter().all(|r| r.is_nan()) {
            n_uninformative += 1;
        }
        slot.assign(&likelihood_map(step, &dist));
    }
    if n_uninformative > 0 {
        debug!(n_uninformative, n_steps = maps.dim().0, "non-informative emission steps");
    }

    let sequence = match intervals {
        Some(intervals) => EmissionSequence::with_intervals(maps, intervals)?,
        None => EmissionSequence::new(maps)?,
    };
    Ok(sequence)
}
