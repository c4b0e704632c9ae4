//! validation — input guards shared by the HMM stack.
//!
//! Purpose
//! -------
//! Centralize the fail-fast checks on parameters and array shapes so that the
//! kernel builder, the filters and the estimator façade report the same
//! [`HMMError`] variants for the same problems.
//!
//! Invariants & assumptions
//! ------------------------
//! - sigma: finite and > 0 (only checked when a transition is required).
//! - truncate: finite and >= 0.
//! - intervals: finite and > 0.
//! - emission entries: finite and >= 0, or NaN (read as "no likelihood").
//! - boundary entries: finite and >= 0.
//!
//! Conventions
//! -----------
//! - Errors point at the first offending element in row-major order.
//! - Nothing here allocates beyond the error value.
use crate::hmm::{
    core::{
        data::{BoundaryConditions, EmissionSequence},
        grid::Domain,
    },
    errors::{HMMError, HMMResult},
};
use ndarray::{ArrayView1, ArrayView2, ArrayView3};

/// Validate the diffusion spread `sigma`.
///
/// # Errors
/// - [`HMMError::InvalidSigma`] if `sigma` is NaN, infinite, or <= 0.
pub fn validate_sigma(sigma: f64) -> HMMResult<()> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(HMMError::InvalidSigma { value: sigma });
    }
    Ok(())
}

/// Validate the kernel cut-off `truncate` (0 disables truncation).
///
/// # Errors
/// - [`HMMError::InvalidTruncate`] if `truncate` is NaN, infinite, or < 0.
pub fn validate_truncate(truncate: f64) -> HMMResult<()> {
    if !(truncate.is_finite() && truncate >= 0.0) {
        return Err(HMMError::InvalidTruncate { value: truncate });
    }
    Ok(())
}

/// Validate one inter-observation interval.
///
/// # Errors
/// - [`HMMError::InvalidInterval`] if `value` is NaN, infinite, or <= 0.
pub fn validate_interval(index: usize, value: f64) -> HMMResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(HMMError::InvalidInterval { index, value });
    }
    Ok(())
}

/// Validate an interval vector against a sequence of `n_steps` observations.
///
/// # Errors
/// - [`HMMError::IntervalLengthMismatch`] unless `intervals.len() == n_steps - 1`.
/// - [`HMMError::InvalidInterval`] for the first non-positive / non-finite entry.
pub fn validate_intervals(intervals: ArrayView1<f64>, n_steps: usize) -> HMMResult<()> {
    let expected = n_steps.saturating_sub(1);
    if intervals.len() != expected {
        return Err(HMMError::IntervalLengthMismatch { expected, actual: intervals.len() });
    }
    for (index, &value) in intervals.iter().enumerate() {
        validate_interval(index, value)?;
    }
    Ok(())
}

/// Check that a 2D map has the expected `(rows, cols)` shape.
///
/// # Errors
/// - [`HMMError::ShapeMismatch`] tagged with `what`.
pub fn validate_map_shape(
    what: &'static str, expected: (usize, usize), actual: (usize, usize),
) -> HMMResult<()> {
    if expected != actual {
        return Err(HMMError::ShapeMismatch { what, expected, actual });
    }
    Ok(())
}

/// Validate the values of a stack of emission maps (`t × rows × cols`).
///
/// NaN entries are accepted and later read as zero likelihood.
///
/// # Errors
/// - [`HMMError::EmptySequence`] if there are no time steps.
/// - [`HMMError::InvalidEmission`] for the first negative or infinite entry.
pub fn validate_emissions(maps: ArrayView3<f64>) -> HMMResult<()> {
    if maps.dim().0 == 0 {
        return Err(HMMError::EmptySequence);
    }
    for ((t, row, col), &value) in maps.indexed_iter() {
        if value.is_nan() {
            continue;
        }
        if value.is_infinite() || value < 0.0 {
            return Err(HMMError::InvalidEmission { t, row, col, value });
        }
    }
    Ok(())
}

/// Validate the values of a boundary distribution.
///
/// # Errors
/// - [`HMMError::InvalidBoundary`] for the first negative or non-finite entry.
pub fn validate_boundary(which: &'static str, map: ArrayView2<f64>) -> HMMResult<()> {
    for ((row, col), &value) in map.indexed_iter() {
        if !(value.is_finite() && value >= 0.0) {
            return Err(HMMError::InvalidBoundary { which, row, col, value });
        }
    }
    Ok(())
}

/// Check that every map of one problem matches the domain's grid.
///
/// # Errors
/// - [`HMMError::ShapeMismatch`] tagged `"emission"`, `"initial"` or
///   `"terminal"`.
pub fn validate_problem_shapes(
    domain: &Domain, emissions: &EmissionSequence, boundaries: &BoundaryConditions,
) -> HMMResult<()> {
    let expected = domain.grid.shape();
    validate_map_shape("emission", expected, emissions.map_shape())?;
    if let Some(map) = boundaries.initial_map() {
        validate_map_shape("initial", expected, map.dim())?;
    }
    if let Some(map) = boundaries.terminal_map() {
        validate_map_shape("terminal", expected, map.dim())?;
    }
    Ok(())
}
