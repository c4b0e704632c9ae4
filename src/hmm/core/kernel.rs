//! Diffusion kernel — truncated, renormalized Gaussian displacement stencil.
//!
//! Purpose
//! -------
//! Discretize the displacement density of one inter-observation interval onto
//! the grid's cell spacing, so the predict step can spread probability mass by
//! a plain 2D convolution.
//!
//! Key behaviors
//! -------------
//! - [`DiffusionKernel::build`] evaluates `exp(-½ d² / s²)` on every cell
//!   offset inside the truncation radius, where `s = sigma · f(Δt)` and `f` is
//!   the configured [`TimeScaling`], then renormalizes the stencil to sum to 1.
//! - [`KernelCache`] builds one kernel per distinct `Δt` of a sequence and
//!   hands out shared references during the filter runs.
//!
//! Invariants & assumptions
//! ------------------------
//! - `sigma` is finite and > 0, `truncate` finite and >= 0, `Δt` finite and
//!   > 0. Violations are reported as [`HMMError`] before any allocation.
//! - The stencil is `(2·ry + 1) × (2·rx + 1)`, centered, symmetric under
//!   `(k, l) → (-k, -l)`, nonnegative, and sums to 1.
//! - A kernel depends on `(sigma, truncate, spacing, Δt, scaling)` only, never
//!   on the grid dimensions. Taps reaching past the grid edge are clipped by
//!   the predict step, so the mass they carry is lost rather than folded
//!   back into the stencil.
//!
//! Conventions
//! -----------
//! - `truncate == 0` disables truncation. The support is then cut at
//!   [`MAX_CUTOFF_STD_DEVS`](crate::hmm::core::params::MAX_CUTOFF_STD_DEVS)
//!   standard deviations, where the Gaussian is below
//!   `e^{-50}` of its peak; wider `truncate` values are capped the same way.
//! - Distances are physical, `d² = (k·dy)² + (l·dx)²`, so anisotropic spacing
//!   gives an elliptical stencil in index space.
//! - Construction is deterministic; identical inputs give bit-identical
//!   weights.
use crate::hmm::{
    core::{
        data::EmissionSequence,
        grid::CellSpacing,
        options::TimeScaling,
        params::ModelParams,
        validation::{validate_interval, validate_sigma, validate_truncate},
    },
    errors::{HMMError, HMMResult},
};
use ndarray::Array2;
use std::collections::BTreeMap;
use tracing::trace;

/// DiffusionKernel — normalized displacement stencil for one interval.
///
/// Fields
/// ------
/// - `weights`: `(2·ry + 1) × (2·rx + 1)` array; `weights[[ry, rx]]` is the
///   probability of not leaving the cell.
/// - `radius`: `(ry, rx)` half-widths in cells.
/// - `std_dev`: `sigma · f(Δt)` in physical units.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionKernel {
    weights: Array2<f64>,
    radius: (usize, usize),
    std_dev: f64,
}

impl DiffusionKernel {
    /// Build the kernel bridging an interval of length `dt` on cells of size
    /// `spacing`.
    ///
    /// # Errors
    /// - `HMMError::InvalidSigma` if `sigma` is not finite and > 0.
    /// - `HMMError::InvalidTruncate` if `truncate` is negative or not finite.
    /// - `HMMError::InvalidInterval` (index 0) if `dt` is not finite and > 0.
    pub fn build(
        params: &ModelParams, spacing: CellSpacing, dt: f64, scaling: TimeScaling,
    ) -> HMMResult<Self> {
        validate_sigma(params.sigma())?;
        validate_truncate(params.truncate())?;
        validate_interval(0, dt)?;

        let std_dev = params.sigma() * scaling.factor(dt);
        let (dy, dx) = (spacing.dy, spacing.dx);
        let cutoff = params.effective_truncate() * std_dev;
        let (ry, rx) = (cells_within(cutoff, dy), cells_within(cutoff, dx));

        let variance = std_dev * std_dev;
        let cutoff_sq = cutoff * cutoff;
        let mut weights = Array2::<f64>::zeros((2 * ry + 1, 2 * rx + 1));
        for ((i, j), w) in weights.indexed_iter_mut() {
            let k = i as f64 - ry as f64;
            let l = j as f64 - rx as f64;
            let dist_sq = (k * dy).powi(2) + (l * dx).powi(2);
            if dist_sq > cutoff_sq {
                continue;
            }
            *w = if dist_sq == 0.0 { 1.0 } else { (-0.5 * dist_sq / variance).exp() };
        }
        // The center tap is 1, so the total is >= 1.
        let total = weights.sum();
        weights.mapv_inplace(|w| w / total);

        trace!(sigma = params.sigma(), dt, std_dev, ry, rx, "built diffusion kernel");
        Ok(DiffusionKernel { weights, radius: (ry, rx), std_dev })
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// `(ry, rx)` half-widths in cells.
    pub fn radius(&self) -> (usize, usize) {
        self.radius
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

/// Number of whole cells of size `spacing` that fit within `distance`.
fn cells_within(distance: f64, spacing: f64) -> usize {
    (distance / spacing).floor() as usize
}

/// KernelCache — one kernel per distinct interval of a sequence.
///
/// Built once per filter invocation and read-only afterwards; the reversed
/// sequence used by the backward pass shares the same intervals, so a single
/// cache serves both directions.
#[derive(Debug, Clone, Default)]
pub struct KernelCache {
    kernels: BTreeMap<u64, DiffusionKernel>,
}

impl KernelCache {
    /// Build kernels for every interval of `emissions`.
    ///
    /// Sequences of length 1 need no transition, so sigma is not checked.
    ///
    /// # Errors
    /// - Whatever [`DiffusionKernel::build`] reports; interval errors carry the
    ///   index of the offending interval.
    pub fn for_sequence(
        params: &ModelParams, spacing: CellSpacing, emissions: &EmissionSequence,
        scaling: TimeScaling,
    ) -> HMMResult<Self> {
        let mut kernels = BTreeMap::new();
        for t in 1..emissions.len() {
            let dt = emissions.interval(t);
            validate_interval(t - 1, dt)?;
            if kernels.contains_key(&dt.to_bits()) {
                continue;
            }
            let kernel = DiffusionKernel::build(params, spacing, dt, scaling)?;
            kernels.insert(dt.to_bits(), kernel);
        }
        Ok(KernelCache { kernels })
    }

    /// Kernel for an interval of length `dt`, if one was built.
    pub fn get(&self, dt: f64) -> Option<&DiffusionKernel> {
        self.kernels.get(&dt.to_bits())
    }

    /// Kernel bridging steps `t - 1` and `t` of `emissions`.
    ///
    /// # Errors
    /// - `HMMError::InvalidInterval` if the cache was built for a sequence
    ///   with different intervals.
    pub fn for_step(&self, emissions: &EmissionSequence, t: usize) -> HMMResult<&DiffusionKernel> {
        let dt = emissions.interval(t);
        self.get(dt).ok_or(HMMError::InvalidInterval { index: t - 1, value: dt })
    }

    /// Number of distinct kernels.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}
