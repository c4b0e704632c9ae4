//! hmm — gridded Gaussian random-walk hidden Markov model.
//!
//! Purpose
//! -------
//! Estimate where a tagged animal was at each observation instant, given one
//! likelihood map per instant over a 2D grid. The hidden state is the cell
//! the animal occupies; between observations it diffuses according to a
//! truncated Gaussian kernel; a boolean mask removes cells it cannot occupy
//! (land). This module is the entry point for the whole state-estimation
//! stack.
//!
//! Key behaviors
//! -------------
//! - [`core`]: grid and mask, observation containers, parameters and
//!   options, kernel construction, prediction and masked normalization.
//! - [`filter`]: forward filter, backward pass, forward–backward smoother,
//!   scorer, and track decoders.
//! - [`models`]: the [`RandomWalkEstimator`] façade and batch dispatch over
//!   independent [`TrackingProblem`]s.
//! - [`errors`]: [`HMMError`] / [`HMMResult`] shared by all of the above.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every probability map is nonnegative; after normalization invalid cells
//!   hold exactly 0 and valid cells sum to 1 (or are NaN for a degenerate
//!   step).
//! - Model parameters and domains are immutable values; reconfiguration
//!   creates new values, so concurrent sweeps need no locks.
//! - Shape and parameter errors are fatal for the call that hit them;
//!   degenerate steps are reported through the results.
//!
//! Conventions
//! -----------
//! - Maps are `[row, col]`; stacks over time are `[t, row, col]`, earliest
//!   observation first.
//! - `sigma` is in grid-spacing units per unit time; the kernel spread over an
//!   interval `Δt` is `sigma · f(Δt)` with `f` set by [`TimeScaling`].
//! - Logging goes through `tracing`; the crate never installs a subscriber.
//!
//! Downstream usage
//! ----------------
//! 1. Build a [`Grid`], a [`Mask`] and wrap them in an `Arc<Domain>`.
//! 2. Build an [`EmissionSequence`] per individual (see `crate::emission` for
//!    turning profile residuals into likelihood maps) and optional
//!    [`BoundaryConditions`].
//! 3. Create a [`RandomWalkEstimator`] and call `predict_proba`, `score` or
//!    `decode` on a [`TrackingProblem`], or the `_batch` variants on a
//!    [`ProblemBatch`].
//!
//! Testing notes
//! -------------
//! - Unit tests live in each submodule.
//! - `tests/integration_hmm_pipeline.rs` runs end-to-end scenarios through the
//!   public API.

pub mod core;
pub mod errors;
pub mod filter;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    BoundaryConditions, CellSpacing, DiffusionKernel, Domain, EmissionSequence, FilterOptions,
    Grid, Mask, ModelParams, TimeScaling,
};
pub use self::errors::{ErrorKind, HMMError, HMMResult};
pub use self::filter::{FilterTrace, Posterior, ViterbiPath};
pub use self::models::{ProblemBatch, RandomWalkEstimator, TrackingProblem};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_tagtrack::hmm::prelude::*;
//
// to import the main HMM surface in a single line.

pub mod prelude {
    pub use super::{
        BoundaryConditions, CellSpacing, Domain, EmissionSequence, FilterOptions, FilterTrace,
        Grid, HMMError, HMMResult, Mask, ModelParams, Posterior, ProblemBatch,
        RandomWalkEstimator, TimeScaling, TrackingProblem, ViterbiPath,
    };
}
