//! core — grid, observation containers, parameters, and the per-step
//! numerical primitives of the random-walk HMM.
//!
//! Purpose
//! -------
//! Collect the building blocks every filter run needs: the spatial domain
//! ([`Grid`], [`Mask`], [`Domain`]), the per-individual inputs
//! ([`EmissionSequence`], [`BoundaryConditions`]), the model parameters and
//! options ([`ModelParams`], [`FilterOptions`], [`TimeScaling`]), and the
//! three numerical primitives applied at every step: kernel construction,
//! prediction, and masked normalization.
//!
//! Key behaviors
//! -------------
//! - [`DiffusionKernel`] discretizes a truncated Gaussian displacement onto
//!   the grid; [`KernelCache`] holds one kernel per distinct interval.
//! - [`predict`] convolves a distribution with a kernel (zero padding).
//! - [`normalize`] zeroes invalid cells, rescales valid mass to 1, and returns
//!   the step's normalization constant.
//! - [`validation`] centralizes the fail-fast checks shared by constructors
//!   and filters.
//!
//! Invariants & assumptions
//! ------------------------
//! - Grids and masks are immutable once built and may be shared across
//!   threads; kernels are derived values and never mutated after
//!   construction.
//! - After [`normalize`], invalid cells hold exactly 0 and valid cells either
//!   sum to 1 or are all NaN (degenerate step).
//!
//! Conventions
//! -----------
//! - Maps are `Array2<f64>` indexed `[row, col]`; stacks over time are
//!   `Array3<f64>` indexed `[t, row, col]`.
//! - This module performs no I/O. The only logging is `tracing::trace!` on
//!   kernel construction.
//!
//! Testing notes
//! -------------
//! - Each submodule carries its own unit tests. End-to-end behavior (filter,
//!   smoother, scorer) is tested in `hmm::filter` and in the integration
//!   tests.

pub mod data;
pub mod grid;
pub mod kernel;
pub mod normalize;
pub mod options;
pub mod params;
pub mod predict;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::{BoundaryConditions, EmissionSequence};
pub use self::grid::{CellSpacing, Domain, Grid, Mask};
pub use self::kernel::{DiffusionKernel, KernelCache};
pub use self::normalize::{is_degenerate, normalize, normalized};
pub use self::options::{FilterOptions, TimeScaling};
pub use self::params::{DEFAULT_TRUNCATE, MAX_CUTOFF_STD_DEVS, ModelParams};
pub use self::predict::{predict, predict_into};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_tagtrack::hmm::core::prelude::*;
//
// to import the main core surface in a single line.

pub mod prelude {
    pub use super::data::{BoundaryConditions, EmissionSequence};
    pub use super::grid::{CellSpacing, Domain, Grid, Mask};
    pub use super::kernel::{DiffusionKernel, KernelCache};
    pub use super::options::{FilterOptions, TimeScaling};
    pub use super::params::{DEFAULT_TRUNCATE, MAX_CUTOFF_STD_DEVS, ModelParams};
}
