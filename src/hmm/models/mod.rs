//! models — estimator façade and batch dispatch.
//!
//! Purpose
//! -------
//! Provide the user-facing layer of the HMM stack: a parameterized
//! [`RandomWalkEstimator`] whose methods run the filters on a
//! [`TrackingProblem`], and the [`ProblemBatch`] abstraction that maps those
//! methods over many independent problems.
//!
//! Conventions
//! -----------
//! - Estimators are `Copy` values; reconfiguration returns a new value.
//! - Batch results are `Vec<HMMResult<_>>` in input order, so one failing
//!   problem never hides the others.
//! - Parallelism comes from rayon under the default `parallel` feature.
//!
//! Testing notes
//! -------------
//! - [`estimator`] tests check copy-on-write parameters and that batch and
//!   sweep calls equal the corresponding single calls.
//! - [`batch`] tests check problem validation and order preservation.

pub mod batch;
pub mod estimator;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::batch::{ProblemBatch, TrackingProblem, dispatch};
pub use self::estimator::RandomWalkEstimator;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::batch::{ProblemBatch, TrackingProblem};
    pub use super::estimator::RandomWalkEstimator;
}
