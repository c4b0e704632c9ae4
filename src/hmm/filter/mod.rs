//! filter — forward filter, backward pass, smoother, scorer and decoders.
//!
//! Purpose
//! -------
//! Implement the sequential algorithms of the gridded random-walk HMM on top
//! of the primitives in `hmm::core`. Every entry point takes one problem
//! (`Domain`, `EmissionSequence`, `BoundaryConditions`) plus `ModelParams` and
//! `FilterOptions` and is a pure function of them.
//!
//! Key behaviors
//! -------------
//! - [`forward`] returns a [`FilterTrace`] (priors, filtered maps, constants).
//! - [`backward`] is the forward filter on the reversed problem.
//! - [`forward_backward`] returns smoothed marginals as a [`Posterior`].
//! - [`score`] returns `-Σ ln c_t`.
//! - [`viterbi`], [`modal_track`] and [`mean_track`] decode positions.
//!
//! Invariants & assumptions
//! ------------------------
//! - Shape and parameter problems fail fast with `HMMError`.
//! - Degenerate steps never fail the filters; they surface as zero/NaN
//!   constants, NaN maps and non-finite scores. `FilterTrace::ensure_finite`
//!   converts them into `HMMError::DegenerateStep` on request.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each algorithm; cross-cutting scenarios
//!   (uniform fixed point, delta observation, masked observation, reversal
//!   equivalence) are in `tests/integration_hmm_pipeline.rs`.

pub mod decode;
pub mod forward;
pub mod score;
pub mod smoother;

pub use self::decode::{ViterbiPath, mean_track, modal_track, viterbi};
pub use self::forward::{FilterTrace, forward, forward_with_cache};
pub use self::score::{score, score_constants};
pub use self::smoother::{Posterior, backward, forward_backward, smooth};
